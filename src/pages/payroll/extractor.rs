use std::ops::Deref;

use actix_web::{dev, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use super::*;

/// A pay week that an approver has already confirmed
pub(super) struct ConfirmedWeek(pub(super) ChatterWeek);

impl Deref for ConfirmedWeek {
    type Target = ChatterWeek;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for ConfirmedWeek {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let week = ChatterWeek::from_request(&req, &mut dev::Payload::None).await?;

            if week.state() != PayrollState::Confirmed {
                return Err(PayrollError::lock_violation("week has not been confirmed").into());
            }

            Ok(Self(week))
        })
    }
}
