use actix_web::{patch, web, Responder};
use chrono::Local;
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{NotSet, Set, Unchanged}, DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{auth::Admin, entity::{prelude::*, profile}, error::PayrollError};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(update_profile);
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UpdateProfile {
    hourly_rate: Option<Decimal>,
    /// Empty string clears the department
    department: Option<String>,
    active: Option<bool>,
}

impl UpdateProfile {
    fn into_active_model(self, id: Uuid) -> Result<profile::ActiveModel, PayrollError> {
        if let Some(rate) = self.hourly_rate {
            if rate.is_sign_negative() && !rate.is_zero() {
                return Err(PayrollError::invalid("`hourly_rate` cannot be negative"));
            }
        }

        let department = self.department.map(|department| {
            let department = department.trim();
            (!department.is_empty()).then(|| department.to_string())
        });

        Ok(profile::ActiveModel {
            id: Unchanged(id),
            updated_at: Set(Local::now().fixed_offset()),
            hourly_rate: self.hourly_rate.map_or(NotSet, Set),
            department: department.map_or(NotSet, Set),
            active: self.active.map_or(NotSet, Set),
            ..Default::default()
        })
    }
}

#[patch("/{profile_id}")]
async fn update_profile(db: web::Data<DatabaseConnection>, admin: Admin, profile_id: web::Path<Uuid>, payload: web::Json<UpdateProfile>) -> Result<impl Responder, PayrollError> {
    let profile_id = profile_id.into_inner();

    if Profile::find_by_id(profile_id).one(db.as_ref()).await?.is_none() {
        return Err(PayrollError::NotFound("profile"));
    }

    let model = Profile::update(payload.into_inner().into_active_model(profile_id)?)
        .exec(db.as_ref()).await?;

    tracing::info!(admin = %admin.id(), profile = %profile_id, "Updated profile");

    Ok(web::Json(model))
}
