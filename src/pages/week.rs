use std::str::FromStr;

use actix_web::{dev, web, FromRequest, HttpRequest};
use chrono::{Local, NaiveDate};
use futures_util::future::LocalBoxFuture;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthContext,
    config::PayrollSettings,
    consts::DEFAULT_LATE_SHIFT_DEPARTMENT,
    entity::{payroll_week, prelude::*, profile},
    error::PayrollError,
    payroll::{self, Department, PayrollState, WeekPosition},
};

/// A chatter's pay week addressed by `{chatter_id}/{date}`
///
/// `date` may be any day inside the week, the chatter's department decides
/// where the week starts.
pub(super) struct ChatterWeek {
    pub(super) chatter: profile::Model,
    pub(super) department: Department,
    pub(super) week_start: NaiveDate,
    /// Lock record, absent until the week is locked for the first time
    pub(super) record: Option<payroll_week::Model>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(super) struct DayLabel {
    pub(super) day_of_week: i16,
    pub(super) label: String,
    pub(super) name: String,
    pub(super) date: NaiveDate,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub(super) struct WeekSummary {
    pub(super) chatter_id: Uuid,
    pub(super) department: Department,
    pub(super) week_start: NaiveDate,
    pub(super) week_end: NaiveDate,
    pub(super) position: WeekPosition,
    pub(super) state: PayrollState,
    pub(super) days: Vec<DayLabel>,
}

impl ChatterWeek {
    pub(super) fn week_end(&self) -> NaiveDate {
        payroll::week_end(self.week_start)
    }

    pub(super) fn state(&self) -> PayrollState {
        self.record.as_ref()
            .map_or(PayrollState::Unlocked, |record| PayrollState::from_flags(record.sales_locked, record.admin_confirmed))
    }

    pub(super) fn position(&self) -> WeekPosition {
        payroll::week_position(self.week_start, Local::now().date_naive(), self.department)
    }

    pub(super) fn days(&self) -> Result<Vec<DayLabel>, PayrollError> {
        payroll::days_of_week(self.department)
            .into_iter()
            .map(|weekday| {
                let day_of_week = weekday.num_days_from_sunday() as i16;
                let date = payroll::actual_date(self.week_start, day_of_week, self.department)?;

                Ok(DayLabel {
                    day_of_week,
                    label: date.format("%a").to_string(),
                    name: date.format("%A").to_string(),
                    date,
                })
            })
            .collect()
    }

    pub(super) fn summary(&self) -> Result<WeekSummary, PayrollError> {
        Ok(WeekSummary {
            chatter_id: self.chatter.id,
            department: self.department,
            week_start: self.week_start,
            week_end: self.week_end(),
            position: self.position(),
            state: self.state(),
            days: self.days()?,
        })
    }

    pub(super) fn ensure_viewer(&self, actor: &AuthContext) -> Result<(), PayrollError> {
        if !actor.can_view(self.chatter.id) {
            return Err(PayrollError::Forbidden);
        }

        Ok(())
    }

    /// Sales and attendance can only change while the week is unlocked
    pub(super) fn ensure_editable(&self, actor: &AuthContext) -> Result<(), PayrollError> {
        if !actor.can_edit(self.chatter.id) {
            return Err(PayrollError::Forbidden);
        }

        if self.state().is_locked() {
            return Err(PayrollError::lock_violation("week is locked for review"));
        }

        Ok(())
    }
}

impl FromRequest for ChatterWeek {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let chatter_id = req.match_info().get("chatter_id").expect("This extractor must be used under `chatter_id` path");
            let Ok(chatter_id) = Uuid::from_str(chatter_id) else {
                return Err(PayrollError::invalid("invalid `chatter_id`").into())
            };

            let date = req.match_info().get("date").expect("This extractor must be used under `date` path");
            let date = payroll::parse_date(date)?;

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");
            let late_shift_label = req.app_data::<web::Data<PayrollSettings>>()
                .map_or(DEFAULT_LATE_SHIFT_DEPARTMENT.to_string(), |settings| settings.late_shift_department.clone());

            let Some(chatter) = Profile::find_by_id(chatter_id)
                .one(db.as_ref()).await
                .map_err(PayrollError::from)?
            else {
                return Err(PayrollError::NotFound("chatter").into())
            };

            let department = Department::from_label(chatter.department.as_deref(), &late_shift_label);
            let week_start = payroll::week_start(date, department);

            let record = PayrollWeek::find()
                .filter(payroll_week::Column::ChatterId.eq(chatter.id))
                .filter(payroll_week::Column::WeekStartDate.eq(week_start))
                .one(db.as_ref()).await
                .map_err(PayrollError::from)?;

            Ok(Self {
                chatter,
                department,
                week_start,
                record,
            })
        })
    }
}
