use actix_web::{get, put, web, HttpResponse, Responder};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use crate::{
    auth::AuthContext,
    entity::{prelude::*, sales_entry},
    error::PayrollError,
    payroll,
};

use super::week::{ChatterWeek, WeekSummary};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_week_sales)
        .service(upsert_earnings);
}

#[derive(Debug, Serialize, Deserialize)]
struct WeekSales {
    week: WeekSummary,
    entries: Vec<sales_entry::Model>,
    total_sales: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct UpsertEarnings {
    model_name: String,
    day_of_week: i16,
    earnings: Decimal,
}

pub(super) async fn find_week_sales(db: &DatabaseConnection, week: &ChatterWeek) -> Result<Vec<sales_entry::Model>, PayrollError> {
    find_sales(db, week.chatter.id, week.week_start).await
}

pub(super) async fn find_sales(db: &DatabaseConnection, chatter_id: uuid::Uuid, week_start: NaiveDate) -> Result<Vec<sales_entry::Model>, PayrollError> {
    Ok(
        SalesEntry::find()
            .filter(sales_entry::Column::ChatterId.eq(chatter_id))
            .filter(sales_entry::Column::WeekStartDate.eq(week_start))
            .order_by_asc(sales_entry::Column::ModelName)
            .all(db).await?
    )
}

#[get("/{chatter_id}/{date}")]
async fn get_week_sales(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek) -> Result<impl Responder, PayrollError> {
    week.ensure_viewer(&actor)?;

    let entries = find_week_sales(&db, &week).await?;

    Ok(web::Json(WeekSales {
        week: week.summary()?,
        total_sales: payroll::total_sales(&entries),
        entries,
    }))
}

#[put("/{chatter_id}/{date}")]
async fn upsert_earnings(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek, payload: web::Json<UpsertEarnings>) -> Result<impl Responder, PayrollError> {
    week.ensure_editable(&actor)?;

    let UpsertEarnings { model_name, day_of_week, earnings } = payload.into_inner();

    let model_name = model_name.trim().to_string();
    if model_name.is_empty() {
        return Err(PayrollError::invalid("`model_name` cannot be empty"));
    }
    payroll::weekday_from_index(day_of_week)?;
    if earnings.is_sign_negative() && !earnings.is_zero() {
        return Err(PayrollError::invalid("`earnings` cannot be negative"));
    }

    let existing = SalesEntry::find()
        .filter(sales_entry::Column::ChatterId.eq(week.chatter.id))
        .filter(sales_entry::Column::WeekStartDate.eq(week.week_start))
        .filter(sales_entry::Column::ModelName.eq(&model_name))
        .filter(sales_entry::Column::DayOfWeek.eq(day_of_week))
        .one(db.as_ref()).await?;

    match existing {
        Some(entry) => {
            let model = SalesEntry::update(sales_entry::ActiveModel {
                id: Unchanged(entry.id),
                updated_at: Set(Local::now().fixed_offset()),
                updated_by: Set(Some(actor.id())),
                earnings: Set(earnings),
                ..Default::default()
            }).exec(db.as_ref()).await?;

            Ok(HttpResponse::Ok().json(model))
        },
        None => {
            let model = SalesEntry::insert(sales_entry::ActiveModel {
                created_by: Set(Some(actor.id())),
                updated_by: Set(Some(actor.id())),
                created_at: Set(Local::now().fixed_offset()),
                updated_at: Set(Local::now().fixed_offset()),
                chatter_id: Set(week.chatter.id),
                model_name: Set(model_name),
                day_of_week: Set(day_of_week),
                week_start_date: Set(week.week_start),
                earnings: Set(earnings),
                ..Default::default()
            }).exec_with_returning(db.as_ref()).await?;

            Ok(HttpResponse::Created().json(model))
        },
    }
}
