use std::collections::BTreeMap;

use actix_web::{get, post, web, Responder};
use chrono::Local;
use rust_decimal::Decimal;
use sea_orm::{sea_query::Query, ActiveValue::{Set, Unchanged}, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Select};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthContext,
    config::PayrollSettings,
    entity::{payroll_week, prelude::*, profile, sea_orm_active_enums::RoleType, user_role},
    error::PayrollError,
    payroll::{self, CompensationInput, Department, PayrollState, Payout, WeekPosition},
};

use super::{
    attendance::find_attendance,
    sales::find_sales,
    week::{ChatterWeek, WeekSummary},
};

use extractor::ConfirmedWeek;
use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_overview)
        .service(get_status)
        .service(lock_week)
        .service(get_expected_salary)
        .service(approve_week)
        .service(reject_week)
        .service(get_payslip);
}

/// Logs transitions refused by the payroll cycle before handing the error back
fn checked<T>(week: &ChatterWeek, action: &'static str, result: Result<T, PayrollError>) -> Result<T, PayrollError> {
    if let Err(err) = &result {
        tracing::warn!(chatter = %week.chatter.id, week_start = %week.week_start, action, error = %err, "Rejected payroll transition");
    }

    result
}

fn locked_record(week: &ChatterWeek) -> Result<&payroll_week::Model, PayrollError> {
    week.record.as_ref()
        .ok_or_else(|| PayrollError::lock_violation("week has not been locked for review"))
}

/// Unlocks a week and clears everything the approver filled in
pub(super) fn rejected_update(record_id: Uuid, actor_id: Uuid) -> payroll_week::ActiveModel {
    let (sales_locked, admin_confirmed) = PayrollState::Unlocked.flags();

    payroll_week::ActiveModel {
        id: Unchanged(record_id),
        updated_at: Set(Local::now().fixed_offset()),
        updated_by: Set(Some(actor_id)),
        sales_locked: Set(sales_locked),
        admin_confirmed: Set(admin_confirmed),
        confirmed_hours_worked: Set(None),
        confirmed_commission_rate: Set(None),
        overtime_pay: Set(None),
        overtime_notes: Set(None),
        deduction_amount: Set(None),
        deduction_notes: Set(None),
        ..Default::default()
    }
}

async fn overview_row(db: &DatabaseConnection, chatter: profile::Model, date: chrono::NaiveDate, late_shift_label: &str) -> Result<OverviewRow, PayrollError> {
    let department = Department::from_label(chatter.department.as_deref(), late_shift_label);
    let week_start = payroll::week_start(date, department);

    let record = PayrollWeek::find()
        .filter(payroll_week::Column::ChatterId.eq(chatter.id))
        .filter(payroll_week::Column::WeekStartDate.eq(week_start))
        .one(db).await?;

    let sales = find_sales(db, chatter.id, week_start).await?;
    let attendance = find_attendance(db, chatter.id, week_start).await?;

    Ok(OverviewRow {
        chatter_id: chatter.id,
        name: chatter.name,
        department: chatter.department,
        week_start,
        week_end: payroll::week_end(week_start),
        state: record.map_or(PayrollState::Unlocked, |record| PayrollState::from_flags(record.sales_locked, record.admin_confirmed)),
        total_sales: payroll::total_sales(&sales),
        hours_worked: payroll::hours_worked(&attendance),
    })
}

/// Active profiles on the payroll, which is everyone but creators
fn overview_profiles() -> Select<profile::Entity> {
    let creators = Query::select()
        .column(user_role::Column::ProfileId)
        .from(UserRole)
        .and_where(user_role::Column::Role.eq(RoleType::Creator))
        .to_owned();

    Profile::find()
        .filter(profile::Column::Active.eq(true))
        .filter(profile::Column::Role.ne(RoleType::Creator))
        .filter(profile::Column::Id.not_in_subquery(creators))
}

/// Every payroll profile's week containing `date`, each resolved with its own department
#[get("/overview/{date}")]
async fn get_overview(db: web::Data<DatabaseConnection>, settings: web::Data<PayrollSettings>, actor: AuthContext, date: web::Path<String>) -> Result<impl Responder, PayrollError> {
    if !actor.can_manage_all() {
        return Err(PayrollError::Forbidden);
    }

    let date = payroll::parse_date(&date)?;

    let chatters = overview_profiles()
        .all(db.as_ref()).await?;

    let rows = futures_util::future::join_all(
        chatters.into_iter().map(|chatter|
            overview_row(&db, chatter, date, &settings.late_shift_department)
        )
    ).await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(web::Json(Overview {
        date,
        total_sales: rows.iter().map(|row| row.total_sales).sum(),
        rows,
    }))
}

#[get("/{chatter_id}/{date}")]
async fn get_status(actor: AuthContext, week: ChatterWeek) -> Result<impl Responder, PayrollError> {
    week.ensure_viewer(&actor)?;

    Ok(web::Json(WeekStatus {
        week: week.summary()?,
        record: week.record.clone(),
    }))
}

#[post("/{chatter_id}/{date}/lock")]
async fn lock_week(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek) -> Result<impl Responder, PayrollError> {
    let next = checked(&week, "lock", week.state().lock(&actor, week.chatter.id).and_then(|next| match week.position() {
        WeekPosition::Current => Ok(next),
        _ => Err(PayrollError::invalid("only the current week can be locked")),
    }))?;

    let (sales_locked, admin_confirmed) = next.flags();

    let record = match &week.record {
        Some(record) => PayrollWeek::update(payroll_week::ActiveModel {
            id: Unchanged(record.id),
            updated_at: Set(Local::now().fixed_offset()),
            updated_by: Set(Some(actor.id())),
            sales_locked: Set(sales_locked),
            admin_confirmed: Set(admin_confirmed),
            ..Default::default()
        }).exec(db.as_ref()).await?,
        None => PayrollWeek::insert(payroll_week::ActiveModel {
            created_by: Set(Some(actor.id())),
            updated_by: Set(Some(actor.id())),
            created_at: Set(Local::now().fixed_offset()),
            updated_at: Set(Local::now().fixed_offset()),
            chatter_id: Set(week.chatter.id),
            week_start_date: Set(week.week_start),
            sales_locked: Set(sales_locked),
            admin_confirmed: Set(admin_confirmed),
            ..Default::default()
        }).exec_with_returning(db.as_ref()).await?,
    };

    tracing::info!(chatter = %week.chatter.id, week_start = %week.week_start, actor = %actor.id(), "Locked week for review");

    Ok(web::Json(record))
}

/// Hourly pay and commission the chatter can expect while the week waits for review
#[get("/{chatter_id}/{date}/expected")]
async fn get_expected_salary(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek) -> Result<impl Responder, PayrollError> {
    week.ensure_viewer(&actor)?;

    if !week.state().is_locked() {
        return Ok(web::Json(None::<Payout>));
    }

    let sales = find_sales(&db, week.chatter.id, week.week_start).await?;
    let attendance = find_attendance(&db, week.chatter.id, week.week_start).await?;

    let payout = payroll::compute_payout(CompensationInput {
        total_sales: payroll::total_sales(&sales),
        hours_worked: payroll::hours_worked(&attendance),
        hourly_rate: week.chatter.hourly_rate,
        overtime_pay: Default::default(),
        deduction_amount: Default::default(),
    })?;

    Ok(web::Json(Some(payout.rounded())))
}

#[post("/{chatter_id}/{date}/approve")]
async fn approve_week(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek, payload: web::Json<ApproveWeek>) -> Result<impl Responder, PayrollError> {
    let next = checked(&week, "approve", week.state().approve(&actor))?;
    let record = locked_record(&week)?;

    let ApproveWeek { hours_worked, commission_rate, overtime_pay, overtime_notes, deduction_amount, deduction_notes } = payload.into_inner();

    let sales = find_sales(&db, week.chatter.id, week.week_start).await?;
    let hours_worked = match hours_worked {
        Some(hours) => hours,
        None => payroll::hours_worked(&find_attendance(&db, week.chatter.id, week.week_start).await?),
    };

    let input = CompensationInput {
        total_sales: payroll::total_sales(&sales),
        hours_worked,
        hourly_rate: week.chatter.hourly_rate,
        overtime_pay: overtime_pay.unwrap_or_default(),
        deduction_amount: deduction_amount.unwrap_or_default(),
    };

    let payout = checked(&week, "approve", match commission_rate {
        Some(rate) => payroll::compute_payout_with_rate(input, rate),
        None => payroll::compute_payout(input),
    })?;

    let (sales_locked, admin_confirmed) = next.flags();

    let record = PayrollWeek::update(payroll_week::ActiveModel {
        id: Unchanged(record.id),
        updated_at: Set(Local::now().fixed_offset()),
        updated_by: Set(Some(actor.id())),
        sales_locked: Set(sales_locked),
        admin_confirmed: Set(admin_confirmed),
        confirmed_hours_worked: Set(Some(input.hours_worked)),
        confirmed_commission_rate: Set(Some(payout.commission_rate)),
        overtime_pay: Set(overtime_pay),
        overtime_notes: Set(overtime_notes),
        deduction_amount: Set(deduction_amount),
        deduction_notes: Set(deduction_notes),
        ..Default::default()
    }).exec(db.as_ref()).await?;

    tracing::info!(chatter = %week.chatter.id, week_start = %week.week_start, actor = %actor.id(), total_payout = %payout.total_payout, "Confirmed week");

    Ok(web::Json(Approval {
        record,
        payout: payout.rounded(),
    }))
}

#[post("/{chatter_id}/{date}/reject")]
async fn reject_week(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek) -> Result<impl Responder, PayrollError> {
    checked(&week, "reject", week.state().reject(&actor))?;
    let record = locked_record(&week)?;

    let record = PayrollWeek::update(rejected_update(record.id, actor.id()))
        .exec(db.as_ref()).await?;

    tracing::info!(chatter = %week.chatter.id, week_start = %week.week_start, actor = %actor.id(), "Returned week to the chatter");

    Ok(web::Json(record))
}

#[get("/{chatter_id}/{date}/payslip")]
async fn get_payslip(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ConfirmedWeek) -> Result<impl Responder, PayrollError> {
    week.ensure_viewer(&actor)?;
    let record = locked_record(&week)?;

    let sales = find_sales(&db, week.chatter.id, week.week_start).await?;
    let attendance = find_attendance(&db, week.chatter.id, week.week_start).await?;

    let total_sales = payroll::total_sales(&sales);
    let input = CompensationInput {
        total_sales,
        hours_worked: record.confirmed_hours_worked.unwrap_or_else(|| payroll::hours_worked(&attendance)),
        hourly_rate: week.chatter.hourly_rate,
        overtime_pay: record.overtime_pay.unwrap_or_default(),
        deduction_amount: record.deduction_amount.unwrap_or_default(),
    };
    let rate = record.confirmed_commission_rate.unwrap_or_else(|| payroll::commission_rate(total_sales));
    let payout = payroll::compute_payout_with_rate(input, rate)?;

    let mut per_model = BTreeMap::<String, Decimal>::new();
    for entry in &sales {
        *per_model.entry(entry.model_name.clone()).or_default() += entry.earnings;
    }

    let chatter = &week.chatter;

    Ok(web::Json(Payslip {
        chatter: PayslipChatter {
            id: chatter.id,
            username: chatter.username.clone(),
            name: chatter.name.clone(),
            department: chatter.department.clone(),
            hourly_rate: chatter.hourly_rate,
        },
        week_start: week.week_start,
        week_end: week.week_end(),
        sales: per_model.into_iter()
            .map(|(model_name, earnings)| PayslipModelSales { model_name, earnings: payroll::to_cents(earnings) })
            .collect(),
        total_sales: payroll::to_cents(total_sales),
        days_present: payroll::days_present(&attendance),
        hours_worked: input.hours_worked,
        overtime: PayslipAdjustment {
            amount: payroll::to_cents(input.overtime_pay),
            notes: record.overtime_notes.clone(),
        },
        deduction: PayslipAdjustment {
            amount: payroll::to_cents(input.deduction_amount),
            notes: record.deduction_notes.clone(),
        },
        payout: payout.rounded(),
    }))
}
