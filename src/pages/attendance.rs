use std::collections::{BTreeMap, BTreeSet};

use actix_web::{get, put, web, Responder};
use chrono::Local;
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::AuthContext,
    consts::MAX_EXPORT_WEEKS,
    entity::{attendance, prelude::*},
    error::PayrollError,
    payroll::{self, WeekPosition},
};

use super::week::{ChatterWeek, WeekSummary};

use model::*;

mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(export_attendance)
        .service(get_week_attendance)
        .service(mark_day);
}

pub(super) async fn find_attendance(db: &DatabaseConnection, chatter_id: Uuid, week_start: chrono::NaiveDate) -> Result<Vec<attendance::Model>, PayrollError> {
    Ok(
        Attendance::find()
            .filter(attendance::Column::ChatterId.eq(chatter_id))
            .filter(attendance::Column::WeekStartDate.eq(week_start))
            .order_by_asc(attendance::Column::DayOfWeek)
            .all(db).await?
    )
}

#[get("/{chatter_id}/{date}")]
async fn get_week_attendance(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek) -> Result<impl Responder, PayrollError> {
    week.ensure_viewer(&actor)?;

    let rows = find_attendance(&db, week.chatter.id, week.week_start).await?;

    Ok(web::Json(WeekAttendance {
        week: week.summary()?,
        days_present: payroll::days_present(&rows),
        hours_worked: payroll::hours_worked(&rows),
        rows,
    }))
}

/// Replaces every mark of one day with a present mark per model worked
#[put("/{chatter_id}/{date}/{day_of_week}")]
async fn mark_day(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek, day: web::Path<DayPath>, payload: web::Json<MarkDay>) -> Result<impl Responder, PayrollError> {
    week.ensure_editable(&actor)?;

    if week.position() == WeekPosition::Past {
        return Err(PayrollError::invalid("attendance of past weeks cannot be changed"));
    }

    let day_of_week = day.day_of_week;
    payroll::weekday_from_index(day_of_week)?;

    let models = payload.into_inner().models
        .into_iter()
        .map(|model| model.trim().to_string())
        .filter(|model| !model.is_empty())
        .collect::<BTreeSet<_>>();

    let txn = db.begin().await?;

    Attendance::delete_many()
        .filter(attendance::Column::ChatterId.eq(week.chatter.id))
        .filter(attendance::Column::WeekStartDate.eq(week.week_start))
        .filter(attendance::Column::DayOfWeek.eq(day_of_week))
        .exec(&txn).await?;

    let mut rows = Vec::with_capacity(models.len());
    for model_name in models {
        let row = Attendance::insert(attendance::ActiveModel {
            created_by: Set(Some(actor.id())),
            updated_by: Set(Some(actor.id())),
            created_at: Set(Local::now().fixed_offset()),
            updated_at: Set(Local::now().fixed_offset()),
            chatter_id: Set(week.chatter.id),
            day_of_week: Set(day_of_week),
            week_start_date: Set(week.week_start),
            present: Set(true),
            model_name: Set(Some(model_name)),
            submitted_at: Set(Some(Local::now().fixed_offset())),
            ..Default::default()
        }).exec_with_returning(&txn).await?;

        rows.push(row);
    }

    txn.commit().await?;

    tracing::info!(chatter = %week.chatter.id, week_start = %week.week_start, day_of_week, models = rows.len(), "Marked attendance");

    Ok(web::Json(rows))
}

/// One row per calendar date from the requested week up to `to`, at most `MAX_EXPORT_WEEKS` weeks
#[get("/{chatter_id}/{date}/export")]
async fn export_attendance(db: web::Data<DatabaseConnection>, actor: AuthContext, week: ChatterWeek, range: web::Query<ExportRange>) -> Result<impl Responder, PayrollError> {
    week.ensure_viewer(&actor)?;

    let last_week_start = match range.to {
        Some(to) if to < week.week_start => return Err(PayrollError::invalid("`to` is before the start of the week")),
        Some(to) => payroll::week_start(to, week.department),
        None => week.week_start,
    };
    if (last_week_start - week.week_start).num_weeks() >= MAX_EXPORT_WEEKS {
        return Err(PayrollError::invalid(format!("an export covers at most {MAX_EXPORT_WEEKS} weeks")));
    }
    let last_day = payroll::week_end(last_week_start);

    let marks = Attendance::find()
        .filter(attendance::Column::ChatterId.eq(week.chatter.id))
        .filter(attendance::Column::WeekStartDate.between(week.week_start, last_week_start))
        .order_by_asc(attendance::Column::WeekStartDate)
        .order_by_asc(attendance::Column::DayOfWeek)
        .all(db.as_ref()).await?;

    let mut rows = week.week_start.iter_days()
        .take_while(|date| *date <= last_day)
        .map(|date| (date, ExportRow {
            date,
            day_name: date.format("%A").to_string(),
            present: false,
            models_worked: Vec::new(),
            submitted_at: None,
        }))
        .collect::<BTreeMap<_, _>>();

    for mark in marks.into_iter().filter(|mark| mark.present) {
        let date = payroll::actual_date(mark.week_start_date, mark.day_of_week, week.department)?;
        let Some(row) = rows.get_mut(&date) else {
            continue;
        };

        row.present = true;
        row.submitted_at = row.submitted_at.max(mark.submitted_at);
        if let Some(model_name) = mark.model_name {
            row.models_worked.push(model_name);
        }
    }

    Ok(web::Json(
        rows.into_values()
            .map(|mut row| {
                row.models_worked.sort();
                row.models_worked.dedup();
                row
            })
            .collect::<Vec<_>>()
    ))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{Method, StatusCode}, test, App};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::{
        auth::{fixtures::{profile, MockSession}, Authority},
        entity::{payroll_week, sea_orm_active_enums::RoleType},
        pages::week::fixtures::{mark, record},
        payroll::Department,
    };

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[actix_web::test]
    async fn test_get_week_attendance() {
        let secret = b"secret";
        let chatter = profile(RoleType::Chatter, Some("10PM"));
        let week_start = date(2025, 6, 11);

        let actor = AuthContext::new(chatter.clone(), Vec::new());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .with_session(&actor)
            .append_query_results([
                vec![ chatter.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_week::Model>::new(),
            ])
            .append_query_results([
                vec![
                    mark(chatter.id, week_start, 3, "Anna"),
                    mark(chatter.id, week_start, 3, "Bella"),
                    mark(chatter.id, week_start, 4, "Anna"),
                ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(get_week_attendance)
        ).await;

        let token = Authority::new(secret).issue_for(&actor).unwrap();

        let req = test::TestRequest::default()
            .uri(&format!("/{}/2025-06-15", chatter.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let attendance: WeekAttendance = test::call_and_read_body_json(&app, req).await;
        assert_eq!(attendance.week.department, Department::LateShift);
        assert_eq!(attendance.week.week_start, week_start);
        assert_eq!(attendance.rows.len(), 3);
        assert_eq!(attendance.days_present, 2);
        assert_eq!(attendance.hours_worked, dec!(16));
    }

    #[actix_web::test]
    async fn test_mark_day_replaces_the_day() {
        let secret = b"secret";
        let chatter = profile(RoleType::Chatter, None);
        let today = Local::now().date_naive();
        let week_start = payroll::week_start(today, Department::StandardShift);

        let anna = mark(chatter.id, week_start, 1, "Anna");
        let bella = mark(chatter.id, week_start, 1, "Bella");

        let actor = AuthContext::new(chatter.clone(), Vec::new());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .with_session(&actor)
            .append_query_results([
                vec![ chatter.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_week::Model>::new(),
            ])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
            ])
            .append_query_results([
                vec![ anna.clone() ],
                vec![ bella.clone() ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(mark_day)
        ).await;

        let token = Authority::new(secret).issue_for(&actor).unwrap();

        let req = test::TestRequest::default()
            .uri(&format!("/{}/{}/1", chatter.id, today.format("%Y-%m-%d")))
            .method(Method::PUT)
            .insert_header(("Authorization", format!("JWT {token}")))
            .set_json(MarkDay { models: vec!["Bella".to_string(), " Anna ".to_string(), "Anna".to_string(), "".to_string()] })
            .to_request();

        let rows: Vec<attendance::Model> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows, vec![anna, bella]);
    }

    #[actix_web::test]
    async fn test_mark_day_guards() {
        let secret = b"secret";
        let chatter = profile(RoleType::Chatter, None);
        let today = Local::now().date_naive();
        let week_start = payroll::week_start(today, Department::StandardShift);

        let actor = AuthContext::new(chatter.clone(), Vec::new());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .with_session(&actor)
            // Past week
            .append_query_results([
                vec![ chatter.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_week::Model>::new(),
            ])
            // Locked week
            .with_session(&actor)
            .append_query_results([
                vec![ chatter.clone() ],
            ])
            .append_query_results([
                vec![ record(chatter.id, week_start, true, false) ],
            ])
            // Day out of range
            .with_session(&actor)
            .append_query_results([
                vec![ chatter.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_week::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(mark_day)
        ).await;

        let token = Authority::new(secret).issue_for(&actor).unwrap();
        let today = today.format("%Y-%m-%d").to_string();

        for (uri, status) in [
            (format!("/{}/2020-01-01/1", chatter.id), StatusCode::BAD_REQUEST),
            (format!("/{}/{today}/1", chatter.id), StatusCode::CONFLICT),
            (format!("/{}/{today}/7", chatter.id), StatusCode::BAD_REQUEST),
        ] {
            let req = test::TestRequest::default()
                .uri(&uri)
                .method(Method::PUT)
                .insert_header(("Authorization", format!("JWT {token}")))
                .set_json(MarkDay { models: vec!["Anna".to_string()] })
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), status, "{uri}");
        }
    }

    #[actix_web::test]
    async fn test_export_attendance() {
        let secret = b"secret";
        let chatter = profile(RoleType::Chatter, None);
        let first_week = date(2025, 6, 12);
        let second_week = date(2025, 6, 19);

        let actor = AuthContext::new(chatter.clone(), Vec::new());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .with_session(&actor)
            .append_query_results([
                vec![ chatter.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_week::Model>::new(),
            ])
            .append_query_results([
                vec![
                    mark(chatter.id, first_week, 4, "Bella"),
                    mark(chatter.id, first_week, 4, "Anna"),
                    mark(chatter.id, second_week, 0, "Anna"),
                ],
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(export_attendance)
        ).await;

        let token = Authority::new(secret).issue_for(&actor).unwrap();

        let req = test::TestRequest::default()
            .uri(&format!("/{}/2025-06-12/export?to=2025-06-20", chatter.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let rows: Vec<ExportRow> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.len(), 14);

        assert_eq!(rows[0].date, date(2025, 6, 12));
        assert_eq!(rows[0].day_name, "Thursday");
        assert!(rows[0].present);
        assert_eq!(rows[0].models_worked, vec!["Anna".to_string(), "Bella".to_string()]);
        assert!(rows[0].submitted_at.is_some());

        assert!(!rows[1].present);
        assert!(rows[1].models_worked.is_empty());

        assert_eq!(rows[10].date, date(2025, 6, 22));
        assert_eq!(rows[10].day_name, "Sunday");
        assert!(rows[10].present);

        assert_eq!(rows[13].date, date(2025, 6, 25));
    }

    #[actix_web::test]
    async fn test_export_range_must_not_end_before_the_week() {
        let secret = b"secret";
        let chatter = profile(RoleType::Chatter, None);

        let actor = AuthContext::new(chatter.clone(), Vec::new());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .with_session(&actor)
            .append_query_results([
                vec![ chatter.clone() ],
            ])
            .append_query_results([
                Vec::<payroll_week::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(export_attendance)
        ).await;

        let token = Authority::new(secret).issue_for(&actor).unwrap();

        let req = test::TestRequest::default()
            .uri(&format!("/{}/2025-06-12/export?to=2025-06-01", chatter.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_export_range_is_capped() {
        let secret = b"secret";
        let chatter = profile(RoleType::Chatter, None);
        let actor = AuthContext::new(chatter.clone(), Vec::new());

        let mut db = MockDatabase::new(DatabaseBackend::Postgres);
        for _ in 0..3 {
            db = db
                .with_session(&actor)
                .append_query_results([
                    vec![ chatter.clone() ],
                ])
                .append_query_results([
                    Vec::<payroll_week::Model>::new(),
                ]);
        }
        let db = db
            .append_query_results([
                Vec::<attendance::Model>::new(),
            ]);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Authority::new(secret)))
                .app_data(web::Data::new(db.into_connection()))
                .service(export_attendance)
        ).await;

        let token = Authority::new(secret).issue_for(&actor).unwrap();

        for to in ["9999-12-31", "2025-12-11"] {
            let req = test::TestRequest::default()
                .uri(&format!("/{}/2025-06-12/export?to={to}", chatter.id))
                .insert_header(("Authorization", format!("JWT {token}")))
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{to}");
        }

        // Wednesday closing the 26th week
        let req = test::TestRequest::default()
            .uri(&format!("/{}/2025-06-12/export?to=2025-12-10", chatter.id))
            .insert_header(("Authorization", format!("JWT {token}")))
            .to_request();

        let rows: Vec<ExportRow> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(rows.len(), 26 * 7);
        assert_eq!(rows.last().map(|row| row.date), Some(date(2025, 12, 10)));
    }
}
