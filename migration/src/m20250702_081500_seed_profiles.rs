use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250701_090000_payroll_schema::Profile;

const DEPARTMENTS: [&str; 3] = ["6AM", "2PM", "10PM"];

const CHATTERS: u128 = 30;

/// Staff accounts, `(id, username, role)`
const STAFF: [(u128, &str, &str); 3] = [
    (12345, "admin", "admin"),
    (12346, "hr", "hr_work_force"),
    (12347, "va", "va"),
];

fn insert_profile(id: u128, username: &str, role: &str, department: Option<&str>, hourly_rate_cents: u32) -> InsertStatement {
    let time = Expr::val("2025-07-02T08:15:00.000Z").cast_as("timestamptz");
    // Seeded passwords equal the username
    let hashed_password = &sha2::Sha256::digest(format!("{username}:{username}"))[..];
    let hourly_rate = format!("{}.{:02}", hourly_rate_cents / 100, hourly_rate_cents % 100);

    Query::insert()
        .into_table(Profile::Table)
        .columns(["id", "created_at", "updated_at", "username", "password", "name", "role", "department", "hourly_rate", "active"])
        .values_panic([
            Expr::val(format!("{id:032x}")).cast_as("uuid"),
            time.clone(),
            time,
            username.into(),
            hashed_password.into(),
            username.to_uppercase().into(),
            Expr::val(role).cast_as("role_type"),
            department.map(str::to_string).into(),
            Expr::val(hourly_rate).cast_as("numeric"),
            true.into(),
        ])
        .to_owned()
}

fn delete_profile(id: u128) -> DeleteStatement {
    Query::delete()
        .from_table(Profile::Table)
        .and_where(Expr::col("id").eq(Expr::val(format!("{id:032x}")).cast_as("uuid")))
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Chatters spread over the three shifts
        for i in 1..=CHATTERS {
            let username = format!("chatter{i}");
            let department = DEPARTMENTS[(i as usize) % DEPARTMENTS.len()];
            let hourly_rate_cents = rand::random_range(1_000..=2_500);

            manager.exec_stmt(insert_profile(i, &username, "chatter", Some(department), hourly_rate_cents)).await?;
        }

        for (id, username, role) in STAFF {
            manager.exec_stmt(insert_profile(id, username, role, None, 0)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for i in 1..=CHATTERS {
            manager.exec_stmt(delete_profile(i)).await?;
        }

        for (id, _, _) in STAFF {
            manager.exec_stmt(delete_profile(id)).await?;
        }

        Ok(())
    }
}
