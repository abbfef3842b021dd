use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::{setup_chatter_table_fk, util::{chatter_table_statement, default_table_statement, DefaultColumn, DefaultUserColumn}};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager
            .create_type(
                schema.create_enum_from_active_enum::<RoleType>()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(Profile::Table)
                .col(ColumnDef::new(Profile::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Profile::Password)
                    .binary()
                    .not_null()) // SHA-256 of `password:username`
                .col(ColumnDef::new(Profile::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Profile::Role)
                    .custom(RoleType::name())
                    .not_null())
                .col(ColumnDef::new(Profile::Department)
                    .text())
                .col(ColumnDef::new(Profile::HourlyRate)
                    .decimal_len(10, 2)
                    .not_null()
                    .default(0))
                .col(ColumnDef::new(Profile::Active)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(UserRole::Table)
                .col(ColumnDef::new(UserRole::ProfileId)
                    .uuid()
                    .not_null())
                .col(ColumnDef::new(UserRole::Role)
                    .custom(RoleType::name())
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(UserRole::Table, UserRole::ProfileId)
            .to(Profile::Table, DefaultColumn::Id)
            .on_delete(ForeignKeyAction::Cascade)
            .on_update(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager.create_index(IndexCreateStatement::new()
            .name("idx_user_role_profile_role")
            .table(UserRole::Table)
            .col(UserRole::ProfileId)
            .col(UserRole::Role)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(chatter_table_statement()
                .table(SalesEntry::Table)
                .col(ColumnDef::new(SalesEntry::ModelName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(SalesEntry::DayOfWeek)
                    .small_integer()
                    .not_null()
                    .check(Expr::col(SalesEntry::DayOfWeek).between(0, 6)))
                .col(ColumnDef::new(SalesEntry::Earnings)
                    .decimal_len(12, 2)
                    .not_null()
                    .check(Expr::col(SalesEntry::Earnings).gte(0)))
                .take()
            ).await?;
        setup_chatter_table_fk!(manager, SalesEntry::Table);

        manager.create_index(IndexCreateStatement::new()
            .name("idx_sales_entry_model_day")
            .table(SalesEntry::Table)
            .col(DefaultUserColumn::ChatterId)
            .col(SalesEntry::ModelName)
            .col(SalesEntry::DayOfWeek)
            .col(DefaultUserColumn::WeekStartDate)
            .unique()
            .take()
        ).await?;

        manager
            .create_table(chatter_table_statement()
                .table(Attendance::Table)
                .col(ColumnDef::new(Attendance::DayOfWeek)
                    .small_integer()
                    .not_null()
                    .check(Expr::col(Attendance::DayOfWeek).between(0, 6)))
                .col(ColumnDef::new(Attendance::Present)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(Attendance::ModelName)
                    .text())
                .col(ColumnDef::new(Attendance::SubmittedAt)
                    .timestamp_with_time_zone())
                .take()
            ).await?;
        setup_chatter_table_fk!(manager, Attendance::Table);

        manager.create_index(IndexCreateStatement::new()
            .name("idx_attendance_chatter_week")
            .table(Attendance::Table)
            .col(DefaultUserColumn::ChatterId)
            .col(DefaultUserColumn::WeekStartDate)
            .take()
        ).await?;

        manager
            .create_table(chatter_table_statement()
                .table(PayrollWeek::Table)
                .col(ColumnDef::new(PayrollWeek::SalesLocked)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(PayrollWeek::AdminConfirmed)
                    .boolean()
                    .not_null()
                    .default(false))
                .col(ColumnDef::new(PayrollWeek::ConfirmedHoursWorked)
                    .decimal_len(6, 2))
                .col(ColumnDef::new(PayrollWeek::ConfirmedCommissionRate)
                    .decimal_len(5, 2))
                .col(ColumnDef::new(PayrollWeek::OvertimePay)
                    .decimal_len(12, 2))
                .col(ColumnDef::new(PayrollWeek::OvertimeNotes)
                    .text())
                .col(ColumnDef::new(PayrollWeek::DeductionAmount)
                    .decimal_len(12, 2))
                .col(ColumnDef::new(PayrollWeek::DeductionNotes)
                    .text())
                .take()
            ).await?;
        setup_chatter_table_fk!(manager, PayrollWeek::Table);

        // One lock record per chatter and week
        manager.create_index(IndexCreateStatement::new()
            .name("idx_payroll_week_chatter_week")
            .table(PayrollWeek::Table)
            .col(DefaultUserColumn::ChatterId)
            .col(DefaultUserColumn::WeekStartDate)
            .unique()
            .take()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(
            TableDropStatement::new()
                .table(PayrollWeek::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(Attendance::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(SalesEntry::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(UserRole::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(Profile::Table)
                .take()
        ).await?;

        manager
            .drop_type(
                TypeDropStatement::new()
                    .name(RoleType::name())
                    .to_owned()
            ).await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Profile {
    Table,
    Username,
    Password,
    Name,
    Role,
    Department,
    HourlyRate,
    Active,
}

#[derive(DeriveIden)]
enum UserRole {
    Table,
    ProfileId,
    Role,
}

#[derive(DeriveIden)]
enum SalesEntry {
    Table,
    ModelName,
    DayOfWeek,
    Earnings,
}

#[derive(DeriveIden)]
enum Attendance {
    Table,
    DayOfWeek,
    Present,
    ModelName,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum PayrollWeek {
    Table,
    SalesLocked,
    AdminConfirmed,
    ConfirmedHoursWorked,
    ConfirmedCommissionRate,
    OvertimePay,
    OvertimeNotes,
    DeductionAmount,
    DeductionNotes,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "chatter")]
    Chatter,
    #[sea_orm(string_value = "hr_work_force")]
    HrWorkForce,
    #[sea_orm(string_value = "va")]
    Va,
    #[sea_orm(string_value = "marketing_team")]
    MarketingTeam,
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "creator")]
    Creator,
}
