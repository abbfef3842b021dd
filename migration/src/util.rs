use sea_orm_migration::prelude::*;

pub(crate) fn default_table_statement() -> TableCreateStatement {
    TableCreateStatement::new()
        .if_not_exists()
        .col(ColumnDef::new(DefaultColumn::Id)
            .uuid()
            .primary_key()
            .default(Expr::cust("GEN_RANDOM_UUID()"))
            .take())
        .col(ColumnDef::new(DefaultColumn::CreatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .col(ColumnDef::new(DefaultColumn::UpdatedAt)
            .timestamp_with_time_zone()
            .not_null()
            .take())
        .take()
}

#[derive(DeriveIden)]
pub(crate) enum DefaultColumn {
    Id,
    CreatedAt,
    UpdatedAt,
}

/// Table owned by one chatter and edited by profiles, run `setup_chatter_table_fk` afterwards
///
/// # Example
///
/// ```rs
/// manager
///     .create_table(chatter_table_statement()
///         .table(SalesEntry::Table)
///         .col(ColumnDef::new(SalesEntry::Earnings)
///             .decimal_len(12, 2)
///             .not_null())
///         .take()
///     ).await?;
/// setup_chatter_table_fk!(manager, SalesEntry::Table);
/// ```
pub(crate) fn chatter_table_statement() -> TableCreateStatement {
    default_table_statement()
        .col(ColumnDef::new(DefaultUserColumn::CreatedBy)
            .uuid())
        .col(ColumnDef::new(DefaultUserColumn::UpdatedBy)
            .uuid())
        .col(ColumnDef::new(DefaultUserColumn::ChatterId)
            .uuid()
            .not_null())
        .col(ColumnDef::new(DefaultUserColumn::WeekStartDate)
            .date()
            .not_null())
        .take()
}

#[macro_export]
macro_rules! setup_chatter_table_fk {
    ($m:expr,$t:expr) => {{
        use crate::util::*;
        use crate::m20250701_090000_payroll_schema::Profile;

        $m.create_foreign_key(ForeignKeyCreateStatement::new()
                .from($t, DefaultUserColumn::ChatterId)
                .to(Profile::Table, DefaultColumn::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade)
                .take()
        ).await?;

        for column in [DefaultUserColumn::CreatedBy, DefaultUserColumn::UpdatedBy] {
            $m.create_foreign_key(ForeignKeyCreateStatement::new()
                    .from($t, column)
                    .to(Profile::Table, DefaultColumn::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .on_update(ForeignKeyAction::Cascade)
                    .take()
            ).await?;
        }
    }};
}

#[derive(DeriveIden)]
pub(crate) enum DefaultUserColumn {
    CreatedBy,
    UpdatedBy,
    ChatterId,
    WeekStartDate,
}
