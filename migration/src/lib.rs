pub use sea_orm_migration::prelude::*;

mod util;
mod m20250701_090000_payroll_schema;
mod m20250702_081500_seed_profiles;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250701_090000_payroll_schema::Migration),
            Box::new(m20250702_081500_seed_profiles::Migration),
        ]
    }
}
