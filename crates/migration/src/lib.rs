pub use sea_orm_migration::prelude::*;

mod m20251019_090000_accounts;
mod m20251019_090100_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251019_090000_accounts::Migration),
            Box::new(m20251019_090100_transactions::Migration),
        ]
    }
}
