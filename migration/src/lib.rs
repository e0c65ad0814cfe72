pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_poaps;
mod m20260301_000002_create_distribution_methods;
mod m20260301_000003_create_claims;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_poaps::Migration),
            Box::new(m20260301_000002_create_distribution_methods::Migration),
            Box::new(m20260301_000003_create_claims::Migration),
        ]
    }
}
