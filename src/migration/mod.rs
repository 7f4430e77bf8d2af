//! SeaORM database migrations.
//!
//! Written with the schema builder so the same set runs on PostgreSQL and SQLite.

pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users;
mod m20260301_000002_create_folders;
mod m20260301_000003_create_test_cases;
mod m20260301_000004_create_tags;
mod m20260301_000005_create_test_suites;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users::Migration),
            Box::new(m20260301_000002_create_folders::Migration),
            Box::new(m20260301_000003_create_test_cases::Migration),
            Box::new(m20260301_000004_create_tags::Migration),
            Box::new(m20260301_000005_create_test_suites::Migration),
        ]
    }
}
