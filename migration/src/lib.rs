//! Schema definition and migrations for the EventHive store.
//!
//! The [`catalog`] declares every entity, the [`resolver`] orders them by
//! their dependencies and the [`materializer`] applies them idempotently.

pub use sea_orm_migration::prelude::*;

pub mod catalog;
pub mod materializer;
pub mod resolver;

mod m2026_10_17_000001_create_eventhive_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m2026_10_17_000001_create_eventhive_schema::Migration)]
    }
}
