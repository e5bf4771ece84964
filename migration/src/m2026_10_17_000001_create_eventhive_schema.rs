//! Migration creating the full EventHive schema.
//!
//! Tables are generated from the entity catalog in dependency order, so this
//! migration stays in step with the catalog instead of duplicating it.

use sea_orm_migration::prelude::*;

use crate::catalog::CATALOG;
use crate::materializer::{drop_all, materialize_all};
use crate::resolver::resolve_order;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let order = resolve_order(CATALOG).map_err(|e| DbErr::Migration(e.to_string()))?;
        materialize_all(manager, &order)
            .await
            .map(|_| ())
            .map_err(|e| DbErr::Migration(e.to_string()))
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let order = resolve_order(CATALOG).map_err(|e| DbErr::Migration(e.to_string()))?;
        drop_all(manager, &order)
            .await
            .map_err(|e| DbErr::Migration(e.to_string()))
    }
}
