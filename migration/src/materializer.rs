//! Renders catalog entries into DDL and applies them idempotently.
//!
//! Tables and indexes are created only when absent, so running the
//! materializer against an already provisioned store is a no-op.

use sea_orm_migration::prelude::*;
use thiserror::Error;

use crate::catalog::{Check, EntityDef, FieldDef, FieldDefault, FieldKind, OnDelete, ID_COLUMN};

/// Minimum width of the string column backing an enumerated field.
const ENUM_COLUMN_MIN_LEN: u32 = 20;

/// Failure to create the structure of one entity.
#[derive(Debug, Error)]
#[error("failed to create structure for entity '{entity}': {source}")]
pub struct MaterializeError {
    pub entity: &'static str,
    #[source]
    pub source: DbErr,
}

/// Result of materializing a single entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    Created,
    AlreadyPresent,
}

/// Which entities were created and which already existed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub created: Vec<&'static str>,
    pub already_present: Vec<&'static str>,
}

/// A named index derived from a unique constraint or a secondary index.
#[derive(Debug, Clone)]
pub struct IndexStatement {
    pub name: String,
    pub statement: IndexCreateStatement,
}

/// Builds the `CREATE TABLE IF NOT EXISTS` statement for an entity.
pub fn table_statement(entity: &EntityDef) -> TableCreateStatement {
    let table = Alias::new(entity.name);
    let mut stmt = Table::create();
    stmt.table(table.clone()).if_not_exists().col(
        ColumnDef::new(Alias::new(ID_COLUMN))
            .integer()
            .not_null()
            .auto_increment()
            .primary_key(),
    );

    for field in entity.columns() {
        stmt.col(column_def(&field));
    }

    for fk in entity.foreign_keys {
        stmt.foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_{}", entity.name, fk.column))
                .from(table.clone(), Alias::new(fk.column))
                .to(Alias::new(fk.references), Alias::new(ID_COLUMN))
                .on_delete(match fk.on_delete {
                    OnDelete::Cascade => ForeignKeyAction::Cascade,
                    OnDelete::SetNull => ForeignKeyAction::SetNull,
                })
                .on_update(ForeignKeyAction::Cascade),
        );
    }

    stmt.to_owned()
}

/// Builds the unique and secondary index statements for an entity.
pub fn index_statements(entity: &EntityDef) -> Vec<IndexStatement> {
    let unique = entity
        .unique
        .iter()
        .map(|u| (u.index_name(entity.name), u.columns, true));
    let secondary = entity
        .indexes
        .iter()
        .map(|i| (i.name.to_string(), i.columns, false));

    unique
        .chain(secondary)
        .map(|(name, columns, is_unique)| {
            let mut statement = Index::create();
            statement
                .name(name.as_str())
                .table(Alias::new(entity.name))
                .if_not_exists();
            for column in columns {
                statement.col(Alias::new(*column));
            }
            if is_unique {
                statement.unique();
            }
            IndexStatement {
                name,
                statement: statement.to_owned(),
            }
        })
        .collect()
}

fn column_def(field: &FieldDef) -> ColumnDef {
    let name = Alias::new(field.name);
    let mut def = ColumnDef::new(name.clone());
    match field.kind {
        FieldKind::Integer => def.integer(),
        FieldKind::String(len) => def.string_len(len),
        FieldKind::Text => def.text(),
        FieldKind::Decimal(precision, scale) => def.decimal_len(precision, scale),
        FieldKind::Boolean => def.boolean(),
        FieldKind::Timestamp => def.timestamp_with_time_zone(),
        FieldKind::Enumerated(values) => def
            .string_len(enum_column_len(values))
            .check(Expr::col(name.clone()).is_in(values.iter().copied())),
        FieldKind::Json => def.json_binary(),
    };

    if field.nullable {
        def.null();
    } else {
        def.not_null();
    }
    if let Some(default) = field.default {
        def.default(default_expr(default));
    }
    if let Some(check) = field.check {
        def.check(match check {
            Check::AtLeast(min) => Expr::col(name).gte(min),
            Check::Between(low, high) => Expr::col(name).between(low, high),
        });
    }
    def
}

fn enum_column_len(values: &[&str]) -> u32 {
    let longest = values.iter().map(|v| v.len()).max().unwrap_or(0) as u32;
    longest.max(ENUM_COLUMN_MIN_LEN)
}

fn default_expr(default: FieldDefault) -> SimpleExpr {
    match default {
        FieldDefault::Int(value) => value.into(),
        FieldDefault::Bool(value) => value.into(),
        FieldDefault::Str(value) => value.into(),
        FieldDefault::CurrentTimestamp => Expr::current_timestamp().into(),
    }
}

/// Creates the table and indexes of one entity unless they already exist.
pub async fn materialize_entity(
    manager: &SchemaManager<'_>,
    entity: &EntityDef,
) -> Result<Materialized, DbErr> {
    let outcome = if manager.has_table(entity.name).await? {
        Materialized::AlreadyPresent
    } else {
        manager.create_table(table_statement(entity)).await?;
        Materialized::Created
    };

    for index in index_statements(entity) {
        if !manager.has_index(entity.name, &index.name).await? {
            log::debug!("Creating index {} on {}", index.name, entity.name);
            create_index_if_absent(manager, entity.name, index).await?;
        }
    }

    Ok(outcome)
}

/// Creates an index, treating a failure as success when the index turns out
/// to exist afterwards.
///
/// MySQL renders `CREATE INDEX` without `IF NOT EXISTS`, so when two runs race
/// past the `has_index` check the loser gets a duplicate key name error (1061).
async fn create_index_if_absent(
    manager: &SchemaManager<'_>,
    table: &str,
    index: IndexStatement,
) -> Result<(), DbErr> {
    match manager.create_index(index.statement).await {
        Ok(()) => Ok(()),
        Err(err) => {
            if manager.has_index(table, &index.name).await? {
                log::info!("Index {} on {} was created concurrently", index.name, table);
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

/// Materializes every entity in the given order, stopping at the first failure.
pub async fn materialize_all(
    manager: &SchemaManager<'_>,
    order: &[&EntityDef],
) -> Result<MaterializeReport, MaterializeError> {
    let mut report = MaterializeReport::default();

    for entity in order {
        match materialize_entity(manager, entity).await {
            Ok(Materialized::Created) => {
                log::info!("Created table {}", entity.name);
                report.created.push(entity.name);
            }
            Ok(Materialized::AlreadyPresent) => {
                log::info!("Table {} already exists, skipping", entity.name);
                report.already_present.push(entity.name);
            }
            Err(source) => {
                log::error!("Failed to create table {}: {}", entity.name, source);
                return Err(MaterializeError {
                    entity: entity.name,
                    source,
                });
            }
        }
    }

    Ok(report)
}

/// Drops every entity in reverse creation order.
pub async fn drop_all(
    manager: &SchemaManager<'_>,
    order: &[&EntityDef],
) -> Result<(), MaterializeError> {
    for entity in order.iter().rev() {
        manager
            .drop_table(Table::drop().table(Alias::new(entity.name)).if_exists().to_owned())
            .await
            .map_err(|source| MaterializeError {
                entity: entity.name,
                source,
            })?;
    }
    Ok(())
}
