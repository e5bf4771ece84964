//! Read-only sanity checks run after seeding.
//!
//! The probe never mutates the store and never fails the bootstrap: every
//! problem it finds becomes a [`VerificationWarning`].

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult, JsonValue,
    Statement,
};
use sea_orm_migration::prelude::{Alias, Asterisk, Expr, Order, Query};
use serde::Serialize;

use migration::catalog::ID_COLUMN;

/// Entities the probe inspects.
pub const PROBED_ENTITIES: &[&str] = &["users", "events", "tickets"];

/// A non-fatal finding of the probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationWarning {
    pub entity: String,
    pub message: String,
}

/// Row count and leading rows of one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntityProbe {
    pub entity: String,
    pub row_count: i64,
    pub samples: Vec<JsonValue>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub entities: Vec<EntityProbe>,
    pub warnings: Vec<VerificationWarning>,
}

impl VerificationReport {
    pub fn row_count(&self, entity: &str) -> Option<i64> {
        self.entities
            .iter()
            .find(|e| e.entity == entity)
            .map(|e| e.row_count)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Counts rows and reads up to `sample_limit` rows (by id) for each entity.
pub async fn probe(
    db: &DatabaseConnection,
    entities: &[&str],
    sample_limit: u64,
) -> VerificationReport {
    let mut report = VerificationReport::default();

    for &entity in entities {
        match probe_entity(db, entity, sample_limit).await {
            Ok(result) => {
                log::info!("Verified {}: {} rows", entity, result.row_count);
                if result.row_count == 0 {
                    report.warnings.push(warning(entity, "no rows after seeding"));
                }
                report.entities.push(result);
            }
            Err(err) => {
                log::warn!("Verification query on {} failed: {}", entity, err);
                report.warnings.push(warning(entity, &err.to_string()));
            }
        }
    }

    for w in &report.warnings {
        log::warn!("Verification warning for {}: {}", w.entity, w.message);
    }
    report
}

async fn probe_entity(
    db: &DatabaseConnection,
    entity: &str,
    sample_limit: u64,
) -> Result<EntityProbe, DbErr> {
    let backend = db.get_database_backend();

    let row_count = match db.query_one(count_statement(backend, entity)).await? {
        Some(row) => row.try_get::<i64>("", "row_count")?,
        None => 0,
    };

    let sample = Query::select()
        .column(Asterisk)
        .from(Alias::new(entity))
        .order_by(Alias::new(ID_COLUMN), Order::Asc)
        .limit(sample_limit)
        .to_owned();
    let samples = JsonValue::find_by_statement(backend.build(&sample))
        .all(db)
        .await?;

    Ok(EntityProbe {
        entity: entity.to_string(),
        row_count,
        samples,
    })
}

fn warning(entity: &str, message: &str) -> VerificationWarning {
    VerificationWarning {
        entity: entity.to_string(),
        message: message.to_string(),
    }
}

fn count_statement(backend: DatabaseBackend, entity: &str) -> Statement {
    let query = Query::select()
        .expr_as(Expr::cust("COUNT(*)"), Alias::new("row_count"))
        .from(Alias::new(entity))
        .to_owned();
    backend.build(&query)
}
