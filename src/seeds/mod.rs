//! Database seeding functionality
//!
//! Inserts the baseline dataset in resolved entity order. Every insert is
//! insert-if-absent: a primary-key or unique conflict means the row is
//! already seeded and is counted, not raised.

pub mod dataset;

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr, Statement};
use thiserror::Error;

use crate::error::is_unique_violation;
use migration::catalog::{EntityDef, ID_COLUMN};

pub use dataset::{SeedRecord, dataset};

/// Outcome of one insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Inserted,
    AlreadySeeded,
}

/// Seed results for one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySeedSummary {
    pub entity: &'static str,
    pub inserted: usize,
    pub already_seeded: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub entities: Vec<EntitySeedSummary>,
}

impl SeedReport {
    pub fn inserted(&self) -> usize {
        self.entities.iter().map(|e| e.inserted).sum()
    }

    pub fn already_seeded(&self) -> usize {
        self.entities.iter().map(|e| e.already_seeded).sum()
    }

    pub fn for_entity(&self, entity: &str) -> Option<&EntitySeedSummary> {
        self.entities.iter().find(|e| e.entity == entity)
    }
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to seed {entity} {key}: {source}")]
    Insert {
        entity: &'static str,
        key: String,
        #[source]
        source: DbErr,
    },
}

/// Inserts one record, treating a uniqueness conflict as already seeded.
pub async fn seed_record(
    db: &DatabaseConnection,
    record: &SeedRecord,
) -> Result<SeedOutcome, SeedError> {
    match record.insert(db).await {
        Ok(()) => Ok(SeedOutcome::Inserted),
        Err(err) if is_unique_violation(&err) => {
            log::debug!("{} {} already seeded", record.entity, record.key());
            Ok(SeedOutcome::AlreadySeeded)
        }
        Err(source) => Err(SeedError::Insert {
            entity: record.entity,
            key: record.key(),
            source,
        }),
    }
}

/// Seeds `records` entity by entity, following `order`. Records for
/// entities outside `order` are skipped.
pub async fn seed_all(
    db: &DatabaseConnection,
    order: &[&EntityDef],
    records: &[SeedRecord],
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for entity in order {
        let pending: Vec<&SeedRecord> = records
            .iter()
            .filter(|r| r.entity == entity.name)
            .collect();
        if pending.is_empty() {
            continue;
        }

        let mut summary = EntitySeedSummary {
            entity: entity.name,
            ..Default::default()
        };
        for record in pending {
            match seed_record(db, record).await {
                Ok(SeedOutcome::Inserted) => summary.inserted += 1,
                Ok(SeedOutcome::AlreadySeeded) => summary.already_seeded += 1,
                Err(e) => {
                    log::error!("Seeding {} failed: {}", entity.name, e);
                    return Err(e);
                }
            }
        }
        log::info!(
            "Seeded {}: {} inserted, {} already present",
            entity.name,
            summary.inserted,
            summary.already_seeded
        );

        if db.get_database_backend() == DatabaseBackend::Postgres {
            realign_sequence(db, entity.name)
                .await
                .map_err(|source| SeedError::Insert {
                    entity: entity.name,
                    key: "sequence".to_string(),
                    source,
                })?;
        }
        report.entities.push(summary);
    }

    let skipped = records
        .iter()
        .filter(|r| !order.iter().any(|e| e.name == r.entity))
        .count();
    if skipped > 0 {
        log::warn!("{} seed records target entities outside the schema", skipped);
    }

    log::info!("Seeding completed: {} rows inserted", report.inserted());
    Ok(report)
}

/// Moves the table's serial sequence past the explicitly seeded ids.
async fn realign_sequence(db: &DatabaseConnection, table: &str) -> Result<(), DbErr> {
    let sql = format!(
        "SELECT setval(pg_get_serial_sequence('{table}', '{id}'), \
         COALESCE((SELECT MAX(\"{id}\") FROM \"{table}\"), 0) + 1, false)",
        table = table,
        id = ID_COLUMN,
    );
    db.execute(Statement::from_string(DatabaseBackend::Postgres, sql))
        .await?;
    Ok(())
}
