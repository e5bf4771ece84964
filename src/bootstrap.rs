//! # Bootstrap Orchestrator
//!
//! Drives connect → ensure-database → materialize-schema → seed → verify as a
//! strictly sequential state machine. The first failure moves the machine to
//! [`BootstrapState::Failed`]; the store connection is released on every exit
//! path and nothing is retried.

use std::fmt;

use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::SchemaManager;
use serde::Serialize;

use crate::config::{AppConfig, ConfigLoader};
use crate::db::{self, DatabaseError, EnsuredDatabase};
use crate::error::BootstrapError;
use crate::seeds::{self, SeedRecord, SeedReport};
use crate::verify::{self, PROBED_ENTITIES, VerificationReport};
use migration::catalog::{CATALOG, EntityDef};
use migration::materializer::{MaterializeReport, materialize_all};
use migration::resolver::resolve_order;

/// Lifecycle of one bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BootstrapState {
    Disconnected,
    Connected,
    DatabaseEnsured,
    SchemaReady,
    Seeded,
    Verified,
    Failed,
}

impl BootstrapState {
    /// The only state this one may advance to on success.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Disconnected => Some(Self::Connected),
            Self::Connected => Some(Self::DatabaseEnsured),
            Self::DatabaseEnsured => Some(Self::SchemaReady),
            Self::SchemaReady => Some(Self::Seeded),
            Self::Seeded => Some(Self::Verified),
            Self::Verified | Self::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Failed)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition(self, to: Self) -> bool {
        match to {
            Self::Failed => !self.is_terminal(),
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for BootstrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Attempted transition the state machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal bootstrap transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: BootstrapState,
    pub to: BootstrapState,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct BootstrapReport {
    /// Every state the run passed through, starting at `Disconnected`.
    pub states: Vec<BootstrapState>,
    /// Entity names in resolved creation order.
    pub order: Vec<&'static str>,
    pub schema: MaterializeReport,
    pub seed: SeedReport,
    pub verification: VerificationReport,
}

/// Runs the bootstrap pipeline for one configuration.
pub struct Bootstrapper {
    config: AppConfig,
    catalog: &'static [EntityDef],
    records: Option<Vec<SeedRecord>>,
    state: BootstrapState,
    history: Vec<BootstrapState>,
}

impl Bootstrapper {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            catalog: CATALOG,
            records: None,
            state: BootstrapState::Disconnected,
            history: vec![BootstrapState::Disconnected],
        }
    }

    /// Replaces the entity catalog.
    pub fn with_catalog(mut self, catalog: &'static [EntityDef]) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replaces the seed dataset.
    pub fn with_seed_records(mut self, records: Vec<SeedRecord>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// States visited so far, in order.
    pub fn history(&self) -> &[BootstrapState] {
        &self.history
    }

    fn advance(&mut self, to: BootstrapState) -> Result<(), IllegalTransition> {
        if !self.state.can_transition(to) {
            return Err(IllegalTransition {
                from: self.state,
                to,
            });
        }
        log::debug!("Bootstrap state {} -> {}", self.state, to);
        self.state = to;
        self.history.push(to);
        Ok(())
    }

    fn fail(&mut self, error: BootstrapError) -> BootstrapError {
        if self.advance(BootstrapState::Failed).is_ok() {
            log::error!("Bootstrap failed during {}: {}", error.phase(), error);
        }
        error
    }

    /// Runs the whole pipeline.
    ///
    /// The catalog is resolved before any connection is opened, so a broken
    /// catalog never touches the store.
    pub async fn run(&mut self) -> Result<BootstrapReport, BootstrapError> {
        let order = match resolve_order(self.catalog) {
            Ok(order) => order,
            Err(e) => return Err(self.fail(e.into())),
        };
        log::info!(
            "Resolved creation order: {}",
            order.iter().map(|e| e.name).collect::<Vec<_>>().join(" -> ")
        );

        let server = match db::connect(&self.config, &self.config.database_url).await {
            Ok(conn) => conn,
            Err(e) => return Err(self.fail(BootstrapError::Connection(e))),
        };
        self.transition(BootstrapState::Connected);

        let conn = match db::ensure_database(&server, &self.config).await {
            Ok(EnsuredDatabase::Current) => server,
            Ok(EnsuredDatabase::Reconnect(url)) => {
                db::release(server).await;
                match db::connect(&self.config, &url).await {
                    Ok(conn) => conn,
                    Err(e) => return Err(self.fail(BootstrapError::DatabaseEnsure(e))),
                }
            }
            Err(e) => {
                db::release(server).await;
                return Err(self.fail(BootstrapError::DatabaseEnsure(e)));
            }
        };
        if let Err(source) = db::health_check(&conn).await {
            db::release(conn).await;
            return Err(self.fail(BootstrapError::DatabaseEnsure(
                DatabaseError::Unhealthy {
                    database: self.config.database_name.clone(),
                    source,
                },
            )));
        }
        self.transition(BootstrapState::DatabaseEnsured);

        let result = self.provision(&conn, &order).await;
        db::release(conn).await;

        let (schema, seed, verification) = result.map_err(|e| self.fail(e))?;
        Ok(BootstrapReport {
            states: self.history.clone(),
            order: order.iter().map(|e| e.name).collect(),
            schema,
            seed,
            verification,
        })
    }

    async fn provision(
        &mut self,
        conn: &DatabaseConnection,
        order: &[&EntityDef],
    ) -> Result<(MaterializeReport, SeedReport, VerificationReport), BootstrapError> {
        let manager = SchemaManager::new(conn);
        let schema = materialize_all(&manager, order).await?;
        log::info!(
            "Schema ready: {} created, {} already present",
            schema.created.len(),
            schema.already_present.len()
        );
        self.transition(BootstrapState::SchemaReady);

        let records = match &self.records {
            Some(records) => records.clone(),
            None => seeds::dataset(),
        };
        let seed = seeds::seed_all(conn, order, &records).await?;
        self.transition(BootstrapState::Seeded);

        let probed: Vec<&str> = PROBED_ENTITIES
            .iter()
            .copied()
            .filter(|name| order.iter().any(|e| e.name == *name))
            .collect();
        let verification = verify::probe(conn, &probed, self.config.verify_sample_limit).await;
        self.transition(BootstrapState::Verified);

        Ok((schema, seed, verification))
    }

    /// Advances along the success path. The pipeline only ever requests the
    /// successor of the current state, so a refusal is logged rather than
    /// surfaced.
    fn transition(&mut self, to: BootstrapState) {
        if let Err(e) = self.advance(to) {
            log::warn!("{}", e);
        }
    }
}

/// Loads configuration from the environment and bootstraps the EventHive store.
pub async fn bootstrap() -> Result<BootstrapReport, BootstrapError> {
    let config = ConfigLoader::new().load()?;
    Bootstrapper::new(config).run().await
}
