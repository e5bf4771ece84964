//! # Error Handling
//!
//! Error taxonomy for the bootstrap pipeline. Every fatal error names the
//! phase it was raised in and, where one applies, the entity involved.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

use crate::config::ConfigError;
use crate::db::DatabaseError;
use crate::seeds::SeedError;
use migration::materializer::MaterializeError;
use migration::resolver::ResolveError;

/// Fatal bootstrap failures.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("cyclic dependency between entities: {}", .entities.join(", "))]
    CyclicDependency { entities: Vec<&'static str> },

    #[error("entity '{entity}' references unknown entity '{target}'")]
    UnknownReference {
        entity: &'static str,
        target: &'static str,
    },

    #[error("cannot reach the store: {0}")]
    Connection(#[source] DatabaseError),

    #[error("cannot ensure the target database: {0}")]
    DatabaseEnsure(#[source] DatabaseError),

    #[error("schema creation failed for entity '{entity}': {source}")]
    SchemaCreation {
        entity: &'static str,
        #[source]
        source: DbErr,
    },

    #[error("seed insert failed for {entity} {key}: {source}")]
    SeedInsert {
        entity: &'static str,
        key: String,
        #[source]
        source: DbErr,
    },
}

impl BootstrapError {
    /// Name of the bootstrap phase the error was raised in.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::CyclicDependency { .. } | Self::UnknownReference { .. } => "resolve",
            Self::Connection(_) => "connect",
            Self::DatabaseEnsure(_) => "ensure_database",
            Self::SchemaCreation { .. } => "materialize_schema",
            Self::SeedInsert { .. } => "seed",
        }
    }

    /// Entity the failure is attributed to, if any.
    pub fn entity(&self) -> Option<&'static str> {
        match self {
            Self::UnknownReference { entity, .. }
            | Self::SchemaCreation { entity, .. }
            | Self::SeedInsert { entity, .. } => Some(*entity),
            _ => None,
        }
    }
}

impl From<ResolveError> for BootstrapError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::CyclicDependency { entities } => Self::CyclicDependency { entities },
            ResolveError::UnknownReference { entity, target } => {
                Self::UnknownReference { entity, target }
            }
        }
    }
}

impl From<MaterializeError> for BootstrapError {
    fn from(error: MaterializeError) -> Self {
        Self::SchemaCreation {
            entity: error.entity,
            source: error.source,
        }
    }
}

impl From<SeedError> for BootstrapError {
    fn from(error: SeedError) -> Self {
        match error {
            SeedError::Insert {
                entity,
                key,
                source,
            } => Self::SeedInsert {
                entity,
                key,
                source,
            },
        }
    }
}

/// Returns true when the error reports a primary-key or unique-constraint
/// conflict, on any supported backend.
pub fn is_unique_violation(error: &DbErr) -> bool {
    const PG_UNIQUE: &str = "23505";
    const MYSQL_DUPLICATE_CODES: &[&str] = &["1022", "1062", "1169", "1586"];
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    if matches!(error.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    let runtime_err = match error {
        DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    db_error.code().is_some_and(|code| {
        let code = code.as_ref();
        code == PG_UNIQUE
            || MYSQL_DUPLICATE_CODES.contains(&code)
            || SQLITE_DUPLICATE_CODES.contains(&code)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_errors_map_to_resolve_phase() {
        let err: BootstrapError = ResolveError::CyclicDependency {
            entities: vec!["a", "b"],
        }
        .into();
        assert_eq!(err.phase(), "resolve");
        assert!(err.to_string().contains("a, b"));

        let err: BootstrapError = ResolveError::UnknownReference {
            entity: "tickets",
            target: "events",
        }
        .into();
        assert_eq!(err.entity(), Some("tickets"));
    }

    #[test]
    fn schema_errors_keep_entity_and_cause() {
        let err: BootstrapError = MaterializeError {
            entity: "events",
            source: DbErr::Custom("disk full".to_string()),
        }
        .into();
        assert_eq!(err.phase(), "materialize_schema");
        assert_eq!(err.entity(), Some("events"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn seed_errors_keep_record_key() {
        let err: BootstrapError = SeedError::Insert {
            entity: "tickets",
            key: "id=4".to_string(),
            source: DbErr::Custom("boom".to_string()),
        }
        .into();
        assert_eq!(err.phase(), "seed");
        assert!(err.to_string().contains("tickets id=4"));
    }

    #[test]
    fn non_driver_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&DbErr::Custom("x".to_string())));
        assert!(!is_unique_violation(&DbErr::RecordNotInserted));
    }
}
