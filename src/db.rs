//! Store connection management for the bootstrap.
//!
//! Opens the single SeaORM connection the pipeline works through, makes sure
//! the target database exists, and releases the connection afterwards.

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr,
    Statement,
};
use url::Url;

use crate::config::{AppConfig, redact_url};

/// Errors that can occur during connection management.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("failed to connect to {url}: {source}")]
    ConnectionFailed {
        url: String,
        #[source]
        source: DbErr,
    },
    #[error("invalid database configuration: {message}")]
    InvalidConfiguration { message: String },
    #[error("failed to ensure database '{database}': {source}")]
    EnsureFailed {
        database: String,
        #[source]
        source: DbErr,
    },
    #[error("database '{database}' failed its health check: {source}")]
    Unhealthy {
        database: String,
        #[source]
        source: DbErr,
    },
}

/// How the pipeline reaches the target database after it has been ensured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsuredDatabase {
    /// The current connection already points at the target database.
    Current,
    /// A new connection must be opened to the given URL.
    Reconnect(String),
}

/// Opens a connection to `url` using the pool settings from `cfg`.
///
/// No retry is attempted; a failure here is fatal to the bootstrap.
pub async fn connect(cfg: &AppConfig, url: &str) -> Result<DatabaseConnection, DatabaseError> {
    if url.trim().is_empty() {
        return Err(DatabaseError::InvalidConfiguration {
            message: "Database URL cannot be empty".to_string(),
        });
    }

    let mut opt = ConnectOptions::new(url.to_owned());
    opt.max_connections(cfg.db_max_connections)
        .acquire_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .connect_timeout(Duration::from_millis(cfg.db_acquire_timeout_ms))
        .idle_timeout(Duration::from_secs(600)) // 10 minutes
        .max_lifetime(Duration::from_secs(1800)) // 30 minutes
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    match Database::connect(opt).await {
        Ok(conn) => {
            log::info!("Connected to {}", redact_url(url));
            Ok(conn)
        }
        Err(source) => {
            log::error!("Failed to connect to {}: {}", redact_url(url), source);
            Err(DatabaseError::ConnectionFailed {
                url: redact_url(url),
                source,
            })
        }
    }
}

/// Makes sure the configured database exists on the connected server.
///
/// SQLite stores are the database file itself, so there is nothing to create.
/// For Postgres and MySQL the database is created when absent and the caller
/// is told which URL reaches it.
pub async fn ensure_database(
    db: &DatabaseConnection,
    cfg: &AppConfig,
) -> Result<EnsuredDatabase, DatabaseError> {
    let name = cfg.database_name.as_str();
    let ensure_failed = |source: DbErr| DatabaseError::EnsureFailed {
        database: name.to_string(),
        source,
    };

    match db.get_database_backend() {
        DatabaseBackend::Postgres => {
            if current_database_name(&cfg.database_url).as_deref() == Some(name) {
                return Ok(EnsuredDatabase::Current);
            }

            if postgres_database_exists(db, name).await.map_err(ensure_failed)? {
                log::info!("Database {} already exists", name);
            } else {
                let create = Statement::from_string(
                    DatabaseBackend::Postgres,
                    format!("CREATE DATABASE \"{}\"", name),
                );
                if let Err(err) = db.execute(create).await {
                    // A concurrent bootstrap may have won the race.
                    if !postgres_database_exists(db, name).await.map_err(ensure_failed)? {
                        return Err(ensure_failed(err));
                    }
                }
                log::info!("Created database {}", name);
            }

            Ok(EnsuredDatabase::Reconnect(target_database_url(
                &cfg.database_url,
                name,
            )?))
        }
        DatabaseBackend::MySql => {
            db.execute(Statement::from_string(
                DatabaseBackend::MySql,
                format!("CREATE DATABASE IF NOT EXISTS `{}`", name),
            ))
            .await
            .map_err(ensure_failed)?;
            log::info!("Ensured database {}", name);

            if current_database_name(&cfg.database_url).as_deref() == Some(name) {
                Ok(EnsuredDatabase::Current)
            } else {
                Ok(EnsuredDatabase::Reconnect(target_database_url(
                    &cfg.database_url,
                    name,
                )?))
            }
        }
        _ => {
            log::info!("SQLite store: the database file is the target database");
            Ok(EnsuredDatabase::Current)
        }
    }
}

async fn postgres_database_exists(db: &DatabaseConnection, name: &str) -> Result<bool, DbErr> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        "SELECT 1 FROM pg_database WHERE datname = $1",
        [name.into()],
    );
    Ok(db.query_one(stmt).await?.is_some())
}

/// Closes a connection, logging instead of failing when the close errors.
pub async fn release(db: DatabaseConnection) {
    match db.close().await {
        Ok(()) => log::debug!("Database connection released"),
        Err(e) => log::warn!("Error while releasing database connection: {}", e),
    }
}

/// Health check for the database connection. Run on the target database
/// before any schema work starts.
pub async fn health_check(db: &DatabaseConnection) -> Result<(), DbErr> {
    let stmt = Statement::from_string(db.get_database_backend(), "SELECT 1".to_string());
    db.query_one(stmt).await?;
    Ok(())
}

/// Rewrites a server URL so it points at the named database.
pub fn target_database_url(server_url: &str, database: &str) -> Result<String, DatabaseError> {
    let mut url = Url::parse(server_url).map_err(|e| DatabaseError::InvalidConfiguration {
        message: format!("invalid database URL: {}", e),
    })?;
    url.set_path(&format!("/{}", database));
    Ok(url.to_string())
}

/// Database named in the path of a server URL, if any.
fn current_database_name(server_url: &str) -> Option<String> {
    let url = Url::parse(server_url).ok()?;
    let name = url.path().trim_start_matches('/');
    (!name.is_empty()).then(|| name.to_string())
}
