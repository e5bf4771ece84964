//! Test utilities for database testing.
//!
//! In-memory SQLite stores with the schema applied, and temp-file stores for
//! running the full bootstrap (which opens its own connections).

#![allow(dead_code)]

use anyhow::Result;
use eventhive::config::AppConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::PathBuf;
use tempfile::TempDir;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// Foreign keys stay enforced so cascade behaviour can be observed.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// A file-backed SQLite store that lives as long as the returned guard.
pub struct TempStore {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TempStore {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("eventhive.db");
        Ok(Self { dir, path })
    }

    pub fn url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }

    /// Bootstrap configuration pointing at this store.
    pub fn config(&self) -> AppConfig {
        AppConfig {
            database_url: self.url(),
            db_max_connections: 1,
            db_acquire_timeout_ms: 2000,
            log_format: "pretty".to_string(),
            ..AppConfig::default()
        }
    }

    pub async fn connect(&self) -> Result<DatabaseConnection> {
        Ok(Database::connect(self.url()).await?)
    }
}

/// Number of rows in `table`.
pub async fn count_rows(db: &DatabaseConnection, table: &str) -> Result<i64> {
    let row = db
        .query_one(Statement::from_string(
            db.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM \"{}\"", table),
        ))
        .await?
        .ok_or_else(|| anyhow::anyhow!("count returned no row"))?;
    Ok(row.try_get::<i64>("", "n")?)
}

/// Executes raw SQL against the store.
pub async fn exec(db: &DatabaseConnection, sql: &str) -> Result<(), sea_orm::DbErr> {
    db.execute(Statement::from_string(db.get_database_backend(), sql.to_string()))
        .await
        .map(|_| ())
}

/// Inserts a user row directly with an explicit id.
pub async fn insert_user(
    db: &DatabaseConnection,
    id: i32,
    username: &str,
    email: &str,
    phone: Option<&str>,
) -> Result<(), sea_orm::DbErr> {
    let phone = phone.map_or("NULL".to_string(), |p| format!("'{}'", p));
    exec(
        db,
        &format!(
            "INSERT INTO users (id, username, email, phone, password_hash) \
             VALUES ({id}, '{username}', '{email}', {phone}, 'x')"
        ),
    )
    .await
}
