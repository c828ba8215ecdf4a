pub mod birth_control;
pub mod periods;
pub mod profile;
pub mod symptoms;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

pub use birth_control::BirthControlStore;
pub use periods::PeriodStore;
pub use profile::ProfileStore;
pub use symptoms::SymptomStore;

/// Explicitly constructed storage handle. Cloned freely (the pool is shared)
/// and injected into the estimator, the tracker, and the route handlers.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)
                        .await
                        .context("Failed to create database directory")?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Private in-memory database, one connection so every query sees the
    /// same data. Used by tests.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.init().await?;
        Ok(db)
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS period_records (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                flow TEXT NOT NULL DEFAULT 'medium',
                notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create period_records table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_periods_user_start
            ON period_records (user_id, start_date);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create period index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS symptoms (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                symptom_type TEXT NOT NULL,
                severity INTEGER NOT NULL,
                notes TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create symptoms table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_symptoms_user_date
            ON symptoms (user_id, date);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create symptom index")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS birth_control_records (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                date TEXT NOT NULL,
                taken INTEGER NOT NULL,
                times_taken INTEGER NOT NULL DEFAULT 1,
                notes TEXT NOT NULL DEFAULT '',
                UNIQUE (user_id, date)
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create birth_control_records table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                user_id TEXT PRIMARY KEY,
                name TEXT NOT NULL DEFAULT '',
                birth_date TEXT,
                height_cm REAL,
                weight_kg REAL,
                average_cycle_length INTEGER NOT NULL DEFAULT 28,
                average_period_length INTEGER NOT NULL DEFAULT 5,
                last_period_start TEXT,
                birth_control_type TEXT NOT NULL DEFAULT '',
                birth_control_start TEXT
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create user_profiles table")?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn periods(&self) -> PeriodStore {
        PeriodStore::new(self.pool.clone())
    }

    pub fn symptoms(&self) -> SymptomStore {
        SymptomStore::new(self.pool.clone())
    }

    pub fn birth_control(&self) -> BirthControlStore {
        BirthControlStore::new(self.pool.clone())
    }

    pub fn profile(&self) -> ProfileStore {
        ProfileStore::new(self.pool.clone())
    }
}
