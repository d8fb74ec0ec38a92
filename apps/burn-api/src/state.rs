//! Application state for the burn API

use std::path::PathBuf;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::Config;

pub struct AppState {
    pub db: SqlitePool,
    pub storage_dir: PathBuf,
    pub public_base_url: Option<String>,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        let db_url = config.database_url.clone().unwrap_or_else(|| {
            let data_dir = dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("burn-api");
            std::fs::create_dir_all(&data_dir).ok();
            format!("sqlite:{}/audit.db?mode=rwc", data_dir.display())
        });

        tracing::info!("Connecting to database: {}", db_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .with_context(|| format!("connecting to {}", db_url))?;

        Self::with_pool(
            pool,
            config.storage_dir.clone(),
            config.public_base_url.clone(),
        )
        .await
    }

    /// State over an existing pool; runs migrations and creates the storage directory.
    pub async fn with_pool(
        db: SqlitePool,
        storage_dir: PathBuf,
        public_base_url: Option<String>,
    ) -> Result<Self> {
        Self::run_migrations(&db).await?;

        tokio::fs::create_dir_all(&storage_dir)
            .await
            .with_context(|| format!("creating storage dir {}", storage_dir.display()))?;

        Ok(Self {
            db,
            storage_dir,
            public_base_url: public_base_url.map(|u| u.trim_end_matches('/').to_string()),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS audit_trails (
                id TEXT PRIMARY KEY,
                document_id TEXT NOT NULL,
                original_hash TEXT NOT NULL,
                final_hash TEXT NOT NULL,
                signed_url TEXT NOT NULL,
                fields_json TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_audit_trails_document ON audit_trails(document_id)
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}

/// Get platform-specific data directory
mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
