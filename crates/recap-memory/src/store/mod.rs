//! SQLite-backed persistent store.
//!
//! Split into focused submodules:
//! - `messages` — chat-scoped message log, quiz sampling, retention sweep
//! - `stats` — profanity counters and quiz scores (upsert by chat + user)

mod messages;
mod stats;

use recap_core::{config::shellexpand, config::MemoryConfig, error::RecapError};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Scoping predicate shared by every message read path.
///
/// Binds: the requested chat id, then [`crate::LEGACY_CHAT_ID`].
const CHAT_SCOPE: &str = "(chat_id = ? OR chat_id = ?)";

/// Persistent store backed by SQLite.
///
/// Cheap to clone; every clone shares the same connection pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(config: &MemoryConfig) -> Result<Self, RecapError> {
        let db_path = shellexpand(&config.db_path);

        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecapError::Memory(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| RecapError::Memory(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| RecapError::Memory(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("Message store initialized at {db_path}");

        Ok(Self { pool })
    }

    /// Wrap an already-migrated pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get the database file size in bytes.
    pub async fn db_size(&self) -> Result<u64, RecapError> {
        let (page_count,): (i64,) = sqlx::query_as("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RecapError::Memory(format!("pragma failed: {e}")))?;

        let (page_size,): (i64,) = sqlx::query_as("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RecapError::Memory(format!("pragma failed: {e}")))?;

        Ok((page_count * page_size) as u64)
    }

    /// Write a consistent, compacted copy of the database to `dest`.
    ///
    /// Safe while the bot is running. Fails if `dest` already exists.
    pub async fn backup(&self, dest: &Path) -> Result<(), RecapError> {
        if dest.exists() {
            return Err(RecapError::Memory(format!(
                "backup target already exists: {}",
                dest.display()
            )));
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| RecapError::Memory(format!("failed to create backup dir: {e}")))?;
        }

        sqlx::query("VACUUM INTO ?")
            .bind(dest.to_string_lossy().into_owned())
            .execute(&self.pool)
            .await
            .map_err(|e| RecapError::Memory(format!("backup failed: {e}")))?;

        info!("database backed up to {}", dest.display());
        Ok(())
    }

    /// Close the pool, waiting for in-flight queries.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Message store closed");
    }

    /// Run SQL migrations, tracking which have already been applied.
    pub async fn run_migrations(pool: &SqlitePool) -> Result<(), RecapError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| RecapError::Memory(format!("failed to create migrations table: {e}")))?;

        // Bootstrap: a database written by an earlier deployment has the
        // messages table but no tracking rows.
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(pool)
            .await
            .map_err(|e| RecapError::Memory(format!("failed to count migrations: {e}")))?;

        if count.0 == 0 {
            let messages_sql: Option<String> = sqlx::query_scalar(
                "SELECT sql FROM sqlite_master WHERE type='table' AND name='messages'",
            )
            .fetch_optional(pool)
            .await
            .map_err(|e| RecapError::Memory(format!("failed to inspect schema: {e}")))?;

            if let Some(sql) = messages_sql {
                let mut applied = vec!["001_messages"];
                if sql.contains("chat_id") {
                    applied.push("002_chat_scope");
                }
                for name in applied {
                    sqlx::query("INSERT OR IGNORE INTO _migrations (name) VALUES (?)")
                        .bind(name)
                        .execute(pool)
                        .await
                        .map_err(|e| {
                            RecapError::Memory(format!("failed to bootstrap migration {name}: {e}"))
                        })?;
                }
                info!("bootstrapped migration tracking for existing database");
            }
        }

        let migrations: &[(&str, &str)] = &[
            (
                "001_messages",
                include_str!("../../migrations/001_messages.sql"),
            ),
            (
                "002_chat_scope",
                include_str!("../../migrations/002_chat_scope.sql"),
            ),
            ("003_stats", include_str!("../../migrations/003_stats.sql")),
        ];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        RecapError::Memory(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            let mut tx = pool
                .begin()
                .await
                .map_err(|e| RecapError::Memory(format!("failed to begin migration {name}: {e}")))?;

            sqlx::raw_sql(sql)
                .execute(&mut *tx)
                .await
                .map_err(|e| RecapError::Memory(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    RecapError::Memory(format!("failed to record migration {name}: {e}"))
                })?;

            tx.commit()
                .await
                .map_err(|e| RecapError::Memory(format!("failed to commit migration {name}: {e}")))?;

            info!("applied migration {name}");
        }
        Ok(())
    }
}
