//! Database initialization
//!
//! Opens (or creates) the SQLite catalog database and makes sure the
//! `songs` schema exists. [`shared_pool`] wraps [`init_database`] in a
//! process-wide initialize-once guard.

use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

static SHARED_POOL: OnceCell<SqlitePool> = OnceCell::const_new();

/// Initialize database connection and create tables if needed
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    if !database_url.starts_with("sqlite:") {
        return Err(Error::Config(format!(
            "Unsupported database URL '{}' (expected sqlite:...)",
            database_url
        )));
    }

    let in_memory = is_in_memory(database_url);

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool_options = if in_memory {
        // An in-memory database lives only as long as its connections; keep
        // exactly one open for the lifetime of the pool.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        let db_path = options.get_filename().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        // WAL allows concurrent readers with one writer
        options = options.journal_mode(SqliteJournalMode::Wal);
        SqlitePoolOptions::new().max_connections(10)
    };

    debug!("Connecting to database: {}", database_url);
    let pool = pool_options.connect_with(options).await?;

    create_songs_table(&pool).await?;

    if in_memory {
        info!("Opened in-memory database");
    } else {
        info!("Opened database: {}", database_url);
    }

    Ok(pool)
}

/// Return the process-wide pool, initializing it on first use
///
/// Concurrent first callers all wait on a single initialization and receive
/// clones of the same pool. A failed initialization is not cached; the next
/// caller retries it. Once initialized, `database_url` is ignored.
pub async fn shared_pool(database_url: &str) -> Result<SqlitePool> {
    SHARED_POOL
        .get_or_try_init(|| init_database(database_url))
        .await
        .cloned()
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Create the songs table
///
/// `"group"` is quoted everywhere because GROUP is an SQL keyword.
pub async fn create_songs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS songs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT,
            "group" TEXT NOT NULL,
            title TEXT NOT NULL,
            release_date TEXT NOT NULL DEFAULT '',
            text TEXT NOT NULL DEFAULT '',
            link TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_songs_group_title ON songs ("group", title)"#)
        .execute(pool)
        .await?;

    Ok(())
}
