//! Opening the database and applying the schema.

use std::future::Future;
use std::pin::Pin;

use tokio_rusqlite::Connection;

use crate::core::config::StorageConfig;
use crate::core::errors::AppResult;

/// Boxed future type for store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS chat_messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        session_id TEXT NOT NULL,
        sender TEXT NOT NULL CHECK (sender IN ('user', 'bot')),
        content TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_chat_messages_session
        ON chat_messages (session_id, id);
    CREATE TABLE IF NOT EXISTS services (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        price TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS company_info (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT NOT NULL UNIQUE,
        value TEXT NOT NULL
    );";

/// Open the database file, creating its folder and the schema if needed.
///
/// # Errors
/// Returns an error if the folder cannot be created or the database cannot be opened.
pub async fn open_database(config: &StorageConfig) -> AppResult<Connection> {
    if let Some(parent) = config.sqlite_path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let conn = Connection::open(&config.sqlite_path).await?;
    conn.call(|conn| {
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        Ok(())
    })
    .await?;
    apply_schema(&conn).await?;
    tracing::info!("database ready at {}", config.sqlite_path.display());
    Ok(conn)
}

/// Open a private in-memory database with the schema applied.
///
/// # Errors
/// Returns an error if the schema cannot be created.
pub async fn open_in_memory() -> AppResult<Connection> {
    let conn = Connection::open_in_memory().await?;
    apply_schema(&conn).await?;
    Ok(conn)
}

async fn apply_schema(conn: &Connection) -> AppResult<()> {
    conn.call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    })
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_is_idempotent() {
        let conn = open_in_memory().await.unwrap();
        apply_schema(&conn).await.unwrap();

        let tables: i64 = conn
            .call(|conn| {
                let count = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('chat_messages', 'services', 'company_info')",
                    [],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await
            .unwrap();
        assert_eq!(tables, 3);
    }

    #[tokio::test]
    async fn test_open_database_creates_parent_folder() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            sqlite_path: dir.path().join("instance").join("chat.db"),
        };
        let _conn = open_database(&config).await.unwrap();
        assert!(config.sqlite_path.exists());
    }
}
