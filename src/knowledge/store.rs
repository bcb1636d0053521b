//! Reference tables for services and company facts.

use serde::{Deserialize, Serialize};
use tokio_rusqlite::Connection;

use crate::core::errors::AppResult;
use crate::knowledge::seed::{SEED_COMPANY_INFO, SEED_SERVICES};
use crate::storage::StoreFuture;

/// A service the agency offers.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Row id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Free-form price label.
    pub price: String,
}

/// A company fact such as an email address or opening hours.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Row id.
    pub id: i64,
    /// Unique key.
    pub key: String,
    /// Value text.
    pub value: String,
}

/// Knowledge store trait.
pub trait KnowledgeStore: Send + Sync {
    /// List every service in insertion order.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn list_services(&self) -> StoreFuture<'_, AppResult<Vec<Service>>>;

    /// List every company fact in insertion order.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn list_company_info(&self) -> StoreFuture<'_, AppResult<Vec<CompanyInfo>>>;

    /// Insert the seed data in one transaction when no services exist.
    /// Returns whether anything was written.
    ///
    /// # Errors
    /// Returns an error if storage access fails.
    fn seed_if_empty(&self) -> StoreFuture<'_, AppResult<bool>>;
}

/// `SQLite` implementation of the knowledge store.
#[derive(Clone)]
pub struct SqliteKnowledgeStore {
    conn: Connection,
}

impl SqliteKnowledgeStore {
    /// Wrap a connection whose schema is already applied.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KnowledgeStore for SqliteKnowledgeStore {
    fn list_services(&self) -> StoreFuture<'_, AppResult<Vec<Service>>> {
        Box::pin(async move {
            let services = self
                .conn
                .call(|conn| {
                    let mut stmt =
                        conn.prepare("SELECT id, name, description, price FROM services ORDER BY id")?;
                    let rows = stmt
                        .query_map([], |row| {
                            Ok(Service {
                                id: row.get(0)?,
                                name: row.get(1)?,
                                description: row.get(2)?,
                                price: row.get(3)?,
                            })
                        })?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await?;
            Ok(services)
        })
    }

    fn list_company_info(&self) -> StoreFuture<'_, AppResult<Vec<CompanyInfo>>> {
        Box::pin(async move {
            let facts = self
                .conn
                .call(|conn| {
                    let mut stmt = conn.prepare("SELECT id, key, value FROM company_info ORDER BY id")?;
                    let rows = stmt
                        .query_map([], |row| {
                            Ok(CompanyInfo {
                                id: row.get(0)?,
                                key: row.get(1)?,
                                value: row.get(2)?,
                            })
                        })?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await?;
            Ok(facts)
        })
    }

    fn seed_if_empty(&self) -> StoreFuture<'_, AppResult<bool>> {
        Box::pin(async move {
            let seeded = self
                .conn
                .call(|conn| {
                    let tx = conn.transaction()?;
                    let existing: i64 =
                        tx.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))?;
                    if existing > 0 {
                        return Ok(false);
                    }
                    {
                        let mut services_stmt = tx.prepare(
                            "INSERT INTO services (name, description, price) VALUES (?1, ?2, ?3)",
                        )?;
                        for (name, description, price) in SEED_SERVICES {
                            services_stmt.execute(rusqlite::params![name, description, price])?;
                        }
                        // `key` is UNIQUE, so a duplicate seed key aborts the whole transaction.
                        let mut facts_stmt =
                            tx.prepare("INSERT INTO company_info (key, value) VALUES (?1, ?2)")?;
                        for (key, value) in SEED_COMPANY_INFO {
                            facts_stmt.execute(rusqlite::params![key, value])?;
                        }
                    }
                    tx.commit()?;
                    Ok(true)
                })
                .await?;

            if seeded {
                tracing::info!(
                    services = SEED_SERVICES.len(),
                    facts = SEED_COMPANY_INFO.len(),
                    "knowledge tables seeded"
                );
            }
            Ok(seeded)
        })
    }
}
