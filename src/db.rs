use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use serde::Serialize;
use tracing::{info, warn};

use crate::parser::contacts::UNKNOWN;

pub const DEFAULT_DB_PATH: &str = "contacts.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: String,
    pub title: String,
    pub email: String,
}

/// Outcome of one `save` batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub inserted: usize,
    /// Rows skipped because their email is already stored.
    pub ignored: usize,
    pub failed: usize,
}

pub struct Stats {
    pub total: usize,
    pub unknown_email: usize,
}

/// The single contacts database shared by every run in the process.
///
/// All access goes through one mutex-guarded connection, so overlapping
/// runs queue up here instead of writing concurrently.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: &Path) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Opened contact store at {}", path.display());
        Ok(Self { conn: Mutex::new(conn) })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> rusqlite::Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic mid-batch leaves the connection itself usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn initialize(&self) -> rusqlite::Result<()> {
        self.lock().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS contacts (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL,
                title      TEXT NOT NULL,
                email      TEXT NOT NULL UNIQUE
            );
            ",
        )
    }

    /// Insert every contact, skipping emails that are already stored.
    ///
    /// Each row commits on its own, so a fault that rolls back a transaction
    /// costs only that row. A failing row is logged and counted, never fatal.
    pub fn save(&self, contacts: &[Contact]) -> rusqlite::Result<SaveReport> {
        let conn = self.lock();
        let mut report = SaveReport::default();
        let mut stmt = conn.prepare_cached(
            "INSERT OR IGNORE INTO contacts (name, title, email) VALUES (?1, ?2, ?3)",
        )?;
        for c in contacts {
            match stmt.execute(rusqlite::params![c.name, c.title, c.email]) {
                Ok(0) => report.ignored += 1,
                Ok(_) => report.inserted += 1,
                Err(e) => {
                    warn!("Failed to store contact {} <{}>: {}", c.name, c.email, e);
                    report.failed += 1;
                }
            }
        }
        info!(
            "Saved contacts: {} new, {} already stored, {} failed",
            report.inserted, report.ignored, report.failed
        );
        Ok(report)
    }

    pub fn contacts(&self, limit: Option<usize>) -> rusqlite::Result<Vec<Contact>> {
        let sql = format!(
            "SELECT name, title, email FROM contacts ORDER BY id{}",
            match limit {
                Some(n) => format!(" LIMIT {}", n),
                None => String::new(),
            }
        );
        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Contact {
                    name: row.get(0)?,
                    title: row.get(1)?,
                    email: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn stats(&self) -> rusqlite::Result<Stats> {
        let conn = self.lock();
        let total: usize = conn.query_row("SELECT COUNT(*) FROM contacts", [], |r| r.get(0))?;
        let unknown_email: usize = conn.query_row(
            "SELECT COUNT(*) FROM contacts WHERE email = ?1",
            [UNKNOWN],
            |r| r.get(0),
        )?;
        Ok(Stats {
            total,
            unknown_email,
        })
    }
}
