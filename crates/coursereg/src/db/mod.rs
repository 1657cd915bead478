//! Database module for the course catalog, requirements and student schedules
//!
//! Every relationship is reached through an explicit lookup on [`RegistrarDb`]
//! (`meetings_for_section`, `list_schedules_for`, ...) rather than through
//! lazily traversed model fields.

mod catalog;
mod requirements;
mod rows;
mod schedules;
mod students;

use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::error::{RegistrarError, Result};

const SCHEMA_SQL: &str = include_str!("../../../../sql/init_registrar.sql");

pub struct RegistrarDb {
    db: Mutex<Connection>,
}

impl RegistrarDb {
    /// Opens (or creates) the database at `db_path` and initializes the schema
    pub fn open(db_path: &str) -> Result<Self> {
        info!(path = db_path, "Opening registrar database");
        Self::from_connection(Connection::open(db_path)?)
    }

    /// Opens a private in-memory database, used by tests and demos
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.db.lock().map_err(|_| RegistrarError::LockPoisoned)
    }

    /// Runs `f` as one SQLite transaction: everything it wrote is committed if it
    /// returns `Ok` and rolled back otherwise.
    ///
    /// The connection is shared, so writes from other callers while `f` runs land
    /// in the same transaction; this is meant for single-writer work such as
    /// seeding at startup. `f` must not call the schedule mutators, which open
    /// their own transaction.
    pub fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        self.conn()?.execute_batch("BEGIN IMMEDIATE")?;

        match f(self) {
            Ok(value) => {
                self.conn()?.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn()?.execute_batch("ROLLBACK") {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

/// Maps "no rows" from a single-row lookup onto [`RegistrarError::NotFound`].
pub(crate) fn or_not_found<T>(
    result: rusqlite::Result<T>,
    entity: &'static str,
    id: i64,
) -> Result<T> {
    match result {
        Ok(value) => Ok(value),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(RegistrarError::not_found(entity, id)),
        Err(e) => Err(e.into()),
    }
}

/// Fails with NotFound unless `table` has a row with the given id.
pub(crate) fn ensure_exists(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> Result<()> {
    let found: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE id = ?1"),
        [id],
        |row| row.get(0),
    )?;

    if found == 0 {
        return Err(RegistrarError::not_found(entity, id));
    }
    Ok(())
}
