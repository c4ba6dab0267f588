//! Shared connection handle used by every SQLite-backed store.

use super::migrations::{current_user_version, latest_version, REQUIRED_TABLES};
use super::{open_db, open_db_in_memory, DbError, DbResult};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Number of SQLite VM instructions between deadline checks.
const DEADLINE_CHECK_INTERVAL_OPS: i32 = 1_000;

/// Connection-level settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseOptions {
    /// How long SQLite waits on a locked database file before failing.
    pub busy_timeout: Duration,
    /// Default deadline applied to every operation without an explicit one.
    pub query_timeout: Option<Duration>,
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
            query_timeout: None,
        }
    }
}

/// Owns one migrated SQLite connection and hands it out one caller at a time.
///
/// Stores share a `Database` through `Arc`; the connection closes when the
/// last handle is dropped.
pub struct Database {
    conn: Mutex<Connection>,
    options: DatabaseOptions,
}

impl Database {
    /// Opens (creating if needed) and migrates a database file.
    pub fn open(path: impl AsRef<Path>, options: DatabaseOptions) -> DbResult<Self> {
        let conn = open_db(path, options.busy_timeout)?;
        Ok(Self::wrap(conn, options))
    }

    /// Opens a private, migrated in-memory database.
    pub fn open_in_memory(options: DatabaseOptions) -> DbResult<Self> {
        let conn = open_db_in_memory(options.busy_timeout)?;
        Ok(Self::wrap(conn, options))
    }

    /// Adopts an already-open connection after checking it is fully migrated.
    pub fn from_connection(conn: Connection, options: DatabaseOptions) -> DbResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self::wrap(conn, options))
    }

    fn wrap(conn: Connection, options: DatabaseOptions) -> Self {
        Self {
            conn: Mutex::new(conn),
            options,
        }
    }

    pub fn options(&self) -> DatabaseOptions {
        self.options
    }

    /// Returns the schema version recorded in the database.
    pub fn schema_version(&self) -> DbResult<u32> {
        current_user_version(&self.lock())
    }

    /// Runs `operation` with exclusive access to the connection.
    ///
    /// The effective deadline is `deadline`, or now plus the configured query
    /// timeout when none is given. An already expired deadline fails without
    /// touching the connection; a deadline passing mid-statement interrupts it.
    pub(crate) fn with_connection<T, E>(
        &self,
        deadline: Option<Instant>,
        operation: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let deadline =
            deadline.or_else(|| self.options.query_timeout.map(|timeout| Instant::now() + timeout));
        let conn = self.lock();

        let Some(deadline) = deadline else {
            return operation(&conn);
        };
        if Instant::now() >= deadline {
            return Err(DbError::DeadlineExceeded.into());
        }

        conn.progress_handler(
            DEADLINE_CHECK_INTERVAL_OPS,
            Some(move || Instant::now() >= deadline),
        );
        let _handler = ProgressHandlerGuard(&conn);
        operation(&conn)
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Every write is a single statement, so a panic mid-operation cannot
        // leave the connection half-updated.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removes the deadline handler when the operation ends, including by panic.
struct ProgressHandlerGuard<'a>(&'a Connection);

impl Drop for ProgressHandlerGuard<'_> {
    fn drop(&mut self) {
        self.0.progress_handler(0, None::<fn() -> bool>);
    }
}

fn ensure_connection_ready(conn: &Connection) -> DbResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(DbError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for (table, columns) in REQUIRED_TABLES {
        for column in *columns {
            if !table_has_column(conn, table, column)? {
                return Err(DbError::UninitializedConnection {
                    expected_version,
                    actual_version,
                });
            }
        }
    }

    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
