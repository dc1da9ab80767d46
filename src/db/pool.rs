//! SQLite connection wrapper (one connection, owned for the whole run).

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OpenFlags, Params};
use std::path::Path;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    /// Open an existing database read-write. Never creates the file.
    /// The path is always taken literally, even when it starts with `file:`.
    pub fn open(path: &Path) -> AppResult<Self> {
        let open_error = |error: String| AppError::DatabaseOpen {
            error,
            path: path.to_path_buf(),
        };
        // An absolute path never starts with `file:`, whatever URI handling
        // the sqlite build defaults to.
        let path = std::path::absolute(path).map_err(|e| open_error(e.to_string()))?;

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn =
            Connection::open_with_flags(&path, flags).map_err(|e| open_error(e.to_string()))?;

        // sqlite opens lazily; touch the schema so a non-database file fails here.
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| open_error(e.to_string()))?;

        Ok(Self { conn })
    }

    /// Helper to execute a closure with a mutable connection reference.
    pub fn with_conn<F, T>(&mut self, func: F) -> AppResult<T>
    where
        F: FnOnce(&mut Connection) -> AppResult<T>,
    {
        func(&mut self.conn)
    }

    /// Run one mutating statement in its own transaction and commit it.
    pub fn execute_committed<P: Params>(&mut self, sql: &str, params: P) -> AppResult<usize> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(sql, params)?;
            tx.commit()?;
            Ok(changed)
        })
    }

    /// Commit anything still pending and close the connection.
    /// Dropping a DbPool closes the connection too, but swallows close errors.
    pub fn finish(self) -> AppResult<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        self.conn.close().map_err(|(_, e)| AppError::Db(e))
    }
}
