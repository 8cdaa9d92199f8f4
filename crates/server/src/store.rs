//! Read access to the players' scores.
//!
//! The table is owned and written by the store economy, we only ever read it.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, Instant},
};

use log::debug;
use rusqlite::{Connection, ErrorCode, OpenFlags, params};
use toplist_core::{
    config::StoreConfig,
    error::{TopListError, TopListResult},
    leaderboard::ScoreRecord,
};

const MAX_POOL_SIZE: usize = 8;

/// SQLite VM instructions between two deadline checks
const PROGRESS_OPS: i32 = 1000;

const TOP_SCORES_QUERY: &str = "
    SELECT PlayerName, Credits
    FROM store_players
    ORDER BY Credits DESC
    LIMIT ?1";

/// Anything able to list the best scores, highest first.
pub trait ScoreStore: Send + Sync {
    fn top_scores(&self, limit: usize) -> TopListResult<Vec<ScoreRecord>>;
}

/// Read-only SQLite store with a small round-robin pool of lazily opened connections.
pub struct SqliteStore {
    database: String,
    timeout: Duration,
    slots: Vec<Mutex<Option<Connection>>>,
    next: AtomicUsize,
}

impl SqliteStore {
    pub fn new(database: impl Into<String>, config: &StoreConfig) -> Self {
        let size = config.pool_size.clamp(1, MAX_POOL_SIZE);
        Self {
            database: database.into(),
            timeout: config.query_timeout(),
            slots: (0..size).map(|_| Mutex::new(None)).collect(),
            next: AtomicUsize::new(0),
        }
    }

    /// Creates the store and checks a first connection can be made.
    pub fn connect(database: impl Into<String>, config: &StoreConfig) -> TopListResult<Self> {
        let store = Self::new(database, config);
        store.with_conn(|_| Ok(()))?;
        Ok(store)
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.database,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        conn.busy_timeout(self.timeout)?;
        debug!("Opened score store connection to {}", self.database);
        Ok(conn)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> TopListResult<T> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let mut slot = self.slots[idx].lock().unwrap_or_else(|e| e.into_inner());

        if slot.is_none() {
            *slot = Some(self.open().map_err(unavailable)?);
        }
        let Some(conn) = slot.as_ref() else {
            return Err(TopListError::StoreUnavailable("no connection".into()));
        };

        let deadline = Instant::now() + self.timeout;
        conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() > deadline));
        let result = f(conn);
        conn.progress_handler(PROGRESS_OPS, None::<fn() -> bool>);

        result.map_err(|e| {
            // The connection may be broken, reopen it next time
            *slot = None;
            unavailable(e)
        })
    }
}

impl ScoreStore for SqliteStore {
    fn top_scores(&self, limit: usize) -> TopListResult<Vec<ScoreRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare_cached(TOP_SCORES_QUERY)?;
            let rows = stmt.query_map(params![limit], |row| {
                Ok(ScoreRecord::new(row.get::<_, String>(0)?, row.get(1)?))
            })?;
            let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
    }
}

fn unavailable(e: rusqlite::Error) -> TopListError {
    let reason = match e.sqlite_error_code() {
        Some(ErrorCode::OperationInterrupted) => "query timed out".to_string(),
        _ => e.to_string(),
    };
    debug!("Score store query failed: {reason}");
    TopListError::StoreUnavailable(reason)
}
