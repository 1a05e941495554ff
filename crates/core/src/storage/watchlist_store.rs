use futures::stream::{self, BoxStream, StreamExt};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::CoreError;
use crate::models::watchlist::{Watchlist, WatchlistStock};
use super::migrations;

/// Live query: current snapshot first, then one per committed change.
pub type Observed<T> = BoxStream<'static, Result<T, CoreError>>;

struct StoreInner {
    conn: Mutex<Connection>,
    /// Bumped after every committed mutation.
    changes: watch::Sender<u64>,
}

/// SQLite-backed store for watchlists and their symbols.
///
/// Cloning is cheap and every clone shares one connection. Membership is
/// unique per `(watchlist_id, symbol)` at the schema level, so
/// [`add_stock`](Self::add_stock) is a single `INSERT OR IGNORE` and
/// concurrent adds of the same pair cannot produce duplicate rows.
/// Deleting a watchlist cascades to its memberships.
#[derive(Clone)]
pub struct WatchlistStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for WatchlistStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchlistStore")
            .field("version", &*self.inner.changes.borrow())
            .finish()
    }
}

impl WatchlistStore {
    /// Open (or create) the database file and bring the schema up to date.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        info!("Opened watchlist database at {}", path.display());
        Self::init(conn)
    }

    /// Throwaway database, gone when the last clone is dropped.
    pub fn open_in_memory() -> Result<Self, CoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, CoreError> {
        // Cascading deletes depend on this; SQLite ships with it off.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::run_migrations(&conn)?;

        let (changes, _rx) = watch::channel(0);
        Ok(Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                changes,
            }),
        })
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// All watchlists, newest first.
    pub fn watchlists(&self) -> Result<Vec<Watchlist>, CoreError> {
        self.with_conn(query_watchlists)
    }

    pub fn watchlist(&self, id: i64) -> Result<Option<Watchlist>, CoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, name, created_at FROM watchlists WHERE id = ?",
                [id],
                watchlist_from_row,
            )
            .optional()
            .map_err(CoreError::from)
        })
    }

    /// Memberships of one watchlist in the order they were added.
    pub fn stocks(&self, watchlist_id: i64) -> Result<Vec<WatchlistStock>, CoreError> {
        self.with_conn(|conn| query_stocks(conn, watchlist_id))
    }

    pub fn symbols(&self, watchlist_id: i64) -> Result<Vec<String>, CoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT symbol FROM watchlist_stocks
                 WHERE watchlist_id = ? ORDER BY added_at, id",
            )?;
            let symbols = stmt
                .query_map([watchlist_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(symbols)
        })
    }

    pub fn stock_count(&self, watchlist_id: i64) -> Result<usize, CoreError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM watchlist_stocks WHERE watchlist_id = ?",
                [watchlist_id],
                |row| row.get(0),
            )?;
            Ok(count.max(0) as usize)
        })
    }

    /// True if `symbol` belongs to at least one watchlist.
    pub fn is_symbol_in_any_watchlist(&self, symbol: &str) -> Result<bool, CoreError> {
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM watchlist_stocks WHERE symbol = ?)",
                [symbol],
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    // ── Live queries ────────────────────────────────────────────────

    pub fn observe_watchlists(&self) -> Observed<Vec<Watchlist>> {
        self.observe(query_watchlists)
    }

    pub fn observe_stocks(&self, watchlist_id: i64) -> Observed<Vec<WatchlistStock>> {
        self.observe(move |conn| query_stocks(conn, watchlist_id))
    }

    // ── Writes ──────────────────────────────────────────────────────

    /// Create a watchlist and return its id. The name is trimmed and must
    /// not be empty.
    pub fn create_watchlist(&self, name: &str) -> Result<i64, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Watchlist name must not be empty".into()));
        }
        let now = chrono::Utc::now().timestamp_millis();

        let id = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO watchlists (name, created_at) VALUES (?, ?)",
                params![name, now],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        debug!("Created watchlist {id} ({name})");
        self.notify();
        Ok(id)
    }

    /// Add `symbol` to a watchlist. Returns `false` when it was already there.
    /// Fails if the watchlist does not exist.
    pub fn add_stock(&self, watchlist_id: i64, symbol: &str) -> Result<bool, CoreError> {
        let now = chrono::Utc::now().timestamp_millis();
        let inserted = self.with_conn(|conn| {
            let rows = conn.execute(
                "INSERT OR IGNORE INTO watchlist_stocks (watchlist_id, symbol, added_at)
                 VALUES (?, ?, ?)",
                params![watchlist_id, symbol, now],
            )?;
            Ok(rows > 0)
        })?;

        if inserted {
            debug!("Added {symbol} to watchlist {watchlist_id}");
            self.notify();
        }
        Ok(inserted)
    }

    /// Remove `symbol` from a watchlist. Absent symbols are a no-op.
    pub fn remove_stock(&self, watchlist_id: i64, symbol: &str) -> Result<usize, CoreError> {
        let removed = self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM watchlist_stocks WHERE watchlist_id = ? AND symbol = ?",
                params![watchlist_id, symbol],
            )
            .map_err(CoreError::from)
        })?;

        if removed > 0 {
            self.notify();
        }
        Ok(removed)
    }

    /// Delete a watchlist together with all of its memberships.
    pub fn delete_watchlist(&self, watchlist: &Watchlist) -> Result<(), CoreError> {
        self.delete_watchlist_by_id(watchlist.id)
    }

    pub fn delete_watchlist_by_id(&self, watchlist_id: i64) -> Result<(), CoreError> {
        let removed = self.with_conn(|conn| {
            conn.execute("DELETE FROM watchlists WHERE id = ?", [watchlist_id])
                .map_err(CoreError::from)
        })?;

        if removed > 0 {
            debug!("Deleted watchlist {watchlist_id}");
            self.notify();
        }
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let conn = self.inner.conn.lock();
        f(&conn)
    }

    fn notify(&self) {
        self.inner.changes.send_modify(|version| *version += 1);
    }

    fn observe<T, F>(&self, query: F) -> Observed<T>
    where
        T: Send + 'static,
        F: Fn(&Connection) -> Result<T, CoreError> + Send + 'static,
    {
        let rx = self.inner.changes.subscribe();
        let state = (self.clone(), rx, query, true);

        stream::unfold(state, |(store, mut rx, query, first)| async move {
            if !first && rx.changed().await.is_err() {
                return None;
            }
            let _ = rx.borrow_and_update();
            let snapshot = store.with_conn(&query);
            Some((snapshot, (store, rx, query, false)))
        })
        .boxed()
    }
}

fn watchlist_from_row(row: &Row<'_>) -> rusqlite::Result<Watchlist> {
    Ok(Watchlist {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
    })
}

fn query_watchlists(conn: &Connection) -> Result<Vec<Watchlist>, CoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, created_at FROM watchlists ORDER BY created_at DESC, id DESC",
    )?;
    let watchlists = stmt
        .query_map([], watchlist_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(watchlists)
}

fn query_stocks(conn: &Connection, watchlist_id: i64) -> Result<Vec<WatchlistStock>, CoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, watchlist_id, symbol, added_at FROM watchlist_stocks
         WHERE watchlist_id = ? ORDER BY added_at, id",
    )?;
    let stocks = stmt
        .query_map([watchlist_id], |row| {
            Ok(WatchlistStock {
                id: row.get(0)?,
                watchlist_id: row.get(1)?,
                symbol: row.get(2)?,
                added_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(stocks)
}
