use log::info;
use rusqlite::Connection;

use crate::errors::CoreError;

const CREATE_WATCHLISTS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS watchlists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_watchlists_created_at ON watchlists(created_at);
";

const CREATE_WATCHLIST_STOCKS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS watchlist_stocks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    watchlist_id INTEGER NOT NULL REFERENCES watchlists(id) ON DELETE CASCADE,
    symbol TEXT NOT NULL,
    added_at INTEGER NOT NULL,
    UNIQUE (watchlist_id, symbol)
);
CREATE INDEX IF NOT EXISTS idx_watchlist_stocks_watchlist_id ON watchlist_stocks(watchlist_id);
CREATE INDEX IF NOT EXISTS idx_watchlist_stocks_symbol ON watchlist_stocks(symbol);
";

/// Ordered list of (name, sql). Append only; never edit an applied entry.
const MIGRATIONS: &[(&str, &str)] = &[
    ("001_watchlists", CREATE_WATCHLISTS_TABLE),
    ("002_watchlist_stocks", CREATE_WATCHLIST_STOCKS_TABLE),
];

/// Apply every migration not yet recorded in the `migrations` table.
pub fn run_migrations(conn: &Connection) -> Result<(), CoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    for (name, sql) in MIGRATIONS {
        run_migration(conn, name, sql)?;
    }
    Ok(())
}

/// Apply one named migration unless it is already recorded. The SQL and
/// its `migrations` row commit together or not at all.
pub fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<(), CoreError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        info!("Running migration: {name}");
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
        tx.commit()?;
    }
    Ok(())
}

/// Names of applied migrations, oldest first.
pub fn applied_migrations(conn: &Connection) -> Result<Vec<String>, CoreError> {
    let mut stmt = conn.prepare("SELECT name FROM migrations ORDER BY id")?;
    let names = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;
    Ok(names)
}
