//! # Databases
//!
//! ## Redis
//!
//! RAM database for the `redis` backend.
//!
//! Core purpose is to store effect vote counts and moderation state. Also, used for atomic
//! increments.
//!
//! - `effects:votes` hash: `{id}:a` / `{id}:b` to a 64-bit count, `HINCRBY` is the increment
//! - `effects:deleted` set: ids removed by an admin, the catalog itself is read-only
//! - `submissions` list: JSON encoded pending submissions, oldest first
//! - Counters are seeded from the catalog with `HSETNX`, so a restart never resets live votes
//!
//! ## SQLite
//!
//! Relational twin of the JSON catalog for the `sql` backend. One `effects` row per record, same
//! fields in snake_case, plus a `submissions` table.
use std::{fs, path::Path, time::Duration};

use redis::{
    Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use rusqlite::Connection;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS effects (
    id              INTEGER PRIMARY KEY,
    category        TEXT NOT NULL,
    category_emoji  TEXT NOT NULL,
    category_name   TEXT NOT NULL,
    title           TEXT NOT NULL,
    question        TEXT NOT NULL,
    variant_a       TEXT NOT NULL,
    variant_b       TEXT NOT NULL,
    votes_a         INTEGER NOT NULL DEFAULT 0 CHECK (votes_a >= 0),
    votes_b         INTEGER NOT NULL DEFAULT 0 CHECK (votes_b >= 0),
    current_state   TEXT NOT NULL,
    source_link     TEXT NOT NULL DEFAULT '',
    date_added      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_effects_category ON effects (category);

CREATE TABLE IF NOT EXISTS submissions (
    id            TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    question      TEXT NOT NULL,
    variant_a     TEXT NOT NULL,
    variant_b     TEXT NOT NULL,
    category      TEXT NOT NULL,
    source_link   TEXT,
    submitted_at  TEXT NOT NULL,
    status        TEXT NOT NULL DEFAULT 'pending'
);
";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

pub fn init_sqlite(path: &Path) -> Result<Connection, rusqlite::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        // open below reports the real problem if this fails
        let _ = fs::create_dir_all(parent);
    }

    let connection = Connection::open(path)?;
    connection.execute_batch("PRAGMA journal_mode=WAL;")?;
    connection.execute_batch(SCHEMA)?;

    Ok(connection)
}

pub fn init_sqlite_memory() -> Result<Connection, rusqlite::Error> {
    let connection = Connection::open_in_memory()?;
    connection.execute_batch(SCHEMA)?;

    Ok(connection)
}
