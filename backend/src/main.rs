//! # Mandela Effect voting backend
//!
//! Users browse a catalog of effects, vote between two remembered variants, and submit new
//! effects for moderation.
//!
//!
//!
//! # General Infrastructure
//! - `bank`: effect records, vote math, catalog files, deterministic flavor/radar helpers
//! - `server`: axum API over one of three interchangeable stores
//! - `process`: catalog tooling, normalizes categories, seeds SQLite, hashes the admin password
//! - `tester`: fires concurrent votes at a running server to check no vote is lost
//!
//!
//!
//! # Stores
//!
//! Picked with `STORE_BACKEND`.
//!
//! ## JSON
//! The catalog file is the database. Reads hit the file every time, writes queue on a single lock
//! and swap the file in with a rename.
//!
//! ## SQLite
//! Same fields as rows. A vote is one `UPDATE ... SET votes_a = votes_a + 1 ... RETURNING`.
//!
//! ## Redis
//! Catalog text is loaded once (file or `CATALOG_URL`), counts live in a Redis hash and a vote is
//! one `HINCRBY` inside `MULTI`/`EXEC`.
//!
//!
//!
//! # Endpoints
//! - `GET /effects?category=<id>`
//! - `GET /effect/{id}`
//! - `GET /categories`, `GET /categories/radar`
//! - `GET /stats`, never fails, falls back to `STATS_FALLBACK_*`
//! - `POST /vote` with `{ "effectId": 1, "variant": "A" }`
//! - `POST /submissions`
//! - `POST /admin/login`, then `Authorization: Bearer <token>` on `/admin/*`
//!
//!
//!
//! # Setup
//!
//! Hash the admin password.
//! ```sh
//! cargo run -p process -- hash-password
//! ```
//!
//! Seed SQLite from the catalog.
//! ```sh
//! cargo run -p process -- seed data/effects.json data/effects.db
//! ```
//!
//! Run.
//! ```sh
//! RUST_LOG=info STORE_BACKEND=sql cargo run -p mandela
//! ```
//!
//! Check for lost votes.
//! ```sh
//! cargo run -p tester -- --effect-id 1 --votes 200
//! ```
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::start_server().await
}
