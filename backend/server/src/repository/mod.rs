//! # Repositories
//!
//! One trait, three interchangeable stores picked by `STORE_BACKEND`.
//!
//! - `json`: the catalog file itself, re-read on every request
//! - `sql`: SQLite table with the same fields
//! - `redis`: catalog kept in memory, vote counters and moderation state in Redis
//!
//! Vote increments are always a single atomic step inside the store, never a read then a write in
//! the handler.
use std::sync::Arc;

use async_trait::async_trait;
use bank::{
    effects::{Effect, Submission, Variant},
    stats::VoteAggregate,
};
use tracing::info;

pub mod json;
pub mod redis_store;
pub mod sql;

use crate::{
    config::{Backend, Config},
    error::StoreResult,
};

#[async_trait]
pub trait EffectRepository: Send + Sync {
    /// Effects in catalog order, optionally only one category.
    async fn list(&self, category: Option<&str>) -> StoreResult<Vec<Effect>>;

    async fn get(&self, id: u32) -> StoreResult<Effect>;

    /// Adds exactly one vote and returns the counts after it landed.
    async fn increment(&self, id: u32, variant: Variant) -> StoreResult<VoteAggregate>;

    async fn delete(&self, id: u32) -> StoreResult<()>;

    async fn add_submission(&self, submission: Submission) -> StoreResult<()>;

    async fn submissions(&self) -> StoreResult<Vec<Submission>>;

    async fn all(&self) -> StoreResult<Vec<Effect>> {
        self.list(None).await
    }
}

pub async fn open(config: &Config) -> StoreResult<Arc<dyn EffectRepository>> {
    let repository: Arc<dyn EffectRepository> = match config.backend {
        Backend::Json => {
            info!("Using JSON catalog at {}", config.catalog_path.display());
            Arc::new(json::JsonRepository::open(
                &config.catalog_path,
                &config.submissions_path,
            )?)
        }
        Backend::Sql => {
            info!("Using SQLite database at {}", config.database_path.display());
            Arc::new(sql::SqlRepository::open(&config.database_path)?)
        }
        Backend::Redis => {
            info!("Using Redis at {}", config.redis_url);
            Arc::new(redis_store::RedisRepository::connect(config).await?)
        }
    };

    Ok(repository)
}

/// Vote counts in "for A" order after `variant` went up to `count`.
pub(crate) fn aggregate_after(variant: Variant, count: u64, other: u64) -> VoteAggregate {
    match variant {
        Variant::A => VoteAggregate::new(count, other),
        Variant::B => VoteAggregate::new(other, count),
    }
}
