use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use async_trait::async_trait;
use bank::{
    Catalog, get_catalog,
    effects::{Effect, Submission, Variant},
    remote::get_remote_catalog,
    stats::VoteAggregate,
};
use redis::{AsyncCommands, aio::ConnectionManager, pipe};
use tracing::info;

use super::{EffectRepository, aggregate_after};
use crate::{
    config::Config,
    database::init_redis,
    error::{StoreError, StoreResult},
};

pub const VOTES_KEY: &str = "effects:votes";
pub const DELETED_KEY: &str = "effects:deleted";
pub const SUBMISSIONS_KEY: &str = "submissions";

pub fn vote_field(id: u32, variant: Variant) -> String {
    format!("{id}:{}", variant.tag())
}

/// Catalog text stays in memory, every count lives in Redis.
pub struct RedisRepository {
    catalog: Catalog,
    connection: ConnectionManager,
}

impl RedisRepository {
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let catalog = match &config.catalog_url {
            Some(url) => {
                info!("Fetching remote catalog from {url}");
                get_remote_catalog(url).await?
            }
            None => get_catalog(&config.catalog_path)?,
        };

        let connection = init_redis(&config.redis_url).await?;
        let repository = Self {
            catalog,
            connection,
        };

        repository.seed().await?;

        Ok(repository)
    }

    /// Copies catalog counts into Redis without touching counters that already exist.
    async fn seed(&self) -> StoreResult<()> {
        if self.catalog.effects.is_empty() {
            return Ok(());
        }

        let mut connection = self.connection.clone();
        let mut pipeline = pipe();

        for effect in &self.catalog.effects {
            for variant in [Variant::A, Variant::B] {
                pipeline
                    .hset_nx(VOTES_KEY, vote_field(effect.id, variant), effect.votes(variant))
                    .ignore();
            }
        }

        let _: () = pipeline.query_async(&mut connection).await?;
        info!("Seeded {} effects into Redis", self.catalog.effects.len());

        Ok(())
    }

    async fn deleted(&self) -> StoreResult<HashSet<u32>> {
        let mut connection = self.connection.clone();
        let deleted: HashSet<u32> = connection.smembers(DELETED_KEY).await?;

        Ok(deleted)
    }

    async fn is_live(&self, id: u32) -> StoreResult<bool> {
        if self.catalog.get(id).is_none() {
            return Ok(false);
        }

        let mut connection = self.connection.clone();
        let deleted: bool = connection.sismember(DELETED_KEY, id).await?;

        Ok(!deleted)
    }

    fn with_votes(effect: &Effect, votes: &HashMap<String, u64>) -> Effect {
        let mut effect = effect.clone();

        for variant in [Variant::A, Variant::B] {
            if let Some(&count) = votes.get(&vote_field(effect.id, variant)) {
                *effect.votes_mut(variant) = count;
            }
        }

        effect
    }
}

#[async_trait]
impl EffectRepository for RedisRepository {
    async fn list(&self, category: Option<&str>) -> StoreResult<Vec<Effect>> {
        let mut connection = self.connection.clone();
        let votes: HashMap<String, u64> = connection.hgetall(VOTES_KEY).await?;
        let deleted = self.deleted().await?;

        Ok(self
            .catalog
            .effects
            .iter()
            .filter(|e| !deleted.contains(&e.id))
            .filter(|e| category.is_none_or(|c| e.category == c))
            .map(|e| Self::with_votes(e, &votes))
            .collect())
    }

    async fn get(&self, id: u32) -> StoreResult<Effect> {
        if !self.is_live(id).await? {
            return Err(StoreError::NotFound(id));
        }

        let effect = self.catalog.get(id).ok_or(StoreError::NotFound(id))?;

        let mut connection = self.connection.clone();
        let (votes_a, votes_b): (Option<u64>, Option<u64>) = pipe()
            .hget(VOTES_KEY, vote_field(id, Variant::A))
            .hget(VOTES_KEY, vote_field(id, Variant::B))
            .query_async(&mut connection)
            .await?;

        let mut effect = effect.clone();
        effect.votes_a = votes_a.unwrap_or(effect.votes_a);
        effect.votes_b = votes_b.unwrap_or(effect.votes_b);

        Ok(effect)
    }

    async fn increment(&self, id: u32, variant: Variant) -> StoreResult<VoteAggregate> {
        if !self.is_live(id).await? {
            return Err(StoreError::NotFound(id));
        }

        let mut connection = self.connection.clone();
        let (count, other): (u64, Option<u64>) = pipe()
            .atomic()
            .hincr(VOTES_KEY, vote_field(id, variant), 1)
            .hget(VOTES_KEY, vote_field(id, variant.other()))
            .query_async(&mut connection)
            .await?;

        let other = other
            .or_else(|| self.catalog.get(id).map(|e| e.votes(variant.other())))
            .unwrap_or(0);

        Ok(aggregate_after(variant, count, other))
    }

    async fn delete(&self, id: u32) -> StoreResult<()> {
        if self.catalog.get(id).is_none() {
            return Err(StoreError::NotFound(id));
        }

        let mut connection = self.connection.clone();
        let added: u32 = connection.sadd(DELETED_KEY, id).await?;

        match added {
            0 => Err(StoreError::NotFound(id)),
            _ => Ok(()),
        }
    }

    async fn add_submission(&self, submission: Submission) -> StoreResult<()> {
        let mut connection = self.connection.clone();
        let encoded = serde_json::to_string(&submission)?;
        let _: u64 = connection.rpush(SUBMISSIONS_KEY, encoded).await?;

        Ok(())
    }

    async fn submissions(&self) -> StoreResult<Vec<Submission>> {
        let mut connection = self.connection.clone();
        let encoded: Vec<String> = connection.lrange(SUBMISSIONS_KEY, 0, -1).await?;

        encoded
            .iter()
            .map(|s| serde_json::from_str(s).map_err(|e| StoreError::Other(anyhow!(e))))
            .collect()
    }
}
