use std::sync::Arc;

use anyhow::Error;

use super::{
    auth::TokenIssuer,
    config::Config,
    repository::{self, EffectRepository},
};

pub struct State {
    pub config: Config,
    pub repository: Arc<dyn EffectRepository>,
    pub tokens: Option<TokenIssuer>,
}

impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>, Error> {
        let repository = repository::open(&config).await?;

        Ok(Self::with_repository(config, repository))
    }

    pub fn with_repository(config: Config, repository: Arc<dyn EffectRepository>) -> Arc<Self> {
        let tokens = match (&config.admin_password_hash, &config.token_secret) {
            (Some(_), Some(secret)) => Some(TokenIssuer::new(secret, config.token_ttl_secs)),
            _ => None,
        };

        Arc::new(Self {
            config,
            repository,
            tokens,
        })
    }
}
