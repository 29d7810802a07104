use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use anyhow::{Error, anyhow, bail};
use bank::stats::SiteStats;
use tracing::{info, warn};

/// Thirty days.
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Json,
    Sql,
    Redis,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Backend::Json),
            "sql" | "sqlite" => Ok(Backend::Sql),
            "redis" => Ok(Backend::Redis),
            other => Err(format!("unknown backend {other:?}, expected json, sql or redis")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend: Backend,
    pub catalog_path: PathBuf,
    pub catalog_url: Option<String>,
    pub submissions_path: PathBuf,
    pub database_path: PathBuf,
    pub redis_url: String,
    pub cors_origin: String,
    pub token_ttl_secs: u64,
    pub stats_fallback: SiteStats,
    pub admin_password_hash: Option<String>,
    pub token_secret: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        let config = Self {
            port: try_load("RUST_PORT", "1111")?,
            backend: try_load("STORE_BACKEND", "json")?,
            catalog_path: try_load("CATALOG_PATH", "data/effects.json")?,
            catalog_url: var("CATALOG_URL").ok(),
            submissions_path: try_load("SUBMISSIONS_PATH", "data/submissions.json")?,
            database_path: try_load("DATABASE_PATH", "data/effects.db")?,
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379")?,
            cors_origin: try_load("CORS_ORIGIN", "*")?,
            token_ttl_secs: try_load("TOKEN_TTL_SECS", "3600")?,
            stats_fallback: SiteStats {
                total_effects: try_load("STATS_FALLBACK_EFFECTS", "15")?,
                total_votes: try_load("STATS_FALLBACK_VOTES", "48000")?,
                estimated_participants: try_load("STATS_FALLBACK_PARTICIPANTS", "16000")?,
            },
            admin_password_hash: read_secret("ADMIN_PASSWORD_HASH"),
            token_secret: read_secret("TOKEN_SECRET"),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if let Some(secret) = &self.token_secret {
            if secret.len() < 32 {
                bail!("TOKEN_SECRET must be at least 32 characters");
            }
        }

        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            bail!("TOKEN_TTL_SECS must be between 1 and {MAX_TOKEN_TTL_SECS}");
        }

        if self.admin_password_hash.is_some() != self.token_secret.is_some() {
            warn!("ADMIN_PASSWORD_HASH and TOKEN_SECRET must both be set, admin routes disabled");
        }

        Ok(())
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_password_hash.is_some() && self.token_secret.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            backend: Backend::Json,
            catalog_path: PathBuf::from("data/effects.json"),
            catalog_url: None,
            submissions_path: PathBuf::from("data/submissions.json"),
            database_path: PathBuf::from("data/effects.db"),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cors_origin: "*".to_string(),
            token_ttl_secs: 3600,
            stats_fallback: SiteStats {
                total_effects: 15,
                total_votes: 48000,
                estimated_participants: 16000,
            },
            admin_password_hash: None,
            token_secret: None,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, Error>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value: {e}"))
}

/// Docker secret first, then the plain environment.
fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .or_else(|_| var(secret_name).map(|s| s.trim().to_string()))
        .ok()
        .filter(|s| !s.is_empty())
}
