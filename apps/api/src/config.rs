use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::alignment::DEFAULT_MIN_SIMILARITY;
use crate::matching::DEFAULT_SIMILARITY_THRESHOLD;

/// Application configuration loaded from environment variables.
/// Every collaborator URL is optional: without one the engine runs degraded
/// (exact-match only, in-process cache, identity alignment).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub embedding_service_url: Option<String>,
    pub similarity_threshold: f64,
    pub canonical_min_similarity: f64,
    pub embedding_cache_ttl: Duration,
    pub embedding_lookup_timeout: Duration,
    pub text_embedding_timeout: Duration,
    pub ranking_concurrency: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            redis_url: None,
            embedding_service_url: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            canonical_min_similarity: DEFAULT_MIN_SIMILARITY,
            embedding_cache_ttl: Duration::from_secs(6 * 60 * 60),
            embedding_lookup_timeout: Duration::from_millis(2000),
            text_embedding_timeout: Duration::from_secs(120),
            ranking_concurrency: 16,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let optional = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            database_url: optional("DATABASE_URL"),
            redis_url: optional("REDIS_URL"),
            embedding_service_url: optional("EMBEDDING_SERVICE_URL"),
            similarity_threshold: parse_or(&get, "SIMILARITY_THRESHOLD", defaults.similarity_threshold)?,
            canonical_min_similarity: parse_or(
                &get,
                "CANONICAL_MIN_SIMILARITY",
                defaults.canonical_min_similarity,
            )?,
            embedding_cache_ttl: Duration::from_secs(parse_or(
                &get,
                "EMBEDDING_CACHE_TTL_SECS",
                defaults.embedding_cache_ttl.as_secs(),
            )?),
            embedding_lookup_timeout: Duration::from_millis(parse_or(
                &get,
                "EMBEDDING_LOOKUP_TIMEOUT_MS",
                defaults.embedding_lookup_timeout.as_millis() as u64,
            )?),
            text_embedding_timeout: Duration::from_secs(parse_or(
                &get,
                "TEXT_EMBEDDING_TIMEOUT_SECS",
                defaults.text_embedding_timeout.as_secs(),
            )?),
            ranking_concurrency: parse_or(&get, "RANKING_CONCURRENCY", defaults.ranking_concurrency)?,
            port: parse_or(&get, "PORT", defaults.port)?,
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
        };

        ensure!(
            (0.0..=1.0).contains(&config.similarity_threshold),
            "SIMILARITY_THRESHOLD must be within [0, 1]"
        );
        ensure!(
            (0.0..=1.0).contains(&config.canonical_min_similarity),
            "CANONICAL_MIN_SIMILARITY must be within [0, 1]"
        );
        ensure!(config.ranking_concurrency > 0, "RANKING_CONCURRENCY must be positive");

        Ok(config)
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
