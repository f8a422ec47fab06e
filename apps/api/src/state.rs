use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::alignment::SkillAligner;
use crate::config::Config;
use crate::db::create_pool;
use crate::embeddings::{
    DisabledTextEmbedder, HttpTextEmbedder, InMemorySkillStore, MokaVectorCache, PgSkillStore,
    RedisVectorCache, SkillEmbeddings, SkillVectorStore, TextEmbedder, VectorCache,
};
use crate::matching::MatchEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<MatchEngine>,
    pub aligner: Arc<SkillAligner>,
    pub config: Config,
}

impl AppState {
    /// Wires the engine from explicit collaborators.
    pub fn new(
        config: Config,
        store: Arc<dyn SkillVectorStore>,
        cache: Arc<dyn VectorCache>,
        text: Arc<dyn TextEmbedder>,
    ) -> Self {
        let embeddings = Arc::new(SkillEmbeddings::new(
            store,
            cache,
            config.embedding_lookup_timeout,
        ));
        let engine = MatchEngine::new(embeddings.clone())
            .with_ranking_concurrency(config.ranking_concurrency);
        let aligner = SkillAligner::new(embeddings, text)
            .with_min_similarity(config.canonical_min_similarity);

        Self {
            engine: Arc::new(engine),
            aligner: Arc::new(aligner),
            config,
        }
    }

    /// Builds the production collaborators described by `config`, falling
    /// back to degraded stand-ins for anything not configured.
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn SkillVectorStore> = match &config.database_url {
            Some(url) => {
                let pool = create_pool(url, config.embedding_lookup_timeout)?;
                Arc::new(PgSkillStore::new(pool))
            }
            None => {
                info!("DATABASE_URL not set; matching runs exact-match only");
                Arc::new(InMemorySkillStore::new())
            }
        };

        let cache: Arc<dyn VectorCache> = match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                info!("Vector cache: Redis (ttl {:?})", config.embedding_cache_ttl);
                Arc::new(
                    RedisVectorCache::new(client, config.embedding_cache_ttl)
                        .with_connect_timeout(config.embedding_lookup_timeout),
                )
            }
            None => {
                info!("Vector cache: in-process (ttl {:?})", config.embedding_cache_ttl);
                Arc::new(MokaVectorCache::new(config.embedding_cache_ttl))
            }
        };

        let text: Arc<dyn TextEmbedder> = match &config.embedding_service_url {
            Some(url) => Arc::new(HttpTextEmbedder::new(
                url.clone(),
                config.text_embedding_timeout,
            )?),
            None => {
                info!("EMBEDDING_SERVICE_URL not set; skill alignment runs in identity mode");
                Arc::new(DisabledTextEmbedder)
            }
        };

        Ok(Self::new(config, store, cache, text))
    }

    /// Fully in-memory state: the given store, a moka cache, no text embedder.
    pub fn in_memory(config: Config, store: InMemorySkillStore) -> Self {
        let ttl = if config.embedding_cache_ttl.is_zero() {
            Duration::from_secs(60)
        } else {
            config.embedding_cache_ttl
        };
        Self::new(
            config,
            Arc::new(store),
            Arc::new(MokaVectorCache::new(ttl)),
            Arc::new(DisabledTextEmbedder),
        )
    }
}
