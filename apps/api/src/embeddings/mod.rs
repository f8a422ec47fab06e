//! Embedding Store Adapter and the collaborators behind it.
//!
//! The matcher only sees [`VectorLookup`]: a normalized skill name goes in,
//! a vector or `None` comes out. Every collaborator failure (missing table,
//! missing row, malformed blob, timeout, Redis outage) is logged and folded
//! into `None` here, so scoring degrades to exact-match-only instead of failing.
//!
//! `SkillEmbeddings` composes a [`SkillVectorStore`] (source of truth) with a
//! [`VectorCache`] (advisory, TTL-bound). The aligner additionally uses a
//! [`TextEmbedder`] to embed free-text skills on the fly.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::skill::SkillRow;
use crate::skills::SkillVector;

pub mod adapter;
pub mod cache;
pub mod memory;
pub mod store;
pub mod text_client;

pub use adapter::{CanonicalSkill, SkillEmbeddings};
pub use cache::{MokaVectorCache, RedisVectorCache};
pub use memory::InMemorySkillStore;
pub use store::PgSkillStore;
pub use text_client::{DisabledTextEmbedder, HttpTextEmbedder};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Embedding service error (status {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Embedding lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Text embedding is disabled")]
    Disabled,

    #[error("Malformed embedding response: {0}")]
    Malformed(String),
}

/// Source of truth for skill vectors: a table keyed by canonical lowercase
/// skill name holding a little-endian float32 blob.
#[async_trait]
pub trait SkillVectorStore: Send + Sync {
    /// Raw blob for an already-normalized name, `Ok(None)` if no row or NULL.
    async fn embedding_blob(&self, name: &str) -> Result<Option<Vec<u8>>, EmbeddingError>;

    /// Every vocabulary row that has an embedding, in stable vocabulary order.
    async fn canonical_skills(&self) -> Result<Vec<SkillRow>, EmbeddingError>;
}

/// Thread-safe key→vector cache with an explicit TTL.
/// Concurrent fills are last-writer-wins.
#[async_trait]
pub trait VectorCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<SkillVector>;
    async fn put(&self, key: &str, vector: &SkillVector);
    fn ttl(&self) -> Duration;
}

/// What the semantic matcher depends on.
#[async_trait]
pub trait VectorLookup: Send + Sync {
    async fn vector_of(&self, token: &str) -> Option<SkillVector>;
}

/// Batch text-embedding service used only by the canonical skill aligner.
/// Returns one vector per input, in input order.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<SkillVector>, EmbeddingError>;
}
