//! Vector caches. Advisory only: a miss or a failed write never changes a
//! match result, it just costs another store lookup.

use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ErrorKind, RedisError, RedisResult};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::warn;

use crate::embeddings::VectorCache;
use crate::skills::SkillVector;

const REDIS_KEY_PREFIX: &str = "skill_embedding_vec:";

/// In-process cache with per-entry time-to-live.
pub struct MokaVectorCache {
    entries: Cache<String, SkillVector>,
    ttl: Duration,
}

impl MokaVectorCache {
    const DEFAULT_CAPACITY: u64 = 50_000;

    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            ttl,
        }
    }

    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for MokaVectorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaVectorCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[async_trait]
impl VectorCache for MokaVectorCache {
    async fn get(&self, key: &str) -> Option<SkillVector> {
        self.entries.get(key)
    }

    async fn put(&self, key: &str, vector: &SkillVector) {
        self.entries.insert(key.to_string(), vector.clone());
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Shared cache across processes. Vectors are stored as the same
/// little-endian float32 blob the store holds, with `SET EX`.
///
/// One multiplexed connection is opened on first use and shared; any command
/// error drops it so the next call redials.
pub struct RedisVectorCache {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    connect_timeout: Duration,
    ttl: Duration,
}

impl RedisVectorCache {
    const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(client: redis::Client, ttl: Duration) -> Self {
        Self {
            client,
            connection: Mutex::new(None),
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            ttl,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    fn key(token: &str) -> String {
        format!("{REDIS_KEY_PREFIX}{token}")
    }

    /// Key, blob and expiry seconds written by `put`.
    fn entry(&self, token: &str, vector: &SkillVector) -> (String, Vec<u8>, u64) {
        (Self::key(token), vector.to_le_bytes(), self.ttl.as_secs().max(1))
    }

    async fn connection(&self) -> RedisResult<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        let conn = timeout(
            self.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| RedisError::from((ErrorKind::IoError, "Redis connect timed out")))??;

        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn reset(&self) {
        *self.connection.lock().await = None;
    }
}

#[async_trait]
impl VectorCache for RedisVectorCache {
    async fn get(&self, key: &str) -> Option<SkillVector> {
        let result: RedisResult<Option<Vec<u8>>> = async {
            let mut conn = self.connection().await?;
            conn.get(Self::key(key)).await
        }
        .await;

        match result {
            Ok(Some(blob)) => SkillVector::from_le_bytes(&blob),
            Ok(None) => None,
            Err(e) => {
                warn!("Redis vector cache read failed for '{key}': {e}");
                self.reset().await;
                None
            }
        }
    }

    async fn put(&self, key: &str, vector: &SkillVector) {
        let (redis_key, blob, seconds) = self.entry(key, vector);
        let result: RedisResult<()> = async {
            let mut conn = self.connection().await?;
            conn.set_ex(redis_key, blob, seconds).await
        }
        .await;

        if let Err(e) = result {
            warn!("Redis vector cache write failed for '{key}': {e}");
            self.reset().await;
        }
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
