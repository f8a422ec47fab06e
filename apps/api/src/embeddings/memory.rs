use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::embeddings::{EmbeddingError, SkillVectorStore};
use crate::models::skill::SkillRow;
use crate::skills::normalize;

/// Vector store held in memory. An empty store puts the engine in
/// exact-match-only mode; a populated one backs tests and fixtures.
#[derive(Debug, Default)]
pub struct InMemorySkillStore {
    rows: Vec<SkillRow>,
    index: HashMap<String, usize>,
    lookups: AtomicUsize,
}

impl InMemorySkillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a skill with the given vector, keyed by its normalized name.
    pub fn with_vector(self, name: &str, values: &[f32]) -> Self {
        let blob = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.with_blob(name, blob)
    }

    /// Adds a raw blob, which may be deliberately malformed.
    pub fn with_blob(mut self, name: &str, blob: Vec<u8>) -> Self {
        let name = normalize(name);
        let row = SkillRow {
            name: name.clone(),
            embedding: Some(blob),
        };
        match self.index.get(&name) {
            Some(&i) => self.rows[i] = row,
            None => {
                self.index.insert(name, self.rows.len());
                self.rows.push(row);
            }
        }
        self
    }

    /// Number of `embedding_blob` calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SkillVectorStore for InMemorySkillStore {
    async fn embedding_blob(&self, name: &str) -> Result<Option<Vec<u8>>, EmbeddingError> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .index
            .get(name)
            .and_then(|&i| self.rows[i].embedding.clone())
            .filter(|b| !b.is_empty()))
    }

    async fn canonical_skills(&self) -> Result<Vec<SkillRow>, EmbeddingError> {
        Ok(self.rows.clone())
    }
}
