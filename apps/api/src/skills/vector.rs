//! SkillVector: embedding vectors decoded from little-endian float32 blobs.

use std::sync::Arc;

/// Immutable embedding with its L2 norm precomputed. Cheap to clone.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillVector {
    values: Arc<[f32]>,
    norm: f64,
}

impl SkillVector {
    pub fn new(values: Vec<f32>) -> Self {
        let norm = values
            .iter()
            .map(|&v| f64::from(v) * f64::from(v))
            .sum::<f64>()
            .sqrt();
        Self {
            values: values.into(),
            norm,
        }
    }

    /// Decodes a blob of sequential 4-byte little-endian IEEE-754 floats.
    /// Returns `None` for an empty blob or one whose length is not a multiple of 4.
    pub fn from_le_bytes(blob: &[u8]) -> Option<Self> {
        if blob.is_empty() || blob.len() % 4 != 0 {
            return None;
        }
        let values = blob
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Some(Self::new(values))
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// dot(a,b) / (‖a‖·‖b‖) over the shared prefix, clamped to [-1, 1];
/// 0.0 when either norm is 0.
pub fn cosine_similarity(a: &SkillVector, b: &SkillVector) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 || a.norm <= 0.0 || b.norm <= 0.0 {
        return 0.0;
    }
    let dot: f64 = a.values[..n]
        .iter()
        .zip(&b.values[..n])
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    (dot / (a.norm * b.norm)).clamp(-1.0, 1.0)
}
