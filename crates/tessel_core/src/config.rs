//! Storage configuration
//!
//! Growth and chunking parameters shared by the containers. Loaded by the
//! runtime from JSON; every field falls back to its default.

use serde::{Deserialize, Serialize};

/// Default number of elements per deque chunk.
pub const DEFAULT_CHUNK_CAPACITY: usize = 512;

/// Storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub growth: GrowthPolicy,
    pub deque_chunk_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            growth: GrowthPolicy::default(),
            deque_chunk_capacity: DEFAULT_CHUNK_CAPACITY,
        }
    }
}

/// How growable buffers pick their next capacity when full.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthPolicy {
    /// Capacity multiplier; values below 2 are raised to 2.
    pub factor: usize,
    /// Smallest capacity a growth step produces.
    pub min_capacity: usize,
}

impl GrowthPolicy {
    pub const MIN_FACTOR: usize = 2;

    /// Copy of this policy with the factor raised to at least [`Self::MIN_FACTOR`].
    pub fn sanitized(self) -> Self {
        if self.factor < Self::MIN_FACTOR {
            tracing::warn!(
                factor = self.factor,
                "growth factor below {}, clamping",
                Self::MIN_FACTOR
            );
            return Self {
                factor: Self::MIN_FACTOR,
                ..self
            };
        }
        self
    }

    /// Capacity after one growth step from `capacity`.
    #[inline]
    pub fn next_capacity(&self, capacity: usize) -> usize {
        capacity
            .saturating_mul(self.factor.max(Self::MIN_FACTOR))
            .max(self.min_capacity)
            .max(capacity + 1)
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            factor: 2,
            min_capacity: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_at_least_doubles() {
        let policy = GrowthPolicy::default();
        assert_eq!(policy.next_capacity(1), 32);
        assert_eq!(policy.next_capacity(32), 64);
        assert_eq!(policy.next_capacity(100), 200);
    }

    #[test]
    fn sanitized_raises_small_factor() {
        let policy = GrowthPolicy {
            factor: 1,
            min_capacity: 0,
        }
        .sanitized();
        assert_eq!(policy.factor, 2);
        assert_eq!(policy.next_capacity(5), 10);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: StorageConfig = serde_json::from_str(r#"{"growth": {"factor": 4}}"#).unwrap();
        assert_eq!(config.growth.factor, 4);
        assert_eq!(config.growth.min_capacity, 32);
        assert_eq!(config.deque_chunk_capacity, DEFAULT_CHUNK_CAPACITY);
    }
}
