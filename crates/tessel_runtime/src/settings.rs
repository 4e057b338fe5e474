//! Runtime settings
//!
//! Loaded from an optional JSON file; every section falls back to its
//! default when omitted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessel_core::StorageConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageConfig,
    pub scene: SceneSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    /// Initial transform capacity; the buffer grows past it on demand.
    pub transform_capacity: usize,
    /// Hard limit on mesh renderers.
    pub mesh_capacity: usize,
    /// Objects spawned per simulated frame.
    pub spawn_per_frame: usize,
    pub frames: usize,
    /// Renderers whose world origin is farther than this are hidden.
    pub view_distance: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            transform_capacity: 16,
            mesh_capacity: 256,
            spawn_per_frame: 24,
            frames: 8,
            view_distance: 64.0,
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self> {
        let mut settings: Settings =
            serde_json::from_str(text).context("Invalid settings JSON")?;
        settings.storage.growth = settings.storage.growth.sanitized();
        if settings.storage.deque_chunk_capacity == 0 {
            tracing::warn!("deque_chunk_capacity of 0 is invalid, using 1");
            settings.storage.deque_chunk_capacity = 1;
        }
        if settings.scene.transform_capacity == 0 {
            tracing::warn!("transform_capacity of 0 is invalid, using 1");
            settings.scene.transform_capacity = 1;
        }
        if settings.scene.mesh_capacity == 0 {
            tracing::warn!("mesh_capacity of 0 is invalid, using 1");
            settings.scene.mesh_capacity = 1;
        }
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&text)
    }
}
