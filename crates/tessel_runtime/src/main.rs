//! Tessel Engine Runtime
//!
//! Boots logging and settings, then drives the component managers through a
//! short simulated frame loop.
//!
//! Usage: `tessel [settings.json]`

mod mesh_renderers;
mod scene;
mod settings;
mod transforms;

use anyhow::Result;
use scene::Scene;
use settings::Settings;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tessel_core::ComponentStore;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // RUST_LOG overrides the default level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Tessel Engine v{}", tessel_core::VERSION);

    let settings = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            tracing::info!("Loading settings from {}", path.display());
            Settings::load(&path)?
        }
        None => Settings::default(),
    };
    tracing::debug!(?settings, "settings resolved");

    let mut scene = Scene::new(&settings);
    for frame in 0..settings.scene.frames {
        // a marker object jumps the queue every few frames
        if frame % 4 == 0 {
            scene.request_spawn_urgent(0);
        }
        for i in 0..settings.scene.spawn_per_frame {
            scene.request_spawn((frame * settings.scene.spawn_per_frame + i) as u32 % 16);
        }
        let (stats, draws) = scene.step()?;
        let meshes: BTreeSet<u32> = draws.iter().map(|draw| draw.mesh).collect();
        let shadow_casters = draws.iter().filter(|draw| draw.casts_shadows).count();
        tracing::info!(
            frame = stats.frame,
            distinct_meshes = meshes.len(),
            shadow_casters,
            spawned = stats.spawned,
            pending = stats.pending,
            draws = stats.draws,
            visible = stats.visible,
            culled = stats.visibility_changes,
            uploaded = stats.uploaded_floats,
            rebinds = stats.rebinds,
            "frame"
        );
    }

    scene.despawn_all();
    tracing::info!(
        transform_capacity = scene.transforms().capacity(),
        reallocations = scene.transforms().reallocations(),
        renderers = scene.meshes().count(),
        pending = scene.pending_spawns(),
        "Runtime shut down"
    );

    Ok(())
}
