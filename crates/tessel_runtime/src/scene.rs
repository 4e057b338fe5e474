// scene.rs - Simulated frame loop
//
// Spawn requests queue up on a chunked deque and are drained each frame into
// the transform and mesh renderer managers. Transforms rise and spin, renderers
// are culled by distance, and positions are "uploaded" through a cached view
// key that is re-bound whenever transform storage moves.

use crate::mesh_renderers::{DrawItem, MeshRendererManager};
use crate::settings::Settings;
use crate::transforms::TransformManager;
use anyhow::Result;
use glam::{Quat, Vec3};
use tessel_core::{ComponentStore, Deque, Instance, ViewKey};

const RISE_PER_FRAME: f32 = 0.1;
const SPIN_PER_FRAME: f32 = 0.05;
/// Objects rising past this height drop back to the ground.
const WRAP_HEIGHT: f32 = 8.0;

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub spawned: usize,
    pub pending: usize,
    pub draws: usize,
    pub visible: usize,
    pub visibility_changes: usize,
    pub uploaded_floats: usize,
    pub rebinds: usize,
}

pub struct Scene {
    transforms: TransformManager,
    meshes: MeshRendererManager,
    spawn_queue: Deque<u32>,
    upload_key: Option<ViewKey>,
    upload: Vec<f32>,
    rebinds: usize,
    view_distance: f32,
    frame: u64,
}

impl Scene {
    pub fn new(settings: &Settings) -> Self {
        Self {
            transforms: TransformManager::new(
                settings.scene.transform_capacity,
                settings.storage.growth,
            ),
            meshes: MeshRendererManager::new(settings.scene.mesh_capacity),
            spawn_queue: Deque::from_config(&settings.storage),
            upload_key: None,
            upload: Vec::new(),
            rebinds: 0,
            view_distance: settings.scene.view_distance,
            frame: 0,
        }
    }

    pub fn transforms(&self) -> &TransformManager {
        &self.transforms
    }

    pub fn meshes(&self) -> &MeshRendererManager {
        &self.meshes
    }

    /// Queue one object with `mesh` for the next frame.
    pub fn request_spawn(&mut self, mesh: u32) {
        self.spawn_queue.push(mesh);
    }

    /// Queue `mesh` ahead of everything already waiting.
    pub fn request_spawn_urgent(&mut self, mesh: u32) {
        self.spawn_queue.unshift(mesh);
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawn_queue.count()
    }

    /// Run one frame: spawn, animate, cull, upload, build the draw list.
    pub fn step(&mut self) -> Result<(FrameStats, Vec<DrawItem>)> {
        self.frame += 1;
        let spawned = self.drain_spawns()?;
        self.animate();
        let visibility_changes = self.cull();
        let uploaded_floats = self.upload_positions();
        let draws = self.meshes.draw_list();

        let stats = FrameStats {
            frame: self.frame,
            spawned,
            pending: self.spawn_queue.count(),
            draws: draws.len(),
            visible: self.meshes.visible().len(),
            visibility_changes,
            uploaded_floats,
            rebinds: self.rebinds,
        };
        tracing::trace!(?stats, "frame complete");
        Ok((stats, draws))
    }

    fn drain_spawns(&mut self) -> Result<usize> {
        let mut spawned = 0;
        while !self.meshes.is_full() {
            let Some(mesh) = self.spawn_queue.shift() else {
                break;
            };
            // every fourth mesh kind rides on top of the previous object
            let parent = if mesh % 4 == 3 {
                self.transforms.all().last()
            } else {
                Instance::NONE
            };
            let position = if parent.is_some() {
                Vec3::Y
            } else {
                Vec3::new(self.transforms.count() as f32, 0.0, 0.0)
            };
            let transform = self.transforms.create(position, Quat::IDENTITY, Vec3::ONE, parent);
            let renderer = self.meshes.create(transform, mesh, (mesh % 4) as u16)?;
            self.meshes.set_casts_shadows(renderer, parent.is_none());
            spawned += 1;
        }
        if !self.spawn_queue.empty() {
            tracing::warn!(
                pending = self.spawn_queue.count(),
                capacity = self.meshes.capacity(),
                "mesh renderer capacity reached, deferring spawns"
            );
        }
        Ok(spawned)
    }

    fn animate(&mut self) {
        self.transforms.translate_all(Vec3::Y * RISE_PER_FRAME);
        let spin = Quat::from_rotation_y(SPIN_PER_FRAME);
        for transform in self.transforms.all() {
            let rotation = self.transforms.rotation(transform);
            self.transforms.set_rotation(transform, (rotation * spin).normalize());
            let position = self.transforms.position(transform);
            if position.y > WRAP_HEIGHT {
                self.transforms
                    .set_position(transform, Vec3::new(position.x, 0.0, position.z));
            }
        }
    }

    /// Hide renderers whose world origin lies beyond the view distance.
    /// Returns how many changed visibility.
    fn cull(&mut self) -> usize {
        let mut changed = 0;
        for renderer in self.meshes.all() {
            let transform = self.meshes.transform(renderer);
            if transform.is_none() {
                // destroyed
                continue;
            }
            let origin = self.transforms.world_matrix(transform).transform_point3(Vec3::ZERO);
            let visible = origin.length() <= self.view_distance;
            if self.meshes.is_visible(renderer) != visible {
                self.meshes.set_visible(renderer, visible);
                changed += 1;
            }
        }
        changed
    }

    fn upload_positions(&mut self) -> usize {
        let key = match self.upload_key {
            Some(key) if self.transforms.checked_positions(key).is_some() => key,
            stale => {
                if stale.is_some() {
                    self.rebinds += 1;
                    tracing::debug!(rebinds = self.rebinds, "re-binding transform upload");
                }
                let key = self.transforms.position_key();
                self.upload_key = Some(key);
                key
            }
        };
        self.upload.clear();
        if let Some(positions) = self.transforms.checked_positions(key) {
            self.upload.extend_from_slice(positions);
        }
        self.upload.len()
    }

    /// Destroy every renderer and transform created so far.
    pub fn despawn_all(&mut self) {
        let all = self.meshes.all();
        self.meshes.destroy_range(&all);
        let all = self.transforms.all();
        self.transforms.destroy_range(&all);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SceneSettings;

    fn settings(transform_capacity: usize, mesh_capacity: usize) -> Settings {
        Settings {
            scene: SceneSettings {
                transform_capacity,
                mesh_capacity,
                ..SceneSettings::default()
            },
            ..Settings::default()
        }
    }

    #[test]
    fn spawns_drain_in_request_order() {
        let mut scene = Scene::new(&settings(8, 8));
        scene.request_spawn(10);
        scene.request_spawn(11);
        scene.request_spawn_urgent(9);
        let (stats, _) = scene.step().unwrap();
        assert_eq!(stats.spawned, 3);
        assert_eq!(stats.pending, 0);

        let meshes: Vec<u32> = scene
            .meshes()
            .all()
            .into_iter()
            .map(|inst| scene.meshes().mesh(inst))
            .collect();
        assert_eq!(meshes, vec![9, 10, 11]);
    }

    #[test]
    fn upload_rebinds_after_transform_growth() {
        let mut scene = Scene::new(&settings(2, 64));
        scene.request_spawn(1);
        let (first, _) = scene.step().unwrap();
        assert_eq!(first.uploaded_floats, 3);
        assert_eq!(first.rebinds, 0);

        for mesh in 0..4 {
            scene.request_spawn(mesh);
        }
        let (second, draws) = scene.step().unwrap();
        assert_eq!(scene.transforms().reallocations(), 1);
        assert_eq!(second.rebinds, 1);
        assert_eq!(second.uploaded_floats, 15);
        assert_eq!(draws.len(), 5);

        // first object moved up once per frame
        let first_position = scene.transforms().position(Instance::new(1));
        assert!((first_position.y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn full_mesh_store_defers_remaining_spawns() {
        let mut scene = Scene::new(&settings(4, 3));
        for mesh in 0..5 {
            scene.request_spawn(mesh);
        }
        let (stats, _) = scene.step().unwrap();
        assert_eq!(stats.spawned, 3);
        assert_eq!(stats.pending, 2);
        assert_eq!(scene.transforms().count(), 3);
    }

    #[test]
    fn distant_renderers_are_culled() {
        let mut config = settings(8, 8);
        config.scene.view_distance = 2.5;
        let mut scene = Scene::new(&config);
        for mesh in [0, 1, 2, 4, 5] {
            scene.request_spawn(mesh);
        }
        let (stats, draws) = scene.step().unwrap();
        assert_eq!(stats.visible, 3);
        assert_eq!(stats.visibility_changes, 2);
        assert_eq!(draws.len(), 3);
        assert!(!scene.meshes().is_visible(Instance::new(4)));

        let (stats, _) = scene.step().unwrap();
        assert_eq!(stats.visibility_changes, 0);
    }

    #[test]
    fn stacked_objects_follow_their_parent() {
        let mut scene = Scene::new(&settings(8, 8));
        scene.request_spawn(0);
        scene.request_spawn(3);
        let (_, draws) = scene.step().unwrap();

        let child = Instance::new(2);
        assert_eq!(scene.transforms().parent(child), Instance::new(1));
        let origin = scene.transforms().world_matrix(child).transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 1.2, 0.0)).length() < 1e-5);

        let shadows: Vec<bool> = draws.iter().map(|draw| draw.casts_shadows).collect();
        assert_eq!(shadows, vec![true, false]);
    }

    #[test]
    fn objects_spin_and_wrap_at_the_ceiling() {
        let mut scene = Scene::new(&settings(4, 4));
        scene.request_spawn(0);
        scene.step().unwrap();
        let object = Instance::new(1);
        let spin = Quat::from_rotation_y(SPIN_PER_FRAME);
        assert!(scene.transforms().rotation(object).abs_diff_eq(spin, 1e-6));

        scene.transforms.set_position(object, Vec3::new(1.0, WRAP_HEIGHT, 0.0));
        scene.step().unwrap();
        assert_eq!(scene.transforms().position(object), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn despawn_all_hides_everything_but_keeps_counts() {
        let mut scene = Scene::new(&settings(4, 4));
        for mesh in 0..3 {
            scene.request_spawn(mesh);
        }
        scene.step().unwrap();
        let hidden = scene.meshes().all().first();
        scene.meshes.set_visible(hidden, false);
        scene.despawn_all();

        let (stats, draws) = scene.step().unwrap();
        assert!(draws.is_empty());
        assert_eq!(stats.draws, 0);
        assert_eq!(scene.meshes().count(), 3);
        assert_eq!(scene.transforms().scale(Instance::new(2)), Vec3::ZERO);
    }
}
