// transforms.rs - Transform component manager
//
// Position, rotation, scale and parent live in one growable
// struct-of-arrays buffer, so bulk passes walk each field contiguously.

use glam::{Mat4, Quat, Vec3};
use tessel_core::{
    ComponentStore, GrowthPolicy, Instance, MultiArrayBuffer, StructField, ViewKey,
};

pub const POSITION: usize = 0;
pub const ROTATION: usize = 1;
pub const SCALE: usize = 2;
pub const PARENT: usize = 3;

fn transform_fields() -> [StructField; 4] {
    [
        StructField::of::<f32>("position", 3),
        StructField::of::<f32>("rotation", 4),
        StructField::of::<f32>("scale", 3),
        StructField::of::<u32>("parent", 1),
    ]
}

pub struct TransformManager {
    buffer: MultiArrayBuffer<'static>,
    reallocations: usize,
}

impl TransformManager {
    pub fn new(capacity: usize, growth: GrowthPolicy) -> Self {
        Self {
            buffer: MultiArrayBuffer::new(&transform_fields(), capacity).with_growth(growth),
            reallocations: 0,
        }
    }

    /// Append a transform. `parent` must be [`Instance::NONE`] or an existing transform.
    pub fn create(
        &mut self,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
        parent: Instance<Self>,
    ) -> Instance<Self> {
        assert!(
            parent.is_none() || self.valid(parent),
            "parent {parent:?} is not a live transform"
        );

        if self.buffer.extend().did_reallocate() {
            self.reallocations += 1;
            tracing::debug!(
                capacity = self.buffer.capacity(),
                generation = self.buffer.generation(),
                "transform storage grew"
            );
        }

        let slot = self.buffer.count() - 1;
        let mut views = self.buffer.views_mut();
        views.take::<f32>(POSITION)[slot * 3..slot * 3 + 3].copy_from_slice(&position.to_array());
        views.take::<f32>(ROTATION)[slot * 4..slot * 4 + 4].copy_from_slice(&rotation.to_array());
        views.take::<f32>(SCALE)[slot * 3..slot * 3 + 3].copy_from_slice(&scale.to_array());
        views.take::<u32>(PARENT)[slot] = parent.index();

        Instance::from_slot(slot)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Number of times `create` had to move the storage.
    #[inline]
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    pub fn position(&self, instance: Instance<Self>) -> Vec3 {
        Vec3::from_slice(self.buffer.record_field::<f32>(instance.slot(), POSITION))
    }

    pub fn set_position(&mut self, instance: Instance<Self>, position: Vec3) {
        self.buffer
            .record_field_mut::<f32>(instance.slot(), POSITION)
            .copy_from_slice(&position.to_array());
    }

    pub fn rotation(&self, instance: Instance<Self>) -> Quat {
        Quat::from_slice(self.buffer.record_field::<f32>(instance.slot(), ROTATION))
    }

    pub fn set_rotation(&mut self, instance: Instance<Self>, rotation: Quat) {
        self.buffer
            .record_field_mut::<f32>(instance.slot(), ROTATION)
            .copy_from_slice(&rotation.to_array());
    }

    pub fn scale(&self, instance: Instance<Self>) -> Vec3 {
        Vec3::from_slice(self.buffer.record_field::<f32>(instance.slot(), SCALE))
    }

    pub fn parent(&self, instance: Instance<Self>) -> Instance<Self> {
        Instance::new(self.buffer.record_field::<u32>(instance.slot(), PARENT)[0])
    }

    pub fn local_matrix(&self, instance: Instance<Self>) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            self.scale(instance),
            self.rotation(instance),
            self.position(instance),
        )
    }

    /// Local matrix composed with every ancestor's.
    ///
    /// Parents are always created before their children, so the chain
    /// strictly decreases and terminates.
    pub fn world_matrix(&self, instance: Instance<Self>) -> Mat4 {
        let mut matrix = self.local_matrix(instance);
        let mut parent = self.parent(instance);
        while parent.is_some() {
            matrix = self.local_matrix(parent) * matrix;
            parent = self.parent(parent);
        }
        matrix
    }

    /// Offset every live position by `delta`.
    pub fn translate_all(&mut self, delta: Vec3) {
        let count = self.buffer.count();
        let positions = self.buffer.field_view_mut::<f32>(POSITION);
        for position in positions[..count * 3].chunks_exact_mut(3) {
            position[0] += delta.x;
            position[1] += delta.y;
            position[2] += delta.z;
        }
    }

    /// Key to the packed position column at the current generation.
    pub fn position_key(&self) -> ViewKey {
        self.buffer.view_key(POSITION)
    }

    /// Live positions, or `None` if the storage moved since `key` was taken.
    pub fn checked_positions(&self, key: ViewKey) -> Option<&[f32]> {
        let count = self.buffer.count();
        self.buffer
            .checked_view::<f32>(key)
            .map(|positions| &positions[..count * 3])
    }
}

impl ComponentStore for TransformManager {
    fn count(&self) -> usize {
        self.buffer.count()
    }

    /// Collapse the transform to zero scale and detach it. The slot is not reused.
    fn destroy(&mut self, instance: Instance<Self>) {
        let slot = instance.slot();
        self.buffer.record_field_mut::<f32>(slot, SCALE).fill(0.0);
        self.buffer.record_field_mut::<u32>(slot, PARENT)[0] = 0;
    }
}
