// mesh_renderers.rs - Mesh renderer component manager
//
// Renderers are packed records in a fixed-capacity array of structs; the
// renderer walks them record by record when building draw lists.

use crate::transforms::TransformManager;
use anyhow::{bail, Result};
use tessel_core::{
    ComponentStore, FixedStructArray, Instance, InstanceRange, InstanceSet, StructField,
};

const TRANSFORM: usize = 0;
const MESH: usize = 1;
const MATERIAL: usize = 2;
const FLAGS: usize = 3;

const FLAG_VISIBLE: u8 = 1 << 0;
const FLAG_CASTS_SHADOWS: u8 = 1 << 1;

/// One draw submitted for a visible renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawItem {
    pub transform: Instance<TransformManager>,
    pub mesh: u32,
    pub material: u16,
    pub casts_shadows: bool,
}

pub struct MeshRendererManager {
    records: FixedStructArray,
    count: usize,
    visible: InstanceSet<Self>,
}

impl MeshRendererManager {
    pub fn new(capacity: usize) -> Self {
        let fields = [
            StructField::of::<u32>("transform", 1),
            StructField::of::<u32>("mesh", 1),
            StructField::of::<u16>("material", 1),
            StructField::of::<u8>("flags", 1),
        ];
        Self {
            records: FixedStructArray::new(capacity, &fields),
            count: 0,
            visible: InstanceSet::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.records.capacity()
    }

    /// Attach a visible renderer to `transform`.
    pub fn create(
        &mut self,
        transform: Instance<TransformManager>,
        mesh: u32,
        material: u16,
    ) -> Result<Instance<Self>> {
        if self.is_full() {
            bail!("Mesh renderer capacity of {} exhausted", self.capacity());
        }
        let slot = self.count;
        self.count += 1;

        self.records.record_field_mut::<u32>(slot, TRANSFORM)[0] = transform.index();
        self.records.record_field_mut::<u32>(slot, MESH)[0] = mesh;
        self.records.record_field_mut::<u16>(slot, MATERIAL)[0] = material;
        self.records.record_field_mut::<u8>(slot, FLAGS)[0] = FLAG_VISIBLE;

        let instance = Instance::from_slot(slot);
        self.visible.add(instance);
        Ok(instance)
    }

    pub fn transform(&self, instance: Instance<Self>) -> Instance<TransformManager> {
        Instance::new(self.records.record_field::<u32>(instance.slot(), TRANSFORM)[0])
    }

    pub fn mesh(&self, instance: Instance<Self>) -> u32 {
        self.records.record_field::<u32>(instance.slot(), MESH)[0]
    }

    pub fn material(&self, instance: Instance<Self>) -> u16 {
        self.records.record_field::<u16>(instance.slot(), MATERIAL)[0]
    }

    fn flags(&self, instance: Instance<Self>) -> u8 {
        self.records.record_field::<u8>(instance.slot(), FLAGS)[0]
    }

    fn set_flag(&mut self, instance: Instance<Self>, flag: u8, on: bool) {
        let flags = &mut self.records.record_field_mut::<u8>(instance.slot(), FLAGS)[0];
        if on {
            *flags |= flag;
        } else {
            *flags &= !flag;
        }
    }

    pub fn is_visible(&self, instance: Instance<Self>) -> bool {
        self.visible.has(instance)
    }

    pub fn set_visible(&mut self, instance: Instance<Self>, visible: bool) {
        self.set_flag(instance, FLAG_VISIBLE, visible);
        if visible {
            self.visible.add(instance);
        } else {
            self.visible.remove(instance);
        }
    }

    pub fn set_casts_shadows(&mut self, instance: Instance<Self>, casts: bool) {
        self.set_flag(instance, FLAG_CASTS_SHADOWS, casts);
    }

    pub fn visible(&self) -> &InstanceSet<Self> {
        &self.visible
    }

    /// Draw items for every visible renderer, ordered by mesh then material.
    pub fn draw_list(&self) -> Vec<DrawItem> {
        let mut items: Vec<DrawItem> = self
            .visible
            .iter()
            .map(|instance| DrawItem {
                transform: self.transform(instance),
                mesh: self.mesh(instance),
                material: self.material(instance),
                casts_shadows: self.flags(instance) & FLAG_CASTS_SHADOWS != 0,
            })
            .collect();
        items.sort_by_key(|item| (item.mesh, item.material, item.transform));
        items
    }
}

impl ComponentStore for MeshRendererManager {
    fn count(&self) -> usize {
        self.count
    }

    /// Zero the record and hide it. The slot is not reused.
    fn destroy(&mut self, instance: Instance<Self>) {
        self.records.record_bytes_mut(instance.slot()).fill(0);
        self.visible.remove(instance);
    }
}
