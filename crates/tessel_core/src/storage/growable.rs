// growable.rs - Capacity, record count and reallocation shared by the
// growable struct-of-arrays and array-of-structs buffers.

use super::bytes::ByteStore;
use super::view::{relocate_soa, soa_range, Growth};
use super::StorageError;
use crate::config::GrowthPolicy;
use crate::layout::{pack_fields, PackedLayout, PackingRule, StructField};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Arrangement {
    StructOfArrays,
    ArrayOfStructs,
}

pub(crate) struct GrowableStore<'s> {
    layout: PackedLayout,
    arrangement: Arrangement,
    store: ByteStore<'s>,
    capacity: usize,
    count: usize,
    generation: u64,
    growth: GrowthPolicy,
}

impl<'s> GrowableStore<'s> {
    pub fn new(fields: &[StructField], capacity: usize, arrangement: Arrangement) -> Self {
        assert!(capacity > 0, "capacity must be greater than zero");
        let layout = pack_fields(fields, PackingRule::Natural);
        let store = ByteStore::zeroed(layout.size_bytes(capacity));
        Self::from_parts(layout, arrangement, store, capacity)
    }

    pub fn with_storage(
        fields: &[StructField],
        capacity: usize,
        arrangement: Arrangement,
        storage: &'s mut [u8],
    ) -> Result<Self, StorageError> {
        assert!(capacity > 0, "capacity must be greater than zero");
        let layout = pack_fields(fields, PackingRule::Natural);
        let store = ByteStore::adopt(storage, layout.size_bytes(capacity))?;
        Ok(Self::from_parts(layout, arrangement, store, capacity))
    }

    fn from_parts(
        layout: PackedLayout,
        arrangement: Arrangement,
        store: ByteStore<'s>,
        capacity: usize,
    ) -> Self {
        Self {
            layout,
            arrangement,
            store,
            capacity,
            count: 0,
            generation: 0,
            growth: GrowthPolicy::default(),
        }
    }

    pub fn set_growth(&mut self, growth: GrowthPolicy) {
        self.growth = growth.sanitized();
    }

    #[inline]
    pub fn layout(&self) -> &PackedLayout {
        &self.layout
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.store.as_bytes()
    }

    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        self.store.as_bytes_mut()
    }

    #[inline]
    pub fn layout_and_bytes_mut(&mut self) -> (&PackedLayout, &mut [u8]) {
        (&self.layout, self.store.as_bytes_mut())
    }

    #[inline]
    pub fn is_borrowed(&self) -> bool {
        self.store.is_borrowed()
    }

    pub fn resize(&mut self, new_capacity: usize) -> Growth {
        if new_capacity == self.capacity {
            return Growth::InPlace;
        }
        assert!(new_capacity > 0, "capacity must be greater than zero");
        let next = ByteStore::zeroed(self.layout.size_bytes(new_capacity));
        self.replace(new_capacity, next)
    }

    pub fn resize_into(
        &mut self,
        new_capacity: usize,
        storage: &'s mut [u8],
    ) -> Result<Growth, StorageError> {
        if new_capacity == self.capacity {
            return Ok(Growth::InPlace);
        }
        assert!(new_capacity > 0, "capacity must be greater than zero");
        let mut next = ByteStore::adopt(storage, self.layout.size_bytes(new_capacity))?;
        next.zero();
        Ok(self.replace(new_capacity, next))
    }

    fn replace(&mut self, new_capacity: usize, mut next: ByteStore<'s>) -> Growth {
        let old_capacity = self.capacity;
        let moved = match self.arrangement {
            Arrangement::StructOfArrays => relocate_soa(
                self.layout.fields(),
                self.store.as_bytes(),
                old_capacity,
                next.as_bytes_mut(),
                new_capacity,
            ),
            Arrangement::ArrayOfStructs => {
                let len = self.layout.size_bytes(old_capacity.min(new_capacity));
                next.as_bytes_mut()[..len].copy_from_slice(&self.store.as_bytes()[..len]);
                len
            }
        };

        tracing::debug!(
            old_capacity,
            new_capacity,
            bytes_moved = moved,
            borrowed = next.is_borrowed(),
            "reallocated packed buffer"
        );

        self.store = next;
        self.capacity = new_capacity;
        self.count = self.count.min(new_capacity);
        self.generation += 1;
        Growth::Reallocated
    }

    pub fn reserve(&mut self, min_capacity: usize) -> Growth {
        if min_capacity <= self.capacity {
            return Growth::InPlace;
        }
        let target = self.growth.next_capacity(self.capacity).max(min_capacity);
        self.resize(target)
    }

    pub fn extend(&mut self) -> Growth {
        let growth = if self.count == self.capacity {
            self.resize(self.growth.next_capacity(self.capacity))
        } else {
            Growth::InPlace
        };
        // borrowed storage may hold stale bytes past `count`
        self.zero_records(self.count, self.count + 1);
        self.count += 1;
        growth
    }

    pub fn truncate(&mut self, new_count: usize) {
        if new_count >= self.count {
            return;
        }
        self.zero_records(new_count, self.count);
        self.count = new_count;
    }

    fn zero_records(&mut self, first: usize, last: usize) {
        let capacity = self.capacity;
        match self.arrangement {
            Arrangement::StructOfArrays => {
                let fields = self.layout.fields();
                let bytes = self.store.as_bytes_mut();
                for field in fields {
                    let base = soa_range(field, capacity).start;
                    bytes[base + first * field.size_bytes..base + last * field.size_bytes].fill(0);
                }
            }
            Arrangement::ArrayOfStructs => {
                let stride = self.layout.stride();
                self.store.as_bytes_mut()[first * stride..last * stride].fill(0);
            }
        }
    }

    pub fn clear(&mut self) {
        self.store.zero();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<StructField> {
        vec![StructField::of::<u8>("a", 1), StructField::of::<u16>("b", 1)]
    }

    #[test]
    fn extend_grows_only_when_full() {
        let mut store = GrowableStore::new(&fields(), 2, Arrangement::StructOfArrays);
        assert_eq!(store.extend(), Growth::InPlace);
        assert_eq!(store.extend(), Growth::InPlace);
        assert_eq!(store.extend(), Growth::Reallocated);
        assert_eq!(store.count(), 3);
        assert_eq!(store.capacity(), 32);
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn extend_zeroes_records_left_in_caller_storage() {
        for arrangement in [Arrangement::StructOfArrays, Arrangement::ArrayOfStructs] {
            let mut words = [u64::MAX; 4];
            let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut words);
            let mut store = GrowableStore::with_storage(&fields(), 4, arrangement, bytes).unwrap();
            let _ = store.extend();
            let _ = store.extend();

            let layout = store.layout().clone();
            let bytes = store.bytes();
            for field in layout.fields() {
                let (first, second) = match arrangement {
                    Arrangement::StructOfArrays => {
                        let base = soa_range(field, 4).start;
                        (base, base + field.size_bytes)
                    }
                    Arrangement::ArrayOfStructs => {
                        (field.byte_offset, layout.stride() + field.byte_offset)
                    }
                };
                assert!(bytes[first..first + field.size_bytes].iter().all(|&b| b == 0));
                assert!(bytes[second..second + field.size_bytes].iter().all(|&b| b == 0));
            }
            // records past `count` keep what the caller stored
            assert_eq!(*bytes.last().unwrap(), 0xFF);
        }
    }

    #[test]
    fn resize_to_same_capacity_is_a_no_op() {
        let mut store = GrowableStore::new(&fields(), 4, Arrangement::ArrayOfStructs);
        assert_eq!(store.resize(4), Growth::InPlace);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn shrinking_clamps_count() {
        let mut store = GrowableStore::new(&fields(), 8, Arrangement::ArrayOfStructs);
        for _ in 0..6 {
            let _ = store.extend();
        }
        assert_eq!(store.resize(4), Growth::Reallocated);
        assert_eq!(store.count(), 4);
    }

    #[test]
    fn reserve_uses_growth_policy() {
        let mut store = GrowableStore::new(&fields(), 40, Arrangement::StructOfArrays);
        assert_eq!(store.reserve(40), Growth::InPlace);
        assert_eq!(store.reserve(41), Growth::Reallocated);
        assert_eq!(store.capacity(), 80);
        assert_eq!(store.reserve(500), Growth::Reallocated);
        assert_eq!(store.capacity(), 500);
    }
}
