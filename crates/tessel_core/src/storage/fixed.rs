// fixed.rs - Fixed-capacity struct-of-arrays and array-of-structs containers
//
// Allocated once at construction and never reallocated, so views into them
// only ever go stale when the container itself is dropped.

use super::bytes::ByteStore;
use super::view::{assert_kind, cast, cast_mut, soa_range, FieldViewsMut};
use crate::layout::{pack_fields, PackedLayout, PackingRule, PositionedStructField, StructField};
use crate::numeric::Numeric;
use std::ops::Range;

/// Fixed-capacity struct-of-arrays container.
///
/// The stride is aligned to at least the default float size so record
/// strides can be handed to vertex layouts unchanged.
pub struct FixedMultiArray {
    layout: PackedLayout,
    store: ByteStore<'static>,
    capacity: usize,
}

impl FixedMultiArray {
    /// # Panics
    /// Panics if `fields` is empty, a field count is zero, or `capacity` is zero.
    pub fn new(capacity: usize, fields: &[StructField]) -> Self {
        assert!(capacity > 0, "capacity must be greater than zero");
        let layout = pack_fields(fields, PackingRule::FloatAligned);
        let store = ByteStore::zeroed(layout.size_bytes(capacity));
        Self {
            layout,
            store,
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.layout.field_count()
    }

    #[inline]
    pub fn layout(&self) -> &PackedLayout {
        &self.layout
    }

    #[inline]
    pub fn field(&self, index: usize) -> &PositionedStructField {
        self.layout.field(index)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.store.as_bytes()
    }

    /// Zero every field of every record.
    pub fn clear(&mut self) {
        self.store.zero();
    }

    pub fn field_bytes(&self, index: usize) -> &[u8] {
        &self.store.as_bytes()[soa_range(self.field(index), self.capacity)]
    }

    /// Typed view of field `index`, `capacity * count` elements long.
    pub fn field_view<T: Numeric>(&self, index: usize) -> &[T] {
        assert_kind::<T>(index, self.field(index));
        cast(self.field_bytes(index))
    }

    pub fn field_view_mut<T: Numeric>(&mut self, index: usize) -> &mut [T] {
        assert_kind::<T>(index, self.field(index));
        let range = soa_range(self.field(index), self.capacity);
        cast_mut(&mut self.store.as_bytes_mut()[range])
    }

    pub fn views_mut(&mut self) -> FieldViewsMut<'_> {
        FieldViewsMut::split(self.layout.fields(), self.store.as_bytes_mut(), self.capacity)
    }
}

/// Fixed-capacity array-of-structs container.
pub struct FixedStructArray {
    layout: PackedLayout,
    store: ByteStore<'static>,
    capacity: usize,
}

impl FixedStructArray {
    /// # Panics
    /// Panics if `fields` is empty, a field count is zero, or `capacity` is zero.
    pub fn new(capacity: usize, fields: &[StructField]) -> Self {
        assert!(capacity > 0, "capacity must be greater than zero");
        let layout = pack_fields(fields, PackingRule::Natural);
        let store = ByteStore::zeroed(layout.size_bytes(capacity));
        Self {
            layout,
            store,
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.layout.field_count()
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    #[inline]
    pub fn layout(&self) -> &PackedLayout {
        &self.layout
    }

    #[inline]
    pub fn field(&self, index: usize) -> &PositionedStructField {
        self.layout.field(index)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.store.as_bytes()
    }

    pub fn clear(&mut self) {
        self.store.zero();
    }

    fn field_range(&self, record: usize, index: usize) -> Range<usize> {
        debug_assert!(record < self.capacity, "record {record} out of range");
        let field = self.field(index);
        let start = record * self.stride() + field.byte_offset;
        start..start + field.size_bytes
    }

    /// The `stride`-byte window of record `record`.
    pub fn record_bytes(&self, record: usize) -> &[u8] {
        debug_assert!(record < self.capacity, "record {record} out of range");
        let stride = self.stride();
        &self.store.as_bytes()[record * stride..(record + 1) * stride]
    }

    pub fn record_bytes_mut(&mut self, record: usize) -> &mut [u8] {
        debug_assert!(record < self.capacity, "record {record} out of range");
        let stride = self.stride();
        &mut self.store.as_bytes_mut()[record * stride..(record + 1) * stride]
    }

    /// Typed view of field `index` within record `record`.
    pub fn record_field<T: Numeric>(&self, record: usize, index: usize) -> &[T] {
        assert_kind::<T>(index, self.field(index));
        cast(&self.store.as_bytes()[self.field_range(record, index)])
    }

    pub fn record_field_mut<T: Numeric>(&mut self, record: usize, index: usize) -> &mut [T] {
        assert_kind::<T>(index, self.field(index));
        let range = self.field_range(record, index);
        cast_mut(&mut self.store.as_bytes_mut()[range])
    }
}
