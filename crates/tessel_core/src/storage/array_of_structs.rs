// array_of_structs.rs - Growable array-of-structs buffer
//
// Records are stored back to back, `stride` bytes each. Reallocation copies
// the surviving prefix verbatim.

use super::growable::{Arrangement, GrowableStore};
use super::view::{assert_kind, cast, cast_mut, check_kind, Growth};
use super::StorageError;
use crate::config::GrowthPolicy;
use crate::layout::{pack_fields, PackedLayout, PackingRule, PositionedStructField, StructField};
use crate::numeric::Numeric;
use std::ops::Range;

/// Growable array-of-structs buffer.
pub struct ArrayOfStructs<'s> {
    inner: GrowableStore<'s>,
}

impl<'s> ArrayOfStructs<'s> {
    /// Allocate a zeroed buffer for `capacity` records of `fields`.
    ///
    /// # Panics
    /// Panics if `fields` is empty, a field count is zero, or `capacity` is zero.
    pub fn new(fields: &[StructField], capacity: usize) -> Self {
        Self {
            inner: GrowableStore::new(fields, capacity, Arrangement::ArrayOfStructs),
        }
    }

    /// Build a buffer on top of caller storage, adopting its contents.
    pub fn with_storage(
        fields: &[StructField],
        capacity: usize,
        storage: &'s mut [u8],
    ) -> Result<Self, StorageError> {
        Ok(Self {
            inner: GrowableStore::with_storage(
                fields,
                capacity,
                Arrangement::ArrayOfStructs,
                storage,
            )?,
        })
    }

    pub fn size_bytes_required(fields: &[StructField], capacity: usize) -> usize {
        pack_fields(fields, PackingRule::Natural).size_bytes(capacity)
    }

    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.inner.set_growth(growth);
        self
    }

    #[inline]
    pub fn growth(&self) -> GrowthPolicy {
        self.inner.growth()
    }

    #[inline]
    pub fn layout(&self) -> &PackedLayout {
        self.inner.layout()
    }

    #[inline]
    pub fn fields(&self) -> &[PositionedStructField] {
        self.inner.layout().fields()
    }

    #[inline]
    pub fn field(&self, index: usize) -> &PositionedStructField {
        self.inner.layout().field(index)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.inner.layout().index_of(name)
    }

    pub fn field_named(&self, name: &str) -> Result<&PositionedStructField, StorageError> {
        self.field_index(name)
            .map(|index| self.field(index))
            .ok_or_else(|| StorageError::UnknownField {
                name: name.to_string(),
            })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.count() == 0
    }

    pub fn back_index(&self) -> Option<usize> {
        self.count().checked_sub(1)
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.inner.layout().stride()
    }

    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.inner.bytes().len()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation()
    }

    #[inline]
    pub fn is_borrowed(&self) -> bool {
        self.inner.is_borrowed()
    }

    pub fn resize(&mut self, new_capacity: usize) -> Growth {
        self.inner.resize(new_capacity)
    }

    pub fn resize_into(
        &mut self,
        new_capacity: usize,
        storage: &'s mut [u8],
    ) -> Result<Growth, StorageError> {
        self.inner.resize_into(new_capacity, storage)
    }

    pub fn reserve(&mut self, min_capacity: usize) -> Growth {
        self.inner.reserve(min_capacity)
    }

    /// Append one zeroed record, growing the buffer if it is full.
    ///
    /// The new record is zeroed even when the buffer sits on caller storage.
    pub fn extend(&mut self) -> Growth {
        self.inner.extend()
    }

    pub fn truncate(&mut self, count: usize) {
        self.inner.truncate(count);
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.inner.bytes()
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.inner.bytes_mut()
    }

    #[inline]
    fn record_range(&self, record: usize) -> Range<usize> {
        debug_assert!(record < self.capacity(), "record {record} out of range");
        let stride = self.stride();
        record * stride..(record + 1) * stride
    }

    fn field_range(&self, record: usize, index: usize) -> Range<usize> {
        let field = self.field(index);
        let start = self.record_range(record).start + field.byte_offset;
        start..start + field.size_bytes
    }

    /// The `stride`-byte window of record `record`.
    pub fn record_bytes(&self, record: usize) -> &[u8] {
        &self.inner.bytes()[self.record_range(record)]
    }

    pub fn record_bytes_mut(&mut self, record: usize) -> &mut [u8] {
        let range = self.record_range(record);
        &mut self.inner.bytes_mut()[range]
    }

    /// Typed view of field `index` inside record `record`.
    ///
    /// # Panics
    /// Panics if `T` is not the field's element type.
    pub fn record_field<T: Numeric>(&self, record: usize, index: usize) -> &[T] {
        assert_kind::<T>(index, self.field(index));
        cast(&self.inner.bytes()[self.field_range(record, index)])
    }

    pub fn record_field_mut<T: Numeric>(&mut self, record: usize, index: usize) -> &mut [T] {
        assert_kind::<T>(index, self.field(index));
        let range = self.field_range(record, index);
        cast_mut(&mut self.inner.bytes_mut()[range])
    }

    pub fn try_record_field<T: Numeric>(
        &self,
        record: usize,
        index: usize,
    ) -> Result<&[T], StorageError> {
        check_kind::<T>(index, self.field(index))?;
        Ok(cast(&self.inner.bytes()[self.field_range(record, index)]))
    }

    /// Iterate the byte windows of the appended records.
    pub fn records(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.inner
            .bytes()
            .chunks_exact(self.stride())
            .take(self.count())
    }
}
