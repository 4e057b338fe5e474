// multi_array.rs - Growable struct-of-arrays buffer
//
// One contiguous allocation holds every field as its own sub-array:
// field `f` of record `i` lives at `capacity * f.byte_offset + i * f.size_bytes`.
// Growing replaces the allocation wholesale; see `Growth`.

use super::growable::{Arrangement, GrowableStore};
use super::view::{assert_kind, cast, cast_mut, check_kind, soa_range, FieldViewsMut, Growth, ViewKey};
use super::StorageError;
use crate::config::GrowthPolicy;
use crate::layout::{pack_fields, PackedLayout, PackingRule, PositionedStructField, StructField};
use crate::numeric::Numeric;

/// Growable struct-of-arrays buffer.
///
/// `'s` is the lifetime of caller-supplied storage; buffers that own their
/// allocation can use any lifetime, typically `'static`.
///
/// Typed views borrow the buffer, so a view can never be used across a
/// call that may reallocate. Callers that cache field *locations* instead
/// hold a [`ViewKey`] and re-derive through [`MultiArrayBuffer::checked_view`].
pub struct MultiArrayBuffer<'s> {
    inner: GrowableStore<'s>,
}

impl<'s> MultiArrayBuffer<'s> {
    /// Allocate a zeroed buffer for `capacity` records of `fields`.
    ///
    /// # Panics
    /// Panics if `fields` is empty, a field count is zero, or `capacity` is zero.
    pub fn new(fields: &[StructField], capacity: usize) -> Self {
        Self {
            inner: GrowableStore::new(fields, capacity, Arrangement::StructOfArrays),
        }
    }

    /// Build a buffer on top of caller storage.
    ///
    /// The storage must be 8-byte aligned and at least
    /// [`size_bytes_required`](Self::size_bytes_required) long. Its current
    /// contents are adopted as-is.
    pub fn with_storage(
        fields: &[StructField],
        capacity: usize,
        storage: &'s mut [u8],
    ) -> Result<Self, StorageError> {
        Ok(Self {
            inner: GrowableStore::with_storage(
                fields,
                capacity,
                Arrangement::StructOfArrays,
                storage,
            )?,
        })
    }

    /// Bytes of storage needed for `capacity` records of `fields`.
    pub fn size_bytes_required(fields: &[StructField], capacity: usize) -> usize {
        pack_fields(fields, PackingRule::Natural).size_bytes(capacity)
    }

    /// Replace the growth policy used by [`extend`](Self::extend) and [`reserve`](Self::reserve).
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

    /// Number of records appended with [`extend`](Self::extend).
    #[inline]
    pub fn count(&self) -> usize {
        self.inner.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.count() == 0
    }

    /// Index of the last appended record.
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

    /// Incremented every time the backing allocation is replaced.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation()
    }

    #[inline]
    pub fn is_borrowed(&self) -> bool {
        self.inner.is_borrowed()
    }

    /// Set the capacity, preserving records `0..min(old, new)` byte for byte.
    pub fn resize(&mut self, new_capacity: usize) -> Growth {
        self.inner.resize(new_capacity)
    }

    /// Like [`resize`](Self::resize), moving the records into caller storage.
    pub fn resize_into(
        &mut self,
        new_capacity: usize,
        storage: &'s mut [u8],
    ) -> Result<Growth, StorageError> {
        self.inner.resize_into(new_capacity, storage)
    }

    /// Ensure room for at least `min_capacity` records.
    pub fn reserve(&mut self, min_capacity: usize) -> Growth {
        self.inner.reserve(min_capacity)
    }

    /// Append one zeroed record, growing the buffer if it is full.
    ///
    /// The new record is zeroed even when the buffer sits on caller storage.
    pub fn extend(&mut self) -> Growth {
        self.inner.extend()
    }

    /// Drop records past `count`, zeroing their slots.
    pub fn truncate(&mut self, count: usize) {
        self.inner.truncate(count);
    }

    /// Zero the whole buffer and reset the record count.
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

    /// Raw bytes of field `index`, spanning all `capacity` records.
    pub fn field_bytes(&self, index: usize) -> &[u8] {
        let range = soa_range(self.field(index), self.capacity());
        &self.inner.bytes()[range]
    }

    pub fn field_bytes_mut(&mut self, index: usize) -> &mut [u8] {
        let range = soa_range(self.field(index), self.capacity());
        &mut self.inner.bytes_mut()[range]
    }

    /// Typed view of field `index`: `capacity * count` elements, record `i`
    /// starting at element `i * count`.
    ///
    /// # Panics
    /// Panics if `T` is not the field's element type.
    pub fn field_view<T: Numeric>(&self, index: usize) -> &[T] {
        assert_kind::<T>(index, self.field(index));
        cast(self.field_bytes(index))
    }

    pub fn field_view_mut<T: Numeric>(&mut self, index: usize) -> &mut [T] {
        assert_kind::<T>(index, self.field(index));
        cast_mut(self.field_bytes_mut(index))
    }

    pub fn try_field_view<T: Numeric>(&self, index: usize) -> Result<&[T], StorageError> {
        check_kind::<T>(index, self.field(index))?;
        Ok(cast(self.field_bytes(index)))
    }

    /// Typed view of a field looked up by name.
    pub fn named_view<T: Numeric>(&self, name: &str) -> Result<&[T], StorageError> {
        let index = self
            .field_index(name)
            .ok_or_else(|| StorageError::UnknownField {
                name: name.to_string(),
            })?;
        self.try_field_view(index)
    }

    /// Elements of field `index` belonging to record `record`.
    pub fn record_field<T: Numeric>(&self, record: usize, index: usize) -> &[T] {
        let count = self.field(index).count();
        &self.field_view::<T>(index)[record * count..(record + 1) * count]
    }

    pub fn record_field_mut<T: Numeric>(&mut self, record: usize, index: usize) -> &mut [T] {
        let count = self.field(index).count();
        &mut self.field_view_mut::<T>(index)[record * count..(record + 1) * count]
    }

    /// Disjoint mutable views of all fields at once.
    pub fn views_mut(&mut self) -> FieldViewsMut<'_> {
        let capacity = self.inner.capacity();
        let (layout, bytes) = self.inner.layout_and_bytes_mut();
        FieldViewsMut::split(layout.fields(), bytes, capacity)
    }

    /// Key for field `index` at the current generation.
    pub fn view_key(&self, index: usize) -> ViewKey {
        assert!(index < self.fields().len(), "field index {index} out of range");
        ViewKey {
            field: index,
            generation: self.generation(),
        }
    }

    /// Whether `key` was minted at the current generation.
    #[inline]
    pub fn is_current(&self, key: ViewKey) -> bool {
        key.generation == self.generation()
    }

    /// Re-derive the view named by `key`, or `None` if the buffer was
    /// reallocated since the key was minted.
    pub fn checked_view<T: Numeric>(&self, key: ViewKey) -> Option<&[T]> {
        self.is_current(key).then(|| self.field_view(key.field))
    }

    pub fn checked_view_mut<T: Numeric>(&mut self, key: ViewKey) -> Option<&mut [T]> {
        if !self.is_current(key) {
            return None;
        }
        Some(self.field_view_mut(key.field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::NumericType;

    fn transform_fields() -> Vec<StructField> {
        vec![
            StructField::of::<f32>("position", 3),
            StructField::of::<u8>("dirty", 1),
            StructField::of::<u32>("parent", 1),
        ]
    }

    #[test]
    fn field_views_span_all_records() {
        let buffer = MultiArrayBuffer::new(&transform_fields(), 4);
        assert_eq!(buffer.field_view::<f32>(0).len(), 12);
        assert_eq!(buffer.field_view::<u8>(1).len(), 4);
        assert_eq!(buffer.field_view::<u32>(2).len(), 4);
        assert_eq!(buffer.size_bytes(), buffer.stride() * 4);
    }

    #[test]
    fn lookup_by_name() {
        let buffer = MultiArrayBuffer::new(&transform_fields(), 2);
        assert_eq!(buffer.field_named("parent").unwrap().byte_offset, 16);
        assert_eq!(buffer.field_named("parent").unwrap().ty(), NumericType::U32);
        assert_eq!(
            buffer.field_named("velocity").unwrap_err(),
            StorageError::UnknownField {
                name: "velocity".into()
            }
        );
        assert!(matches!(
            buffer.named_view::<f64>("position"),
            Err(StorageError::FieldTypeMismatch { field: 0, .. })
        ));
    }

    #[test]
    fn resize_preserves_surviving_records() {
        let mut buffer = MultiArrayBuffer::new(&transform_fields(), 3);
        for record in 0..3 {
            buffer
                .record_field_mut::<f32>(record, 0)
                .copy_from_slice(&[record as f32, 1.5, -2.0]);
            buffer.record_field_mut::<u8>(record, 1)[0] = record as u8 + 10;
            buffer.record_field_mut::<u32>(record, 2)[0] = 100 + record as u32;
        }

        assert_eq!(buffer.resize(7), Growth::Reallocated);
        for record in 0..3 {
            assert_eq!(buffer.record_field::<f32>(record, 0), &[record as f32, 1.5, -2.0]);
            assert_eq!(buffer.record_field::<u8>(record, 1), &[record as u8 + 10]);
            assert_eq!(buffer.record_field::<u32>(record, 2), &[100 + record as u32]);
        }
        assert_eq!(buffer.record_field::<u32>(6, 2), &[0]);

        assert_eq!(buffer.resize(2), Growth::Reallocated);
        assert_eq!(buffer.field_view::<u32>(2), &[100, 101]);
        assert_eq!(buffer.field_view::<u8>(1), &[10, 11]);
    }

    #[test]
    fn resize_to_current_capacity_keeps_generation() {
        let mut buffer = MultiArrayBuffer::new(&transform_fields(), 5);
        buffer.field_view_mut::<u32>(2)[4] = 9;
        assert_eq!(buffer.resize(5), Growth::InPlace);
        assert_eq!(buffer.generation(), 0);
        assert_eq!(buffer.field_view::<u32>(2)[4], 9);
    }

    #[test]
    fn extend_reports_reallocation_and_invalidates_keys() {
        let mut buffer = MultiArrayBuffer::new(&transform_fields(), 1).with_growth(GrowthPolicy {
            factor: 2,
            min_capacity: 0,
        });
        let key = buffer.view_key(2);

        assert_eq!(buffer.extend(), Growth::InPlace);
        assert!(buffer.checked_view::<u32>(key).is_some());
        buffer.field_view_mut::<u32>(2)[0] = 77;

        assert!(buffer.extend().did_reallocate());
        assert_eq!(buffer.capacity(), 2);
        assert_eq!(buffer.count(), 2);
        assert!(buffer.checked_view::<u32>(key).is_none());
        assert!(buffer.checked_view_mut::<u32>(key).is_none());

        let key = buffer.view_key(2);
        assert_eq!(buffer.checked_view::<u32>(key), Some(&[77, 0][..]));
        assert_eq!(buffer.back_index(), Some(1));
    }

    #[test]
    fn views_mut_allows_writing_several_fields() {
        let mut buffer = MultiArrayBuffer::new(&transform_fields(), 2);
        {
            let mut views = buffer.views_mut();
            let positions: &mut [f32] = views.take(0);
            let parents: &mut [u32] = views.take(2);
            positions[3] = 4.0;
            parents[1] = 1;
        }
        assert_eq!(buffer.record_field::<f32>(1, 0), &[4.0, 0.0, 0.0]);
        assert_eq!(buffer.record_field::<u32>(1, 2), &[1]);
    }

    #[test]
    fn truncate_and_clear_zero_records() {
        let mut buffer = MultiArrayBuffer::new(&transform_fields(), 4);
        for _ in 0..4 {
            let _ = buffer.extend();
        }
        buffer.field_view_mut::<u32>(2).copy_from_slice(&[1, 2, 3, 4]);

        buffer.truncate(2);
        assert_eq!(buffer.count(), 2);
        assert_eq!(buffer.field_view::<u32>(2), &[1, 2, 0, 0]);

        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn caller_storage_is_checked_and_used() {
        let fields = transform_fields();
        let required = MultiArrayBuffer::size_bytes_required(&fields, 4);
        assert_eq!(required, 20 * 4);

        let mut small = vec![0u64; 2];
        let err = MultiArrayBuffer::with_storage(&fields, 4, bytemuck::cast_slice_mut(&mut small))
            .err();
        assert_eq!(
            err,
            Some(StorageError::StorageTooSmall {
                required,
                provided: 16
            })
        );

        let mut words = vec![0u64; required / 8];
        let mut buffer =
            MultiArrayBuffer::with_storage(&fields, 4, bytemuck::cast_slice_mut(&mut words))
                .unwrap();
        assert!(buffer.is_borrowed());
        buffer.field_view_mut::<u32>(2)[3] = 5;
        assert_eq!(buffer.resize(8), Growth::Reallocated);
        assert!(!buffer.is_borrowed());
        assert_eq!(buffer.field_view::<u32>(2)[3], 5);
    }

    #[test]
    fn extend_on_dirty_caller_storage_yields_zeroed_record() {
        let fields = transform_fields();
        let mut words = vec![u64::MAX; MultiArrayBuffer::size_bytes_required(&fields, 4) / 8];
        let mut buffer =
            MultiArrayBuffer::with_storage(&fields, 4, bytemuck::cast_slice_mut(&mut words))
                .unwrap();
        assert_eq!(buffer.extend(), Growth::InPlace);
        for index in 0..buffer.fields().len() {
            let size = buffer.field(index).size_bytes;
            let column = buffer.field_bytes(index);
            assert!(column[..size].iter().all(|&b| b == 0), "field {index} not zeroed");
            assert!(column[size..].iter().all(|&b| b == 0xFF));
            assert_eq!(column.len(), 4 * size);
        }
    }

    #[test]
    fn resize_into_caller_storage() {
        let fields = transform_fields();
        let mut words = vec![u64::MAX; MultiArrayBuffer::size_bytes_required(&fields, 6) / 8 + 1];
        let mut buffer = MultiArrayBuffer::new(&fields, 2);
        buffer.field_view_mut::<u32>(2).copy_from_slice(&[8, 9]);

        let growth = buffer
            .resize_into(6, bytemuck::cast_slice_mut(&mut words))
            .unwrap();
        assert!(growth.did_reallocate());
        assert!(buffer.is_borrowed());
        assert_eq!(buffer.field_view::<u32>(2), &[8, 9, 0, 0, 0, 0]);
    }

    #[test]
    #[should_panic(expected = "capacity must be greater than zero")]
    fn zero_capacity_is_rejected() {
        MultiArrayBuffer::new(&transform_fields(), 0);
    }
}
