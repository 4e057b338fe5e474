// view.rs - Typed views into packed buffers
//
// Views are plain slices borrowed from their container, so the borrow
// checker already rejects a view that outlives a reallocating call.
// Managers that cache *where* data lives (rather than a borrow) use
// `ViewKey`, which records the buffer generation it was minted at.

use super::StorageError;
use crate::layout::PositionedStructField;
use crate::numeric::Numeric;
use std::ops::Range;

/// Outcome of an operation that may replace a container's backing buffer.
#[must_use = "cached view keys are stale after a reallocation"]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Growth {
    /// The backing buffer was kept; existing keys remain valid.
    InPlace,
    /// The backing buffer was replaced; re-derive any cached views.
    Reallocated,
}

impl Growth {
    #[inline]
    pub fn did_reallocate(self) -> bool {
        self == Growth::Reallocated
    }
}

/// Token naming one field's view at a particular buffer generation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub(crate) field: usize,
    pub(crate) generation: u64,
}

impl ViewKey {
    #[inline]
    pub fn field(&self) -> usize {
        self.field
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Byte range of a field's sub-array in a struct-of-arrays buffer.
#[inline]
pub(crate) fn soa_range(field: &PositionedStructField, capacity: usize) -> Range<usize> {
    let start = capacity * field.byte_offset;
    start..start + capacity * field.size_bytes
}

/// Copy every surviving record of a struct-of-arrays buffer into a buffer
/// laid out for `new_capacity` records.
pub(crate) fn relocate_soa(
    fields: &[PositionedStructField],
    old: &[u8],
    old_capacity: usize,
    new: &mut [u8],
    new_capacity: usize,
) -> usize {
    let kept = old_capacity.min(new_capacity);
    let mut moved = 0;
    for field in fields {
        let len = kept * field.size_bytes;
        let src = old_capacity * field.byte_offset;
        let dst = new_capacity * field.byte_offset;
        new[dst..dst + len].copy_from_slice(&old[src..src + len]);
        moved += len;
    }
    moved
}

pub(crate) fn check_kind<T: Numeric>(
    index: usize,
    field: &PositionedStructField,
) -> Result<(), StorageError> {
    if field.ty().kind != T::TYPE.kind {
        return Err(StorageError::FieldTypeMismatch {
            field: index,
            expected: T::TYPE.kind,
            actual: field.ty().kind,
        });
    }
    Ok(())
}

#[inline]
pub(crate) fn assert_kind<T: Numeric>(index: usize, field: &PositionedStructField) {
    assert!(
        field.ty().kind == T::TYPE.kind,
        "field {index} ('{}') holds {} elements, not {}",
        field.name(),
        field.ty().kind,
        T::TYPE.kind
    );
}

#[inline]
pub(crate) fn cast<T: Numeric>(bytes: &[u8]) -> &[T] {
    bytemuck::cast_slice(bytes)
}

#[inline]
pub(crate) fn cast_mut<T: Numeric>(bytes: &mut [u8]) -> &mut [T] {
    bytemuck::cast_slice_mut(bytes)
}

/// Disjoint mutable views of every field in a struct-of-arrays buffer.
///
/// Each field can be taken once, which lets a manager write several
/// fields in the same pass.
///
/// ```ignore
/// let mut views = transforms.views_mut();
/// let positions: &mut [f32] = views.take(0);
/// let parents: &mut [u32] = views.take(3);
/// ```
pub struct FieldViewsMut<'a> {
    fields: &'a [PositionedStructField],
    slots: Vec<Option<&'a mut [u8]>>,
}

impl<'a> FieldViewsMut<'a> {
    pub(crate) fn split(
        fields: &'a [PositionedStructField],
        bytes: &'a mut [u8],
        capacity: usize,
    ) -> Self {
        let mut slots = Vec::with_capacity(fields.len());
        let mut rest = bytes;
        let mut consumed = 0;
        for field in fields {
            let range = soa_range(field, capacity);
            let (_, tail) = std::mem::take(&mut rest).split_at_mut(range.start - consumed);
            let (view, tail) = tail.split_at_mut(range.len());
            slots.push(Some(view));
            rest = tail;
            consumed = range.end;
        }
        Self { fields, slots }
    }

    /// Take the typed view of field `index`.
    ///
    /// # Panics
    /// Panics if the field was already taken or holds a different element kind.
    pub fn take<T: Numeric>(&mut self, index: usize) -> &'a mut [T] {
        assert_kind::<T>(index, &self.fields[index]);
        let bytes = self.slots[index]
            .take()
            .unwrap_or_else(|| panic!("view of field {index} was already taken"));
        cast_mut(bytes)
    }

    /// Take the raw bytes of field `index`, if not already taken.
    pub fn take_bytes(&mut self, index: usize) -> Option<&'a mut [u8]> {
        self.slots.get_mut(index)?.take()
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
