// layout.rs - Field packing for struct-of-arrays and array-of-structs buffers
//
// Fields keep their declared order. Each field starts at the next offset
// aligned to its element size; the record stride is aligned to the largest
// element size in the record.

use crate::numeric::{Numeric, NumericType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Logical descriptor of one field: `count` contiguous elements of `ty`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    /// Field name, empty for anonymous fields.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: NumericType,
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_count() -> usize {
    1
}

impl StructField {
    pub fn new(name: impl Into<String>, ty: NumericType, count: usize) -> Self {
        Self {
            name: name.into(),
            ty,
            count,
        }
    }

    /// Field holding `count` elements of the Rust primitive `T`.
    pub fn of<T: Numeric>(name: impl Into<String>, count: usize) -> Self {
        Self::new(name, T::TYPE, count)
    }

    pub fn anonymous(ty: NumericType, count: usize) -> Self {
        Self::new(String::new(), ty, count)
    }

    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.ty.byte_size * self.count
    }
}

/// A field with its packed position inside one record.
///
/// In struct-of-arrays buffers the field's sub-array starts at
/// `capacity * byte_offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedStructField {
    pub field: StructField,
    pub byte_offset: usize,
    pub size_bytes: usize,
}

impl PositionedStructField {
    #[inline]
    pub fn name(&self) -> &str {
        &self.field.name
    }

    #[inline]
    pub fn ty(&self) -> NumericType {
        self.field.ty
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.field.count
    }

    #[inline]
    pub fn end_offset(&self) -> usize {
        self.byte_offset + self.size_bytes
    }
}

/// How the final record stride is aligned.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PackingRule {
    /// Align the stride to the largest element size actually present.
    #[default]
    Natural,
    /// Additionally floor that alignment to the size of the default float,
    /// so strides are usable directly as vertex strides.
    FloatAligned,
}

/// Result of packing a field list.
#[derive(Debug, Clone)]
pub struct PackedLayout {
    fields: Vec<PositionedStructField>,
    by_name: HashMap<String, usize>,
    stride: usize,
    max_element_size: usize,
}

impl PackedLayout {
    #[inline]
    pub fn fields(&self) -> &[PositionedStructField] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> &PositionedStructField {
        &self.fields[index]
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Index of the first field with this name. Anonymous fields are not indexed.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Bytes per record.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn max_element_size(&self) -> usize {
        self.max_element_size
    }

    /// Bytes needed to hold `capacity` records.
    #[inline]
    pub fn size_bytes(&self, capacity: usize) -> usize {
        self.stride * capacity
    }
}

/// Round `offset` up to the next multiple of `alignment`.
#[inline]
pub fn align_up(offset: usize, alignment: usize) -> usize {
    debug_assert!(alignment > 0);
    offset.div_ceil(alignment) * alignment
}

/// Pack `fields` in order, returning positioned fields and the record stride.
///
/// # Panics
/// Panics if `fields` is empty or any field has a zero element count.
pub fn pack_fields(fields: &[StructField], rule: PackingRule) -> PackedLayout {
    assert!(!fields.is_empty(), "cannot pack an empty field list");

    let mut positioned = Vec::with_capacity(fields.len());
    let mut by_name = HashMap::new();
    let mut offset = 0;
    let mut max_element_size = 0;

    for (index, field) in fields.iter().enumerate() {
        assert!(field.count > 0, "field {index} ('{}') has a zero element count", field.name);
        let elem_size = field.ty.byte_size;
        max_element_size = max_element_size.max(elem_size);

        let byte_offset = align_up(offset, elem_size);
        let size_bytes = field.size_bytes();
        offset = byte_offset + size_bytes;

        if !field.name.is_empty() {
            by_name.entry(field.name.clone()).or_insert(index);
        }
        positioned.push(PositionedStructField {
            field: field.clone(),
            byte_offset,
            size_bytes,
        });
    }

    if rule == PackingRule::FloatAligned {
        max_element_size = max_element_size.max(NumericType::DEFAULT_FLOAT.byte_size);
    }
    let stride = align_up(offset, max_element_size);

    PackedLayout {
        fields: positioned,
        by_name,
        stride,
        max_element_size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(layout: &PackedLayout) -> Vec<usize> {
        layout.fields().iter().map(|f| f.byte_offset).collect()
    }

    #[test]
    fn packs_mixed_fields_with_alignment() {
        let layout = pack_fields(
            &[
                StructField::of::<u8>("flags", 1),
                StructField::of::<f32>("position", 3),
                StructField::of::<u32>("parent", 1),
            ],
            PackingRule::Natural,
        );

        assert_eq!(offsets(&layout), vec![0, 4, 16]);
        let sizes: Vec<usize> = layout.fields().iter().map(|f| f.size_bytes).collect();
        assert_eq!(sizes, vec![1, 12, 4]);
        assert_eq!(layout.stride(), 20);
    }

    #[test]
    fn stride_aligns_to_largest_element() {
        let layout = pack_fields(
            &[StructField::of::<f64>("mass", 1), StructField::of::<u8>("layer", 3)],
            PackingRule::Natural,
        );
        assert_eq!(offsets(&layout), vec![0, 8]);
        assert_eq!(layout.stride(), 16);
        assert_eq!(layout.max_element_size(), 8);
    }

    #[test]
    fn float_aligned_rule_floors_stride_alignment() {
        let fields = [StructField::of::<u8>("r", 1), StructField::of::<u8>("g", 2)];

        let natural = pack_fields(&fields, PackingRule::Natural);
        assert_eq!(natural.stride(), 3);

        let floored = pack_fields(&fields, PackingRule::FloatAligned);
        assert_eq!(floored.stride(), 4);
        assert_eq!(offsets(&floored), offsets(&natural));
    }

    #[test]
    fn offsets_are_monotonic_and_aligned() {
        let fields = [
            StructField::of::<u8>("a", 3),
            StructField::of::<u16>("b", 1),
            StructField::of::<f64>("c", 2),
            StructField::of::<i8>("d", 1),
            StructField::of::<i32>("e", 5),
        ];
        let layout = pack_fields(&fields, PackingRule::Natural);

        for pair in layout.fields().windows(2) {
            assert!(pair[1].byte_offset >= pair[0].end_offset());
        }
        for f in layout.fields() {
            assert_eq!(f.byte_offset % f.ty().byte_size, 0);
        }
        let total: usize = layout.fields().iter().map(|f| f.size_bytes).sum();
        assert!(layout.stride() >= total);
        assert_eq!(layout.stride() % layout.max_element_size(), 0);
    }

    #[test]
    fn name_index_skips_anonymous_fields() {
        let layout = pack_fields(
            &[
                StructField::anonymous(NumericType::U32, 1),
                StructField::of::<f32>("scale", 3),
            ],
            PackingRule::Natural,
        );
        assert_eq!(layout.index_of("scale"), Some(1));
        assert_eq!(layout.index_of(""), None);
    }

    #[test]
    fn field_lists_deserialize_from_json() {
        let fields: Vec<StructField> = serde_json::from_str(
            r#"[{"name": "position", "type": "f32", "count": 3}, {"type": "u8"}]"#,
        )
        .unwrap();
        assert_eq!(fields[0], StructField::of::<f32>("position", 3));
        assert_eq!(fields[1], StructField::anonymous(NumericType::U8, 1));
    }

    #[test]
    #[should_panic(expected = "empty field list")]
    fn empty_field_list_is_rejected() {
        pack_fields(&[], PackingRule::Natural);
    }

    #[test]
    #[should_panic(expected = "zero element count")]
    fn zero_count_is_rejected() {
        pack_fields(&[StructField::of::<u16>("bad", 0)], PackingRule::Natural);
    }
}
