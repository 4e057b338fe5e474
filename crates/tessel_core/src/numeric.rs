//! Numeric type descriptors
//!
//! Every packed field is a run of one primitive numeric kind. The
//! descriptors here carry the byte size and value range of each kind so
//! the layout engine and the typed views never have to guess.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primitive element kinds a field may hold.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    F32,
    F64,
}

impl ElementKind {
    pub fn name(self) -> &'static str {
        match self {
            ElementKind::U8 => "u8",
            ElementKind::I8 => "i8",
            ElementKind::U16 => "u16",
            ElementKind::I16 => "i16",
            ElementKind::U32 => "u32",
            ElementKind::I32 => "i32",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable description of one primitive numeric kind.
///
/// `min`/`max` are stored as `f64`, which represents every value of the
/// supported kinds exactly.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ElementKind", into = "ElementKind")]
pub struct NumericType {
    pub kind: ElementKind,
    pub byte_size: usize,
    pub signed: bool,
    pub integer: bool,
    pub min: f64,
    pub max: f64,
}

impl NumericType {
    pub const U8: NumericType = NumericType::int(ElementKind::U8, 1, false, 0.0, u8::MAX as f64);
    pub const I8: NumericType =
        NumericType::int(ElementKind::I8, 1, true, i8::MIN as f64, i8::MAX as f64);
    pub const U16: NumericType = NumericType::int(ElementKind::U16, 2, false, 0.0, u16::MAX as f64);
    pub const I16: NumericType =
        NumericType::int(ElementKind::I16, 2, true, i16::MIN as f64, i16::MAX as f64);
    pub const U32: NumericType = NumericType::int(ElementKind::U32, 4, false, 0.0, u32::MAX as f64);
    pub const I32: NumericType =
        NumericType::int(ElementKind::I32, 4, true, i32::MIN as f64, i32::MAX as f64);
    pub const F32: NumericType = NumericType {
        kind: ElementKind::F32,
        byte_size: 4,
        signed: true,
        integer: false,
        min: f32::MIN as f64,
        max: f32::MAX as f64,
    };
    pub const F64: NumericType = NumericType {
        kind: ElementKind::F64,
        byte_size: 8,
        signed: true,
        integer: false,
        min: f64::MIN,
        max: f64::MAX,
    };

    /// The engine's standard float; fixed SoA strides are aligned to at least its size.
    pub const DEFAULT_FLOAT: NumericType = NumericType::F32;

    const fn int(kind: ElementKind, byte_size: usize, signed: bool, min: f64, max: f64) -> Self {
        Self {
            kind,
            byte_size,
            signed,
            integer: true,
            min,
            max,
        }
    }

    /// Descriptor for an element kind.
    pub const fn of(kind: ElementKind) -> Self {
        match kind {
            ElementKind::U8 => Self::U8,
            ElementKind::I8 => Self::I8,
            ElementKind::U16 => Self::U16,
            ElementKind::I16 => Self::I16,
            ElementKind::U32 => Self::U32,
            ElementKind::I32 => Self::I32,
            ElementKind::F32 => Self::F32,
            ElementKind::F64 => Self::F64,
        }
    }

    /// Look up a descriptor by its short name (`"u8"`, `"f32"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "u8" => ElementKind::U8,
            "i8" => ElementKind::I8,
            "u16" => ElementKind::U16,
            "i16" => ElementKind::I16,
            "u32" => ElementKind::U32,
            "i32" => ElementKind::I32,
            "f32" => ElementKind::F32,
            "f64" => ElementKind::F64,
            _ => return None,
        };
        Some(Self::of(kind))
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl From<ElementKind> for NumericType {
    fn from(kind: ElementKind) -> Self {
        NumericType::of(kind)
    }
}

impl From<NumericType> for ElementKind {
    fn from(ty: NumericType) -> Self {
        ty.kind
    }
}

/// Rust primitives that can be viewed directly inside a packed buffer.
///
/// Implemented for the eight kinds described by [`NumericType`]; the
/// `Pod` bound lets views be produced by plain byte casts.
pub trait Numeric: bytemuck::Pod + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    const TYPE: NumericType;
}

macro_rules! impl_numeric {
    ($($ty:ty => $desc:ident),+ $(,)?) => {
        $(
            impl Numeric for $ty {
                const TYPE: NumericType = NumericType::$desc;
            }
        )+
    };
}

impl_numeric! {
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_sizes_match_rust_primitives() {
        assert_eq!(<u8 as Numeric>::TYPE.byte_size, std::mem::size_of::<u8>());
        assert_eq!(<i16 as Numeric>::TYPE.byte_size, std::mem::size_of::<i16>());
        assert_eq!(<u32 as Numeric>::TYPE.byte_size, std::mem::size_of::<u32>());
        assert_eq!(<f64 as Numeric>::TYPE.byte_size, std::mem::size_of::<f64>());
    }

    #[test]
    fn ranges_and_signedness() {
        assert_eq!(NumericType::I8.min, -128.0);
        assert_eq!(NumericType::U16.max, 65535.0);
        assert!(!NumericType::U32.signed);
        assert!(NumericType::F32.signed && !NumericType::F32.integer);
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(NumericType::from_name("i32"), Some(NumericType::I32));
        assert_eq!(NumericType::from_name("f64").map(|t| t.byte_size), Some(8));
        assert!(NumericType::from_name("u64").is_none());
    }

    #[test]
    fn serializes_as_kind_name() {
        let json = serde_json::to_string(&NumericType::U16).unwrap();
        assert_eq!(json, "\"u16\"");
        let back: NumericType = serde_json::from_str("\"f32\"").unwrap();
        assert_eq!(back, NumericType::F32);
    }
}
