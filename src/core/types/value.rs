//! Element kinds and decoded values for typed memory reads

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of fixed-width element kinds the cached read paths can
/// represent. Sizes other than 1/2/4/8 bytes, and floats narrower than 4
/// bytes, have no variant and are rejected by [`ElementKind::from_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ElementKind {
    /// Selects the element kind for a size/signedness/float combination.
    ///
    /// Returns `None` for unsupported combinations. The float flag wins for
    /// sizes 4 and 8; the unsigned flag is ignored for floats.
    pub fn from_flags(size: usize, is_unsigned: bool, is_float: bool) -> Option<Self> {
        match (is_float, is_unsigned, size) {
            (true, _, 4) => Some(ElementKind::F32),
            (true, _, 8) => Some(ElementKind::F64),
            (true, _, _) => None,
            (false, true, 1) => Some(ElementKind::U8),
            (false, true, 2) => Some(ElementKind::U16),
            (false, true, 4) => Some(ElementKind::U32),
            (false, true, 8) => Some(ElementKind::U64),
            (false, false, 1) => Some(ElementKind::I8),
            (false, false, 2) => Some(ElementKind::I16),
            (false, false, 4) => Some(ElementKind::I32),
            (false, false, 8) => Some(ElementKind::I64),
            _ => None,
        }
    }

    /// Returns the size in bytes of one element of this kind
    pub const fn size(&self) -> usize {
        match self {
            ElementKind::U8 | ElementKind::I8 => 1,
            ElementKind::U16 | ElementKind::I16 => 2,
            ElementKind::U32 | ElementKind::I32 | ElementKind::F32 => 4,
            ElementKind::U64 | ElementKind::I64 | ElementKind::F64 => 8,
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::U8 => "u8",
            ElementKind::I8 => "i8",
            ElementKind::U16 => "u16",
            ElementKind::I16 => "i16",
            ElementKind::U32 => "u32",
            ElementKind::I32 => "i32",
            ElementKind::U64 => "u64",
            ElementKind::I64 => "i64",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        };
        write!(f, "{}", name)
    }
}

/// A single decoded value read out of debuggee memory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MemValue {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

fn le_chunk<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    bytes.get(..N)?.try_into().ok()
}

impl MemValue {
    /// Decodes a value of `kind` from little-endian bytes.
    ///
    /// Returns `None` when `bytes` holds fewer than `kind.size()` bytes.
    pub fn from_le_bytes(kind: ElementKind, bytes: &[u8]) -> Option<Self> {
        match kind {
            ElementKind::U8 => bytes.first().map(|&b| MemValue::U8(b)),
            ElementKind::I8 => bytes.first().map(|&b| MemValue::I8(b as i8)),
            ElementKind::U16 => le_chunk(bytes).map(|b| MemValue::U16(u16::from_le_bytes(b))),
            ElementKind::I16 => le_chunk(bytes).map(|b| MemValue::I16(i16::from_le_bytes(b))),
            ElementKind::U32 => le_chunk(bytes).map(|b| MemValue::U32(u32::from_le_bytes(b))),
            ElementKind::I32 => le_chunk(bytes).map(|b| MemValue::I32(i32::from_le_bytes(b))),
            ElementKind::U64 => le_chunk(bytes).map(|b| MemValue::U64(u64::from_le_bytes(b))),
            ElementKind::I64 => le_chunk(bytes).map(|b| MemValue::I64(i64::from_le_bytes(b))),
            ElementKind::F32 => le_chunk(bytes).map(|b| MemValue::F32(f32::from_le_bytes(b))),
            ElementKind::F64 => le_chunk(bytes).map(|b| MemValue::F64(f64::from_le_bytes(b))),
        }
    }

    /// Encodes the value in little-endian byte order
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            MemValue::I8(v) => v.to_le_bytes().to_vec(),
            MemValue::I16(v) => v.to_le_bytes().to_vec(),
            MemValue::I32(v) => v.to_le_bytes().to_vec(),
            MemValue::I64(v) => v.to_le_bytes().to_vec(),
            MemValue::U8(v) => v.to_le_bytes().to_vec(),
            MemValue::U16(v) => v.to_le_bytes().to_vec(),
            MemValue::U32(v) => v.to_le_bytes().to_vec(),
            MemValue::U64(v) => v.to_le_bytes().to_vec(),
            MemValue::F32(v) => v.to_le_bytes().to_vec(),
            MemValue::F64(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// Gets the element kind for this value
    pub const fn kind(&self) -> ElementKind {
        match self {
            MemValue::I8(_) => ElementKind::I8,
            MemValue::I16(_) => ElementKind::I16,
            MemValue::I32(_) => ElementKind::I32,
            MemValue::I64(_) => ElementKind::I64,
            MemValue::U8(_) => ElementKind::U8,
            MemValue::U16(_) => ElementKind::U16,
            MemValue::U32(_) => ElementKind::U32,
            MemValue::U64(_) => ElementKind::U64,
            MemValue::F32(_) => ElementKind::F32,
            MemValue::F64(_) => ElementKind::F64,
        }
    }

    /// Returns the size in bytes of the value
    pub const fn size(&self) -> usize {
        self.kind().size()
    }

    /// Widens any integer value to u64; `None` for floats
    pub const fn as_u64(&self) -> Option<u64> {
        match self {
            MemValue::U8(v) => Some(*v as u64),
            MemValue::U16(v) => Some(*v as u64),
            MemValue::U32(v) => Some(*v as u64),
            MemValue::U64(v) => Some(*v),
            MemValue::I8(v) => Some(*v as u64),
            MemValue::I16(v) => Some(*v as u64),
            MemValue::I32(v) => Some(*v as u64),
            MemValue::I64(v) => Some(*v as u64),
            MemValue::F32(_) | MemValue::F64(_) => None,
        }
    }
}

impl fmt::Display for MemValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemValue::I8(v) => write!(f, "{}", v),
            MemValue::I16(v) => write!(f, "{}", v),
            MemValue::I32(v) => write!(f, "{}", v),
            MemValue::I64(v) => write!(f, "{}", v),
            MemValue::U8(v) => write!(f, "{}", v),
            MemValue::U16(v) => write!(f, "{}", v),
            MemValue::U32(v) => write!(f, "{}", v),
            MemValue::U64(v) => write!(f, "{}", v),
            MemValue::F32(v) => write!(f, "{}", v),
            MemValue::F64(v) => write!(f, "{}", v),
        }
    }
}
