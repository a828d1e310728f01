//! Types module: numeric kinds, static type descriptors and runtime operand values.
//!
//! This module provides NumericKind, TypeDescriptor, Scalar and OperandValue.

use std::fmt;
use serde::{Serialize, Deserialize};

/// The integer width/signedness combinations that typed operator families specialize on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericKind {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl NumericKind {
    pub const COUNT: usize = 8;

    pub const ALL: [NumericKind; NumericKind::COUNT] = [
        NumericKind::Int8,
        NumericKind::UInt8,
        NumericKind::Int16,
        NumericKind::UInt16,
        NumericKind::Int32,
        NumericKind::UInt32,
        NumericKind::Int64,
        NumericKind::UInt64,
    ];

    /// Position of this kind in [`NumericKind::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn bit_width(self) -> u32 {
        match self {
            NumericKind::Int8 | NumericKind::UInt8 => 8,
            NumericKind::Int16 | NumericKind::UInt16 => 16,
            NumericKind::Int32 | NumericKind::UInt32 => 32,
            NumericKind::Int64 | NumericKind::UInt64 => 64,
        }
    }

    /// Width at which shifts on this kind are evaluated. Narrow kinds are
    /// promoted to 32 bits first, so their shift counts are masked to 5 bits.
    pub const fn promotion_width(self) -> u32 {
        match self {
            NumericKind::Int64 | NumericKind::UInt64 => 64,
            _ => 32,
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            NumericKind::Int8 | NumericKind::Int16 | NumericKind::Int32 | NumericKind::Int64
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            NumericKind::Int8 => "Int8",
            NumericKind::UInt8 => "UInt8",
            NumericKind::Int16 => "Int16",
            NumericKind::UInt16 => "UInt16",
            NumericKind::Int32 => "Int32",
            NumericKind::UInt32 => "UInt32",
            NumericKind::Int64 => "Int64",
            NumericKind::UInt64 => "UInt64",
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static type of an expression node, as seen by the instruction emitter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TypeDescriptor {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Bool,
    Char,
    Float32,
    Float64,
    Decimal,
    String,
    Object(String),
    /// A named enumeration stored as `underlying`.
    Enum { name: String, underlying: Box<TypeDescriptor> },
    Nullable(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn nullable(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Nullable(Box::new(inner))
    }

    pub fn enumeration(name: impl Into<String>, underlying: TypeDescriptor) -> Self {
        TypeDescriptor::Enum { name: name.into(), underlying: Box::new(underlying) }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeDescriptor::Nullable(_))
    }

    /// Unwraps one nullable layer; any other type is returned as is.
    pub fn non_nullable(&self) -> &TypeDescriptor {
        match self {
            TypeDescriptor::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Resolves this type to the integer kind an operator should specialize on.
    /// Nullable wrappers are stripped and enums are replaced by their underlying
    /// representation. Returns None for anything that is not one of the 8 integer kinds.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            TypeDescriptor::Int8 => Some(NumericKind::Int8),
            TypeDescriptor::UInt8 => Some(NumericKind::UInt8),
            TypeDescriptor::Int16 => Some(NumericKind::Int16),
            TypeDescriptor::UInt16 => Some(NumericKind::UInt16),
            TypeDescriptor::Int32 => Some(NumericKind::Int32),
            TypeDescriptor::UInt32 => Some(NumericKind::UInt32),
            TypeDescriptor::Int64 => Some(NumericKind::Int64),
            TypeDescriptor::UInt64 => Some(NumericKind::UInt64),
            TypeDescriptor::Enum { underlying, .. } => underlying.numeric_kind(),
            TypeDescriptor::Nullable(inner) => inner.numeric_kind(),
            _ => None,
        }
    }
}

impl From<NumericKind> for TypeDescriptor {
    fn from(kind: NumericKind) -> Self {
        match kind {
            NumericKind::Int8 => TypeDescriptor::Int8,
            NumericKind::UInt8 => TypeDescriptor::UInt8,
            NumericKind::Int16 => TypeDescriptor::Int16,
            NumericKind::UInt16 => TypeDescriptor::UInt16,
            NumericKind::Int32 => TypeDescriptor::Int32,
            NumericKind::UInt32 => TypeDescriptor::UInt32,
            NumericKind::Int64 => TypeDescriptor::Int64,
            NumericKind::UInt64 => TypeDescriptor::UInt64,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Int8 => f.write_str("Int8"),
            TypeDescriptor::UInt8 => f.write_str("UInt8"),
            TypeDescriptor::Int16 => f.write_str("Int16"),
            TypeDescriptor::UInt16 => f.write_str("UInt16"),
            TypeDescriptor::Int32 => f.write_str("Int32"),
            TypeDescriptor::UInt32 => f.write_str("UInt32"),
            TypeDescriptor::Int64 => f.write_str("Int64"),
            TypeDescriptor::UInt64 => f.write_str("UInt64"),
            TypeDescriptor::Bool => f.write_str("Bool"),
            TypeDescriptor::Char => f.write_str("Char"),
            TypeDescriptor::Float32 => f.write_str("Float32"),
            TypeDescriptor::Float64 => f.write_str("Float64"),
            TypeDescriptor::Decimal => f.write_str("Decimal"),
            TypeDescriptor::String => f.write_str("String"),
            TypeDescriptor::Object(name) => f.write_str(name),
            TypeDescriptor::Enum { name, underlying } => write!(f, "enum {} : {}", name, underlying),
            TypeDescriptor::Nullable(inner) => write!(f, "Nullable<{}>", inner),
        }
    }
}

/// A present integer operand: its kind plus raw bits.
///
/// Signed values are stored sign-extended to 64 bits, unsigned values zero-extended,
/// so two scalars of the same kind and value always compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawScalar")]
pub struct Scalar {
    kind: NumericKind,
    bits: u64,
}

// Wire form of Scalar; deserialized bits are re-extended through from_bits.
#[derive(Deserialize)]
struct RawScalar {
    kind: NumericKind,
    bits: u64,
}

impl From<RawScalar> for Scalar {
    fn from(raw: RawScalar) -> Self {
        Scalar::from_bits(raw.kind, raw.bits)
    }
}

impl Scalar {
    pub fn kind(&self) -> NumericKind {
        self.kind
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Builds a scalar of `kind` from raw bits, truncating and re-extending them
    /// to the kind's width.
    pub fn from_bits(kind: NumericKind, bits: u64) -> Self {
        let bits = match kind {
            NumericKind::Int8 => bits as i8 as i64 as u64,
            NumericKind::UInt8 => bits as u8 as u64,
            NumericKind::Int16 => bits as i16 as i64 as u64,
            NumericKind::UInt16 => bits as u16 as u64,
            NumericKind::Int32 => bits as i32 as i64 as u64,
            NumericKind::UInt32 => bits as u32 as u64,
            NumericKind::Int64 | NumericKind::UInt64 => bits,
        };
        Self { kind, bits }
    }

    pub fn from_i8(v: i8) -> Self { Self::from_bits(NumericKind::Int8, v as u64) }
    pub fn from_u8(v: u8) -> Self { Self::from_bits(NumericKind::UInt8, v as u64) }
    pub fn from_i16(v: i16) -> Self { Self::from_bits(NumericKind::Int16, v as u64) }
    pub fn from_u16(v: u16) -> Self { Self::from_bits(NumericKind::UInt16, v as u64) }
    pub fn from_i32(v: i32) -> Self { Self::from_bits(NumericKind::Int32, v as u64) }
    pub fn from_u32(v: u32) -> Self { Self::from_bits(NumericKind::UInt32, v as u64) }
    pub fn from_i64(v: i64) -> Self { Self::from_bits(NumericKind::Int64, v as u64) }
    pub fn from_u64(v: u64) -> Self { Self::from_bits(NumericKind::UInt64, v) }

    pub fn as_i8(&self) -> i8 { self.bits as i8 }
    pub fn as_u8(&self) -> u8 { self.bits as u8 }
    pub fn as_i16(&self) -> i16 { self.bits as i16 }
    pub fn as_u16(&self) -> u16 { self.bits as u16 }
    pub fn as_i32(&self) -> i32 { self.bits as i32 }
    pub fn as_u32(&self) -> u32 { self.bits as u32 }
    pub fn as_i64(&self) -> i64 { self.bits as i64 }
    pub fn as_u64(&self) -> u64 { self.bits }

    /// Reads the low 32 bits as a signed shift count.
    pub fn shift_count(&self) -> i32 {
        self.bits as i32
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_signed() {
            write!(f, "{}", self.as_i64())
        } else {
            write!(f, "{}", self.as_u64())
        }
    }
}

/// A value on the operand stack. Absent is the interpreted language's null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperandValue {
    #[default]
    Absent,
    Present(Scalar),
}

impl OperandValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, OperandValue::Absent)
    }

    pub fn scalar(&self) -> Option<Scalar> {
        match self {
            OperandValue::Present(s) => Some(*s),
            OperandValue::Absent => None,
        }
    }

    pub fn kind(&self) -> Option<NumericKind> {
        self.scalar().map(|s| s.kind())
    }
}

impl From<Scalar> for OperandValue {
    fn from(s: Scalar) -> Self {
        OperandValue::Present(s)
    }
}

impl<T: Into<OperandValue>> From<Option<T>> for OperandValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(OperandValue::Absent, Into::into)
    }
}

macro_rules! operand_from_native {
    ($( $ty:ty => $ctor:ident ),* $(,)?) => {
        $(
            impl From<$ty> for OperandValue {
                fn from(v: $ty) -> Self {
                    OperandValue::Present(Scalar::$ctor(v))
                }
            }
        )*
    };
}

operand_from_native! {
    i8 => from_i8,
    u8 => from_u8,
    i16 => from_i16,
    u16 => from_u16,
    i32 => from_i32,
    u32 => from_u32,
    i64 => from_i64,
    u64 => from_u64,
}

impl fmt::Display for OperandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperandValue::Absent => f.write_str("null"),
            OperandValue::Present(s) => write!(f, "{}", s),
        }
    }
}
