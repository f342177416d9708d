use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use bigdecimal::BigDecimal;

/// Values that can be read from a record or bound as statement parameters.
///
/// The same enum is used for both directions so host code never branches on
/// driver types:
/// ```rust
/// use sql_connector::prelude::*;
///
/// let params = vec![
///     Value::I32(1),
///     Value::from("alice"),
///     Value::Bool(true),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    Float(f32),
    Double(f64),
    /// Exact decimal of any precision, never routed through a float
    Decimal(BigDecimal),
    /// Text; embedded NUL bytes are kept
    String(String),
    /// Binary data
    Blob(Vec<u8>),
    /// Fixed-width bit field
    Bit(BitSet),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "BOOL",
            Value::I8(_) => "I8",
            Value::U8(_) => "U8",
            Value::I16(_) => "I16",
            Value::U16(_) => "U16",
            Value::I32(_) => "I32",
            Value::U32(_) => "U32",
            Value::I64(_) => "I64",
            Value::U64(_) => "U64",
            Value::Float(_) => "FLOAT",
            Value::Double(_) => "DOUBLE",
            Value::Decimal(_) => "DECIMAL",
            Value::String(_) => "STRING",
            Value::Blob(_) => "BLOB",
            Value::Bit(_) => "BIT",
            Value::Date(_) => "DATE",
            Value::Time(_) => "TIME",
            Value::DateTime(_) => "DATETIME",
        }
    }

    /// Any signed integer variant widened to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            Value::U8(v) => Some(i64::from(*v)),
            Value::U16(v) => Some(i64::from(*v)),
            Value::U32(v) => Some(i64::from(*v)),
            Value::U64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Any unsigned integer variant widened to `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(v) => Some(u64::from(*v)),
            Value::U16(v) => Some(u64::from(*v)),
            Value::U32(v) => Some(u64::from(*v)),
            Value::U64(v) => Some(*v),
            Value::Bit(bits) => Some(bits.value()),
            other => other.as_i64().and_then(|v| u64::try_from(v).ok()),
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::String(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let Value::Bool(value) = self {
            return Some(*value);
        }
        match self.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(value) => Some(*value),
            Value::Float(value) => Some(f64::from(*value)),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        if let Value::Decimal(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let Value::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(value) => Some(*value),
            Value::Date(date) => date.and_hms_opt(0, 0, 0),
            _ => None,
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_for_value!(
    bool => Bool,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => Float,
    f64 => Double,
    BigDecimal => Decimal,
    String => String,
    Vec<u8> => Blob,
    BitSet => Bit,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A bit field of 1 to 64 bits.
///
/// Bit `0` is the least significant bit. Bits above `width` are always zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitSet {
    width: u8,
    bits: u64,
}

impl BitSet {
    pub const MAX_WIDTH: u8 = 64;

    /// Build a bit set of `width` bits from the low bits of `value`.
    ///
    /// Returns `None` when `width` is zero or larger than 64.
    #[must_use]
    pub fn new(width: u8, value: u64) -> Option<Self> {
        if width == 0 || width > Self::MAX_WIDTH {
            return None;
        }
        Some(Self {
            width,
            bits: value & Self::mask(width),
        })
    }

    fn mask(width: u8) -> u64 {
        if width == Self::MAX_WIDTH {
            u64::MAX
        } else {
            (1u64 << width) - 1
        }
    }

    #[must_use]
    pub fn width(&self) -> u8 {
        self.width
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.bits
    }

    /// State of bit `index`; `None` past the width.
    #[must_use]
    pub fn get(&self, index: u8) -> Option<bool> {
        (index < self.width).then(|| (self.bits >> index) & 1 == 1)
    }

    /// Number of bytes needed to hold `width` bits.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        usize::from(self.width).div_ceil(8)
    }

    /// Big-endian bytes, `byte_len()` long, as the server sends BIT columns.
    #[must_use]
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let all = self.bits.to_be_bytes();
        all[all.len() - self.byte_len()..].to_vec()
    }
}

impl fmt::Debug for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitSet({self})")
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = usize::from(self.width))
    }
}

/// Direction of a bound statement parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamDirection {
    #[default]
    In,
    Out,
    InOut,
}

impl ParamDirection {
    #[must_use]
    pub fn is_input(self) -> bool {
        matches!(self, ParamDirection::In | ParamDirection::InOut)
    }

    #[must_use]
    pub fn is_output(self) -> bool {
        matches!(self, ParamDirection::Out | ParamDirection::InOut)
    }
}

/// A value tagged with its parameter direction, as passed to `add_bind_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct BindValue {
    pub value: Value,
    pub direction: ParamDirection,
}

impl BindValue {
    #[must_use]
    pub fn new(value: impl Into<Value>, direction: ParamDirection) -> Self {
        Self {
            value: value.into(),
            direction,
        }
    }

    #[must_use]
    pub fn input(value: impl Into<Value>) -> Self {
        Self::new(value, ParamDirection::In)
    }

    #[must_use]
    pub fn output(value: impl Into<Value>) -> Self {
        Self::new(value, ParamDirection::Out)
    }

    #[must_use]
    pub fn in_out(value: impl Into<Value>) -> Self {
        Self::new(value, ParamDirection::InOut)
    }
}
