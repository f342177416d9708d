//! Conversions between wire cells and [`Value`].
//!
//! Result rows arrive in text form and go through [`decode_text`]. Statement
//! parameters leave as [`BindDescriptor`]s built by [`encode`]; their buffers use
//! the binary protocol layout (little-endian fixed-width numbers), which
//! [`decode_bound`] reads back.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use bigdecimal::BigDecimal;

use super::field::{FieldMeta, FieldType};
use crate::error::ConnectorError;
use crate::types::{BitSet, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Native description of one statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindDescriptor {
    pub buffer_type: FieldType,
    pub is_unsigned: bool,
    pub is_null: bool,
    /// Bit width for BIT parameters, buffer length otherwise.
    pub length: u32,
    buffer: Vec<u8>,
}

impl BindDescriptor {
    fn new(buffer_type: FieldType, buffer: Vec<u8>) -> Self {
        let length = u32::try_from(buffer.len()).unwrap_or(u32::MAX);
        Self {
            buffer_type,
            is_unsigned: false,
            is_null: false,
            length,
            buffer,
        }
    }

    fn unsigned(mut self) -> Self {
        self.is_unsigned = true;
        self
    }

    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    #[must_use]
    pub fn buffer_length(&self) -> usize {
        self.buffer.len()
    }

    /// Metadata of a column carrying this parameter's type.
    #[must_use]
    pub fn column(&self) -> FieldMeta {
        FieldMeta::new("?", self.buffer_type)
            .with_unsigned(self.is_unsigned)
            .with_binary(is_blob(self.buffer_type))
            .with_length(self.length)
    }
}

fn is_blob(field_type: FieldType) -> bool {
    matches!(
        field_type,
        FieldType::TinyBlob | FieldType::MediumBlob | FieldType::LongBlob | FieldType::Blob
    )
}

/// Build the bind descriptor for one input parameter.
#[must_use]
pub fn encode(value: &Value) -> BindDescriptor {
    match value {
        Value::Null => {
            let mut desc = BindDescriptor::new(FieldType::Null, Vec::new());
            desc.is_null = true;
            desc
        }
        Value::Bool(b) => BindDescriptor::new(FieldType::Tiny, vec![u8::from(*b)]),
        Value::I8(v) => BindDescriptor::new(FieldType::Tiny, v.to_le_bytes().to_vec()),
        Value::U8(v) => BindDescriptor::new(FieldType::Tiny, v.to_le_bytes().to_vec()).unsigned(),
        Value::I16(v) => BindDescriptor::new(FieldType::Short, v.to_le_bytes().to_vec()),
        Value::U16(v) => {
            BindDescriptor::new(FieldType::Short, v.to_le_bytes().to_vec()).unsigned()
        }
        Value::I32(v) => BindDescriptor::new(FieldType::Long, v.to_le_bytes().to_vec()),
        Value::U32(v) => BindDescriptor::new(FieldType::Long, v.to_le_bytes().to_vec()).unsigned(),
        Value::I64(v) => BindDescriptor::new(FieldType::LongLong, v.to_le_bytes().to_vec()),
        Value::U64(v) => {
            BindDescriptor::new(FieldType::LongLong, v.to_le_bytes().to_vec()).unsigned()
        }
        Value::Float(v) => BindDescriptor::new(FieldType::Float, v.to_le_bytes().to_vec()),
        Value::Double(v) => BindDescriptor::new(FieldType::Double, v.to_le_bytes().to_vec()),
        // Plain digits: Display switches to exponent form for small scales.
        Value::Decimal(d) => {
            BindDescriptor::new(FieldType::NewDecimal, d.to_plain_string().into_bytes())
        }
        Value::String(s) => BindDescriptor::new(FieldType::VarString, s.as_bytes().to_vec()),
        Value::Blob(bytes) => BindDescriptor::new(FieldType::Blob, bytes.clone()),
        Value::Bit(bits) => {
            let mut desc = BindDescriptor::new(FieldType::Bit, bits.to_be_bytes()).unsigned();
            desc.length = u32::from(bits.width());
            desc
        }
        Value::Date(d) => {
            BindDescriptor::new(FieldType::Date, d.format(DATE_FORMAT).to_string().into_bytes())
        }
        Value::Time(t) => {
            BindDescriptor::new(FieldType::Time, t.format(TIME_FORMAT).to_string().into_bytes())
        }
        Value::DateTime(dt) => BindDescriptor::new(
            FieldType::DateTime,
            dt.format(DATETIME_FORMAT).to_string().into_bytes(),
        ),
    }
}

/// Encode every input parameter, in order.
#[must_use]
pub fn encode_all(values: &[Value]) -> Vec<BindDescriptor> {
    values.iter().map(encode).collect()
}

/// Read a bound parameter back into a [`Value`].
///
/// # Errors
/// Returns `ConnectorError::Decode` when a fixed-width buffer has the wrong size,
/// and any error of [`decode_text`] for text-carried types.
pub fn decode_bound(desc: &BindDescriptor) -> Result<Value, ConnectorError> {
    if desc.is_null {
        return Ok(Value::Null);
    }
    let field = desc.column();
    let bytes = desc.buffer();
    let value = match (desc.buffer_type, desc.is_unsigned) {
        (FieldType::Tiny, false) => Value::I8(i8::from_le_bytes(fixed(&field, bytes)?)),
        (FieldType::Tiny, true) => Value::U8(u8::from_le_bytes(fixed(&field, bytes)?)),
        (FieldType::Short, false) => Value::I16(i16::from_le_bytes(fixed(&field, bytes)?)),
        (FieldType::Short, true) => Value::U16(u16::from_le_bytes(fixed(&field, bytes)?)),
        (FieldType::Long | FieldType::Int24, false) => {
            Value::I32(i32::from_le_bytes(fixed(&field, bytes)?))
        }
        (FieldType::Long | FieldType::Int24, true) => {
            Value::U32(u32::from_le_bytes(fixed(&field, bytes)?))
        }
        (FieldType::LongLong, false) => Value::I64(i64::from_le_bytes(fixed(&field, bytes)?)),
        (FieldType::LongLong, true) => Value::U64(u64::from_le_bytes(fixed(&field, bytes)?)),
        (FieldType::Float, _) => Value::Float(f32::from_le_bytes(fixed(&field, bytes)?)),
        (FieldType::Double, _) => Value::Double(f64::from_le_bytes(fixed(&field, bytes)?)),
        _ => decode_text(&field, Some(bytes))?,
    };
    Ok(value)
}

fn fixed<const N: usize>(field: &FieldMeta, bytes: &[u8]) -> Result<[u8; N], ConnectorError> {
    bytes.try_into().map_err(|_| {
        ConnectorError::decode(
            &field.name,
            format!(
                "expected {N} byte(s) for {:?}, found {}",
                field.field_type,
                bytes.len()
            ),
        )
    })
}

/// Decode one text-protocol cell according to its column metadata.
///
/// `raw` is `None` for SQL NULL. Column types the codec has no mapping for are
/// rejected even when the cell is NULL.
///
/// # Errors
/// Returns `ConnectorError::UnsupportedColumnType` for unmapped types and
/// `ConnectorError::Decode` when the text does not parse as the declared type.
pub fn decode_text(field: &FieldMeta, raw: Option<&[u8]>) -> Result<Value, ConnectorError> {
    tracing::trace!(
        column = %field.name,
        field_type = ?field.field_type,
        unsigned = field.unsigned,
        len = raw.map(<[u8]>::len),
        "decoding column"
    );

    if !is_supported(field.field_type) {
        return Err(ConnectorError::UnsupportedColumnType {
            column: field.name.clone(),
            field_type: field.field_type,
        });
    }
    let Some(raw) = raw else {
        return Ok(Value::Null);
    };

    let value = match field.field_type {
        FieldType::Tiny if field.unsigned => Value::U8(parse(field, raw)?),
        FieldType::Tiny => Value::I8(parse(field, raw)?),
        FieldType::Short if field.unsigned => Value::U16(parse(field, raw)?),
        FieldType::Short => Value::I16(parse(field, raw)?),
        FieldType::Long | FieldType::Int24 if field.unsigned => Value::U32(parse(field, raw)?),
        FieldType::Long | FieldType::Int24 => Value::I32(parse(field, raw)?),
        FieldType::LongLong if field.unsigned => Value::U64(parse(field, raw)?),
        FieldType::LongLong => Value::I64(parse(field, raw)?),
        FieldType::Float => Value::Float(parse(field, raw)?),
        FieldType::Double => Value::Double(parse(field, raw)?),
        FieldType::Decimal | FieldType::NewDecimal => {
            let text = as_str(field, raw)?;
            let decimal = BigDecimal::from_str(text).map_err(|e| {
                ConnectorError::decode(&field.name, format!("invalid decimal `{text}`: {e}"))
            })?;
            Value::Decimal(decimal)
        }
        FieldType::Date => {
            let text = as_str(field, raw)?;
            Value::Date(NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
                ConnectorError::decode(&field.name, format!("invalid date `{text}`: {e}"))
            })?)
        }
        FieldType::Time => {
            let text = as_str(field, raw)?;
            Value::Time(NaiveTime::parse_from_str(text, TIME_FORMAT).map_err(|e| {
                ConnectorError::decode(&field.name, format!("invalid time `{text}`: {e}"))
            })?)
        }
        FieldType::DateTime | FieldType::Timestamp => {
            let text = as_str(field, raw)?;
            Value::DateTime(
                NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|e| {
                    ConnectorError::decode(&field.name, format!("invalid datetime `{text}`: {e}"))
                })?,
            )
        }
        FieldType::Bit => Value::Bit(decode_bits(field, raw)?),
        FieldType::TinyBlob | FieldType::MediumBlob | FieldType::LongBlob | FieldType::Blob
            if field.binary =>
        {
            Value::Blob(raw.to_vec())
        }
        _ => Value::String(String::from_utf8(raw.to_vec()).map_err(|e| {
            ConnectorError::decode(&field.name, format!("text is not valid UTF-8: {e}"))
        })?),
    };
    Ok(value)
}

fn is_supported(field_type: FieldType) -> bool {
    !matches!(
        field_type,
        FieldType::Null
            | FieldType::Year
            | FieldType::NewDate
            | FieldType::Timestamp2
            | FieldType::DateTime2
            | FieldType::Time2
            | FieldType::Json
            | FieldType::Enum
            | FieldType::Set
            | FieldType::Geometry
            | FieldType::Other(_)
    )
}

fn as_str<'a>(field: &FieldMeta, raw: &'a [u8]) -> Result<&'a str, ConnectorError> {
    std::str::from_utf8(raw)
        .map_err(|e| ConnectorError::decode(&field.name, format!("text is not valid UTF-8: {e}")))
}

fn parse<T>(field: &FieldMeta, raw: &[u8]) -> Result<T, ConnectorError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = as_str(field, raw)?;
    text.parse::<T>().map_err(|e| {
        ConnectorError::decode(
            &field.name,
            format!("invalid {:?} value `{text}`: {e}", field.field_type),
        )
    })
}

/// BIT cells are raw big-endian bytes, not text.
fn decode_bits(field: &FieldMeta, raw: &[u8]) -> Result<BitSet, ConnectorError> {
    if raw.len() > 8 {
        return Err(ConnectorError::decode(
            &field.name,
            format!("BIT value of {} bytes exceeds 64 bits", raw.len()),
        ));
    }
    let value = raw
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    let width = match u8::try_from(field.length) {
        Ok(width) if (1..=BitSet::MAX_WIDTH).contains(&width) => width,
        // No usable declared width; fall back to the bytes received.
        _ => u8::try_from(raw.len() * 8).unwrap_or(BitSet::MAX_WIDTH),
    };
    BitSet::new(width, value)
        .ok_or_else(|| ConnectorError::decode(&field.name, "BIT value has no bits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(field_type: FieldType) -> FieldMeta {
        FieldMeta::new("c", field_type)
    }

    #[test]
    fn decodes_integers_by_width_and_sign() {
        assert_eq!(decode_text(&col(FieldType::Tiny), Some(b"-12")).unwrap(), Value::I8(-12));
        assert_eq!(
            decode_text(&col(FieldType::Tiny).with_unsigned(true), Some(b"250")).unwrap(),
            Value::U8(250)
        );
        assert_eq!(
            decode_text(&col(FieldType::Int24), Some(b"8388607")).unwrap(),
            Value::I32(8_388_607)
        );
        assert_eq!(
            decode_text(&col(FieldType::LongLong).with_unsigned(true), Some(b"18446744073709551615"))
                .unwrap(),
            Value::U64(u64::MAX)
        );
    }

    #[test]
    fn integer_overflow_is_a_decode_error() {
        let err = decode_text(&col(FieldType::Tiny), Some(b"300")).unwrap_err();
        assert!(matches!(err, ConnectorError::Decode { .. }));
    }

    #[test]
    fn decimal_keeps_exact_digits() {
        let value = decode_text(&col(FieldType::NewDecimal), Some(b"12345.678900")).unwrap();
        assert_eq!(value, Value::Decimal(BigDecimal::from_str("12345.678900").unwrap()));
        assert_eq!(value.as_decimal().unwrap().to_plain_string(), "12345.678900");
    }

    #[test]
    fn decimal_keeps_full_server_precision() {
        // DECIMAL(65,30) extremes plus values past 28 significant digits.
        let cases = [
            "12345678901234567890.123456789012",
            "0.000000000000000000000000000001",
            "-99999999999999999999999999999999999.999999999999999999999999999999",
        ];
        for text in cases {
            let value = decode_text(&col(FieldType::NewDecimal), Some(text.as_bytes())).unwrap();
            assert_eq!(value.as_decimal().unwrap().to_plain_string(), text);

            let desc = encode(&value);
            assert_eq!(desc.buffer(), text.as_bytes());
            assert_eq!(decode_bound(&desc).unwrap(), value);
        }
    }

    #[test]
    fn malformed_decimal_is_a_decode_error() {
        let err = decode_text(&col(FieldType::NewDecimal), Some(b"12.3.4")).unwrap_err();
        assert!(matches!(err, ConnectorError::Decode { .. }));
    }

    #[test]
    fn strings_keep_embedded_nul() {
        let value = decode_text(&col(FieldType::VarString), Some(b"a\0b")).unwrap();
        assert_eq!(value, Value::String("a\0b".to_string()));
        assert_eq!(value.as_text().unwrap().len(), 3);
    }

    #[test]
    fn blob_family_splits_on_binary_flag() {
        let text = decode_text(&col(FieldType::Blob), Some(b"hello")).unwrap();
        assert_eq!(text, Value::from("hello"));
        let bytes = decode_text(&col(FieldType::Blob).with_binary(true), Some(&[0xFF, 0x00])).unwrap();
        assert_eq!(bytes, Value::Blob(vec![0xFF, 0x00]));
    }

    #[test]
    fn bits_accumulate_big_endian() {
        let field = col(FieldType::Bit).with_length(12);
        let value = decode_text(&field, Some(&[0x0A, 0xBC])).unwrap();
        assert_eq!(value, Value::Bit(BitSet::new(12, 0x0ABC).unwrap()));

        let value = decode_text(&col(FieldType::Bit), Some(&[0x01, 0x00])).unwrap();
        assert_eq!(value, Value::Bit(BitSet::new(16, 0x0100).unwrap()));
    }

    #[test]
    fn dates_and_times_use_fixed_patterns() {
        assert_eq!(
            decode_text(&col(FieldType::Date), Some(b"2024-02-29")).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(
            decode_text(&col(FieldType::Time), Some(b"13:45:07")).unwrap(),
            Value::Time(NaiveTime::from_hms_opt(13, 45, 7).unwrap())
        );
        let expected = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 58)
            .unwrap();
        assert_eq!(
            decode_text(&col(FieldType::DateTime), Some(b"2023-12-31 23:59:58")).unwrap(),
            Value::DateTime(expected)
        );
        assert_eq!(
            decode_text(&col(FieldType::Timestamp), Some(b"2023-12-31 23:59:58")).unwrap(),
            Value::DateTime(expected)
        );
        assert!(decode_text(&col(FieldType::Date), Some(b"0000-00-00")).is_err());
    }

    #[test]
    fn unmapped_types_are_fatal() {
        for field_type in [
            FieldType::Json,
            FieldType::Set,
            FieldType::Enum,
            FieldType::Geometry,
            FieldType::Year,
            FieldType::Null,
            FieldType::DateTime2,
        ] {
            let err = decode_text(&col(field_type), Some(b"1")).unwrap_err();
            assert!(
                matches!(err, ConnectorError::UnsupportedColumnType { field_type: t, .. } if t == field_type)
            );
        }
        assert!(decode_text(&col(FieldType::Json), None).is_err());
    }

    #[test]
    fn null_cells_decode_to_null() {
        assert_eq!(decode_text(&col(FieldType::Long), None).unwrap(), Value::Null);
    }

    #[test]
    fn encode_sets_type_sign_and_length() {
        let desc = encode(&Value::U16(513));
        assert_eq!(desc.buffer_type, FieldType::Short);
        assert!(desc.is_unsigned);
        assert_eq!(desc.buffer(), &[0x01, 0x02]);
        assert_eq!(desc.buffer_length(), 2);

        let desc = encode(&Value::I64(-1));
        assert_eq!(desc.buffer_type, FieldType::LongLong);
        assert!(!desc.is_unsigned);
        assert_eq!(desc.buffer_length(), 8);

        let desc = encode(&Value::Null);
        assert!(desc.is_null);
        assert_eq!(desc.buffer_type, FieldType::Null);
    }

    #[test]
    fn blob_parameters_carry_their_bytes() {
        let desc = encode(&Value::Blob(vec![1, 2, 3, 0]));
        assert_eq!(desc.buffer_type, FieldType::Blob);
        assert_eq!(desc.buffer(), &[1, 2, 3, 0]);
        assert_eq!(decode_bound(&desc).unwrap(), Value::Blob(vec![1, 2, 3, 0]));
    }

    #[test]
    fn bound_buffer_of_wrong_size_is_rejected() {
        let mut desc = encode(&Value::I32(1));
        desc.buffer_type = FieldType::LongLong;
        assert!(matches!(decode_bound(&desc), Err(ConnectorError::Decode { .. })));
    }

    #[test]
    fn bool_binds_as_tiny() {
        let desc = encode(&Value::Bool(true));
        assert_eq!(desc.buffer_type, FieldType::Tiny);
        assert_eq!(decode_bound(&desc).unwrap(), Value::I8(1));
    }
}
