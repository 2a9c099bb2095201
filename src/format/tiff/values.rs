//! Typed tag values and their binary encoding.
//!
//! Every directory entry decodes into an [`AttributeValue`] whose variant is
//! the entry's field type. Values are decoded from and encoded to the byte
//! order of the Exif payload they belong to.

use std::fmt;

use crate::error::ExifError;
use crate::io::{ByteOrder, ByteReader, ByteWriter};

use super::tags::FieldType;

// =============================================================================
// Rational
// =============================================================================

/// A fraction stored as two integers.
///
/// A zero denominator is normalized to `0/1` on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub numerator: i64,
    pub denominator: i64,
}

impl Rational {
    pub fn new(numerator: i64, denominator: i64) -> Self {
        if denominator == 0 {
            Self {
                numerator: 0,
                denominator: 1,
            }
        } else {
            Self {
                numerator,
                denominator,
            }
        }
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Parse the `numerator/denominator` form.
    pub fn parse(s: &str) -> Option<Self> {
        let (numerator, denominator) = s.split_once('/')?;
        let numerator = numerator.trim().parse::<i64>().ok()?;
        let denominator = denominator.trim().parse::<i64>().ok()?;
        Some(Self::new(numerator, denominator))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

// =============================================================================
// AttributeValue
// =============================================================================

/// A decoded tag value. The variant doubles as the format discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Byte(Vec<u8>),
    /// Text without its NUL terminator.
    Ascii(String),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<Rational>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<Rational>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

/// Character code prefix of Exif text stored as UNDEFINED (e.g. UserComment).
const ASCII_CHARACTER_CODE: &[u8; 8] = b"ASCII\0\0\0";

impl AttributeValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            AttributeValue::Byte(_) => FieldType::Byte,
            AttributeValue::Ascii(_) => FieldType::Ascii,
            AttributeValue::Short(_) => FieldType::Short,
            AttributeValue::Long(_) => FieldType::Long,
            AttributeValue::Rational(_) => FieldType::Rational,
            AttributeValue::SByte(_) => FieldType::SByte,
            AttributeValue::Undefined(_) => FieldType::Undefined,
            AttributeValue::SShort(_) => FieldType::SShort,
            AttributeValue::SLong(_) => FieldType::SLong,
            AttributeValue::SRational(_) => FieldType::SRational,
            AttributeValue::Float(_) => FieldType::Float,
            AttributeValue::Double(_) => FieldType::Double,
        }
    }

    /// Number of components as written in the entry's count field.
    ///
    /// ASCII counts its NUL terminator.
    pub fn component_count(&self) -> usize {
        match self {
            AttributeValue::Byte(v) | AttributeValue::Undefined(v) => v.len(),
            AttributeValue::Ascii(s) => s.len() + 1,
            AttributeValue::Short(v) => v.len(),
            AttributeValue::Long(v) => v.len(),
            AttributeValue::Rational(v) | AttributeValue::SRational(v) => v.len(),
            AttributeValue::SByte(v) => v.len(),
            AttributeValue::SShort(v) => v.len(),
            AttributeValue::SLong(v) => v.len(),
            AttributeValue::Float(v) => v.len(),
            AttributeValue::Double(v) => v.len(),
        }
    }

    /// Encoded size in bytes.
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.component_count() * self.field_type().size_in_bytes()
    }

    /// Whether the value spills out of the entry into the overflow area.
    #[inline]
    pub fn needs_overflow(&self) -> bool {
        self.size_in_bytes() > FieldType::INLINE_THRESHOLD
    }

    /// Decode `count` components of `field_type` from the start of `bytes`.
    pub fn decode(
        field_type: FieldType,
        count: usize,
        bytes: &[u8],
        byte_order: ByteOrder,
    ) -> Result<Self, ExifError> {
        let mut reader = ByteReader::new(bytes, byte_order);

        macro_rules! read_vec {
            ($read:ident) => {{
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    values.push(reader.$read()?);
                }
                values
            }};
        }

        let value = match field_type {
            FieldType::Byte => AttributeValue::Byte(reader.read_bytes(count)?.to_vec()),
            FieldType::Undefined => AttributeValue::Undefined(reader.read_bytes(count)?.to_vec()),
            FieldType::Ascii => {
                let raw = reader.read_bytes(count)?;
                let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
                AttributeValue::Ascii(String::from_utf8_lossy(&raw[..end]).into_owned())
            }
            FieldType::Short => AttributeValue::Short(read_vec!(read_u16)),
            FieldType::Long => AttributeValue::Long(read_vec!(read_u32)),
            FieldType::SByte => AttributeValue::SByte(read_vec!(read_i8)),
            FieldType::SShort => AttributeValue::SShort(read_vec!(read_i16)),
            FieldType::SLong => AttributeValue::SLong(read_vec!(read_i32)),
            FieldType::Float => AttributeValue::Float(read_vec!(read_f32)),
            FieldType::Double => AttributeValue::Double(read_vec!(read_f64)),
            FieldType::Rational => {
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    let numerator = reader.read_u32()?;
                    let denominator = reader.read_u32()?;
                    values.push(Rational::new(numerator as i64, denominator as i64));
                }
                AttributeValue::Rational(values)
            }
            FieldType::SRational => {
                let mut values = Vec::with_capacity(count);
                for _ in 0..count {
                    let numerator = reader.read_i32()?;
                    let denominator = reader.read_i32()?;
                    values.push(Rational::new(numerator as i64, denominator as i64));
                }
                AttributeValue::SRational(values)
            }
        };

        Ok(value)
    }

    /// Encode into the writer's byte order.
    pub fn encode_into(&self, writer: &mut ByteWriter) {
        match self {
            AttributeValue::Byte(v) | AttributeValue::Undefined(v) => writer.write_bytes(v),
            AttributeValue::Ascii(s) => {
                writer.write_bytes(s.as_bytes());
                writer.write_u8(0);
            }
            AttributeValue::Short(v) => v.iter().for_each(|&x| writer.write_u16(x)),
            AttributeValue::Long(v) => v.iter().for_each(|&x| writer.write_u32(x)),
            AttributeValue::SByte(v) => v.iter().for_each(|&x| writer.write_i8(x)),
            AttributeValue::SShort(v) => v.iter().for_each(|&x| writer.write_i16(x)),
            AttributeValue::SLong(v) => v.iter().for_each(|&x| writer.write_i32(x)),
            AttributeValue::Float(v) => v.iter().for_each(|&x| writer.write_f32(x)),
            AttributeValue::Double(v) => v.iter().for_each(|&x| writer.write_f64(x)),
            AttributeValue::Rational(v) => {
                for r in v {
                    writer.write_u32(r.numerator as u32);
                    writer.write_u32(r.denominator as u32);
                }
            }
            AttributeValue::SRational(v) => {
                for r in v {
                    writer.write_i32(r.numerator as i32);
                    writer.write_i32(r.denominator as i32);
                }
            }
        }
    }

    /// Encode into a fresh buffer.
    pub fn encode(&self, byte_order: ByteOrder) -> Vec<u8> {
        let mut writer = ByteWriter::with_capacity(byte_order, self.size_in_bytes());
        self.encode_into(&mut writer);
        writer.into_inner()
    }

    /// The public string form of the value.
    pub fn to_display_string(&self) -> String {
        match self {
            AttributeValue::Ascii(s) => s.clone(),
            AttributeValue::Undefined(v) => undefined_to_text(v),
            AttributeValue::Byte(v) => join(v),
            AttributeValue::Short(v) => join(v),
            AttributeValue::Long(v) => join(v),
            AttributeValue::SByte(v) => join(v),
            AttributeValue::SShort(v) => join(v),
            AttributeValue::SLong(v) => join(v),
            AttributeValue::Rational(v) | AttributeValue::SRational(v) => join(v),
            AttributeValue::Float(v) => v
                .iter()
                .map(|&x| format_decimal(x as f64))
                .collect::<Vec<_>>()
                .join(","),
            AttributeValue::Double(v) => v
                .iter()
                .map(|&x| format_decimal(x))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Integer view of a single-component value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Ascii(s) => s.trim().parse().ok(),
            AttributeValue::Byte(v) | AttributeValue::Undefined(v) => single(v).map(i64::from),
            AttributeValue::Short(v) => single(v).map(i64::from),
            AttributeValue::Long(v) => single(v).map(i64::from),
            AttributeValue::SByte(v) => single(v).map(i64::from),
            AttributeValue::SShort(v) => single(v).map(i64::from),
            AttributeValue::SLong(v) => single(v).map(i64::from),
            AttributeValue::Rational(_)
            | AttributeValue::SRational(_)
            | AttributeValue::Float(_)
            | AttributeValue::Double(_) => None,
        }
    }

    /// Floating point view of a single-component value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Ascii(s) => s.trim().parse().ok(),
            AttributeValue::Rational(v) | AttributeValue::SRational(v) => {
                single(v).map(Rational::to_f64)
            }
            AttributeValue::Float(v) => single(v).map(f64::from),
            AttributeValue::Double(v) => single(v),
            _ => self.as_i64().map(|x| x as f64),
        }
    }

    /// Rational components, if this is a rational-typed value.
    pub fn as_rationals(&self) -> Option<&[Rational]> {
        match self {
            AttributeValue::Rational(v) | AttributeValue::SRational(v) => Some(v),
            _ => None,
        }
    }
}

fn single<T: Copy>(values: &[T]) -> Option<T> {
    match values {
        [value] => Some(*value),
        _ => None,
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a float so integral values keep a trailing `.0`.
pub(crate) fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn undefined_to_text(bytes: &[u8]) -> String {
    let body = bytes.strip_prefix(ASCII_CHARACTER_CODE).unwrap_or(bytes);
    body.iter()
        .take_while(|&&b| b != 0)
        .map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '?' })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
