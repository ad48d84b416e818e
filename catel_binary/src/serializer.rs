// Copyright 2025 the Catel Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The binary codec.
//!
//! # Format
//!
//! Little-endian, no header, no type tags, no field names:
//!
//! ```text
//! null         i32 len = 4 | "NuLl"
//! i16 / i32 / i64          2 / 4 / 8 bytes
//! char         u16 (one UTF-16 code unit)
//! bool         i16, 1 or 0
//! f32 / f64 / decimal / date-time / string
//!              i32 byte len | UTF-8 text
//! collection   i32 count | element*
//! object       property* in ascending name order
//! ```
//!
//! Text forms: floats use Rust's shortest round-trip formatting, decimals
//! their canonical string, date-times RFC 3339 in UTC with a `Z` suffix.
//!
//! Reading probes for the null marker first and rewinds when it is not
//! there, so the reader must be seekable. The probe cannot tell a real
//! string `"NuLl"` (or any other value whose bytes equal the marker) from
//! null. That includes fixed-width values: an `i32` property followed by
//! one whose bytes spell `"NuLl"` reads back as null.
//! [`NullEncoding::PresenceByte`] avoids that by writing a one-byte
//! has-value flag before every value instead.
//!
//! Objects without serialized properties take no bytes under the sentinel
//! encoding, so a collection of them declares at most
//! [`MAX_ZERO_WIDTH_ELEMENTS`] elements on read.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;

use crate::error::BinaryError;
use crate::reflect::{PrimitiveKind, Reflect};
use crate::shape::{ObjectShape, Shape, ShapeCache};
use crate::value::{ObjectValue, Value};

/// Payload of the null marker.
pub const NULL_SENTINEL: &str = "NuLl";

/// The null marker as it appears on the wire.
const NULL_MARKER: [u8; 8] = [4, 0, 0, 0, b'N', b'u', b'L', b'l'];

/// Most elements a collection may declare when its elements encode to
/// zero bytes.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1 << 16;

/// How null values are written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum NullEncoding {
    /// The `"NuLl"` marker string in place of the value.
    #[default]
    Sentinel,
    /// A `0`/`1` byte before every value. Not compatible with `Sentinel`
    /// streams.
    PresenceByte,
}

/// Serializer configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BinaryOptions {
    /// Null representation.
    pub null_encoding: NullEncoding,
}

/// Serializes [`Reflect`] values using shapes from the global
/// [`ShapeCache`].
///
/// # Example
///
/// ```rust
/// use catel_binary::BinarySerializer;
///
/// let serializer = BinarySerializer::new();
/// let bytes = serializer.to_bytes(&vec![1_i16, 2, 3]).unwrap();
/// assert_eq!(bytes, [3, 0, 0, 0, 1, 0, 2, 0, 3, 0]);
///
/// let back: Vec<i16> = serializer.from_bytes(&bytes).unwrap();
/// assert_eq!(back, [1, 2, 3]);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct BinarySerializer {
    options: BinaryOptions,
}

impl BinarySerializer {
    /// Creates a serializer writing the default format.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a serializer with explicit options.
    #[must_use]
    pub fn with_options(options: BinaryOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    #[must_use]
    pub fn options(&self) -> BinaryOptions {
        self.options
    }

    /// Returns the shape of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BinaryError::NotSupported`] if `T` reaches an unsupported
    /// type.
    pub fn discover_shape<T: Reflect>(&self) -> Result<Shape, BinaryError> {
        ShapeCache::global().discover::<T>()
    }

    /// Writes `value` to `writer`.
    ///
    /// # Errors
    ///
    /// Fails on unsupported types, values that do not match their shape, and
    /// I/O errors.
    pub fn serialize<T: Reflect, W: Write>(&self, writer: &mut W, value: &T) -> Result<(), BinaryError> {
        let shape = self.discover_shape::<T>()?;
        self.serialize_value(writer, &value.to_value(), &shape)
    }

    /// Reads a `T` from `reader`.
    ///
    /// # Errors
    ///
    /// Fails on unsupported types, malformed input, nulls where `T` does not
    /// allow them, and I/O errors.
    pub fn deserialize<T: Reflect, R: Read + Seek>(&self, reader: &mut R) -> Result<T, BinaryError> {
        let shape = self.discover_shape::<T>()?;
        let value = self.deserialize_value(reader, &shape)?;
        T::from_value(value)
    }

    /// Encodes `value` into a new buffer.
    ///
    /// # Errors
    ///
    /// See [`serialize`](Self::serialize).
    pub fn to_bytes<T: Reflect>(&self, value: &T) -> Result<Vec<u8>, BinaryError> {
        let mut bytes = Vec::new();
        self.serialize(&mut bytes, value)?;
        Ok(bytes)
    }

    /// Decodes a `T` from `bytes`.
    ///
    /// # Errors
    ///
    /// See [`deserialize`](Self::deserialize).
    pub fn from_bytes<T: Reflect>(&self, bytes: &[u8]) -> Result<T, BinaryError> {
        self.deserialize(&mut Cursor::new(bytes))
    }

    /// Writes a value tree against an explicit shape.
    ///
    /// # Errors
    ///
    /// See [`serialize`](Self::serialize).
    pub fn serialize_value<W: Write>(
        &self,
        writer: &mut W,
        value: &Value,
        shape: &Shape,
    ) -> Result<(), BinaryError> {
        match (self.options.null_encoding, value) {
            (NullEncoding::Sentinel, Value::Null) => {
                writer.write_all(&NULL_MARKER)?;
                return Ok(());
            }
            (NullEncoding::PresenceByte, Value::Null) => {
                writer.write_u8(0)?;
                return Ok(());
            }
            (NullEncoding::PresenceByte, _) => writer.write_u8(1)?,
            (NullEncoding::Sentinel, _) => {}
        }

        match shape {
            Shape::Primitive(kind) => write_primitive(writer, *kind, value),
            Shape::Collection(element) => {
                let Value::List(items) = value else {
                    return Err(mismatch("list", value));
                };
                let count = i32::try_from(items.len()).map_err(|_| {
                    BinaryError::InvalidData(format!("{} elements exceed the count range", items.len()))
                })?;
                writer.write_i32::<LittleEndian>(count)?;
                for item in items {
                    self.serialize_value(writer, item, element)?;
                }
                Ok(())
            }
            Shape::Object(object) => {
                let Value::Object(fields) = value else {
                    return Err(mismatch("object", value));
                };
                for property in object.properties() {
                    let field = fields.get(property.name).ok_or(BinaryError::MissingProperty {
                        type_name: object.type_name(),
                        name: property.name,
                    })?;
                    self.serialize_value(writer, field, &property.shape)?;
                }
                Ok(())
            }
        }
    }

    /// Reads a value tree against an explicit shape.
    ///
    /// # Errors
    ///
    /// See [`deserialize`](Self::deserialize).
    pub fn deserialize_value<R: Read + Seek>(&self, reader: &mut R, shape: &Shape) -> Result<Value, BinaryError> {
        match self.options.null_encoding {
            NullEncoding::Sentinel => {
                if probe_null(reader)? {
                    return Ok(Value::Null);
                }
            }
            NullEncoding::PresenceByte => match reader.read_u8()? {
                0 => return Ok(Value::Null),
                1 => {}
                other => {
                    return Err(BinaryError::InvalidData(format!("invalid presence byte {other}")));
                }
            },
        }

        match shape {
            Shape::Primitive(kind) => read_primitive(reader, *kind),
            Shape::Collection(element) => {
                let count = reader.read_i32::<LittleEndian>()?;
                let count = usize::try_from(count)
                    .map_err(|_| BinaryError::InvalidData(format!("negative element count {count}")))?;
                if count > MAX_ZERO_WIDTH_ELEMENTS && self.is_zero_width(element) {
                    return Err(BinaryError::InvalidData(format!(
                        "element count {count} exceeds {MAX_ZERO_WIDTH_ELEMENTS} for zero-width elements"
                    )));
                }
                let mut items = Vec::new();
                for _ in 0..count {
                    items.push(self.deserialize_value(reader, element)?);
                }
                Ok(Value::List(items))
            }
            Shape::Object(object) => {
                let mut fields = ObjectValue::new();
                for property in object.properties() {
                    let value = self.deserialize_value(reader, &property.shape)?;
                    fields.insert(property.name, value);
                }
                Ok(Value::Object(fields))
            }
        }
    }
}

impl BinarySerializer {
    fn is_zero_width(&self, shape: &Shape) -> bool {
        match self.options.null_encoding {
            NullEncoding::Sentinel => zero_width(shape, &mut Vec::new()),
            NullEncoding::PresenceByte => false,
        }
    }
}

/// Returns `true` if every value of `shape` encodes to no bytes at all.
fn zero_width<'a>(shape: &'a Shape, seen: &mut Vec<&'a Arc<ObjectShape>>) -> bool {
    let Shape::Object(object) = shape else {
        return false;
    };
    // A cycle always ends in a null marker or a collection count.
    if seen.iter().any(|visited| Arc::ptr_eq(visited, object)) {
        return false;
    }
    seen.push(object);
    object
        .properties()
        .iter()
        .all(|property| zero_width(&property.shape, seen))
}

/// Consumes the null marker if it is next, otherwise leaves the position
/// unchanged.
fn probe_null<R: Read + Seek>(reader: &mut R) -> Result<bool, BinaryError> {
    let start = reader.stream_position()?;
    let mut marker = [0_u8; NULL_MARKER.len()];
    match reader.read_exact(&mut marker) {
        Ok(()) if marker == NULL_MARKER => return Ok(true),
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {}
        Err(err) => return Err(err.into()),
    }
    reader.seek(SeekFrom::Start(start))?;
    Ok(false)
}

fn mismatch(expected: &'static str, found: &Value) -> BinaryError {
    BinaryError::TypeMismatch {
        expected,
        found: found.kind_name(),
    }
}

fn write_primitive<W: Write>(writer: &mut W, kind: PrimitiveKind, value: &Value) -> Result<(), BinaryError> {
    match (kind, value) {
        (PrimitiveKind::I16, Value::I16(v)) => writer.write_i16::<LittleEndian>(*v)?,
        (PrimitiveKind::I32, Value::I32(v)) => writer.write_i32::<LittleEndian>(*v)?,
        (PrimitiveKind::I64, Value::I64(v)) => writer.write_i64::<LittleEndian>(*v)?,
        (PrimitiveKind::Char, Value::Char(v)) => {
            let unit = u16::try_from(u32::from(*v))
                .map_err(|_| BinaryError::NotSupported("char outside the Basic Multilingual Plane"))?;
            writer.write_u16::<LittleEndian>(unit)?;
        }
        (PrimitiveKind::Bool, Value::Bool(v)) => writer.write_i16::<LittleEndian>(i16::from(*v))?,
        (PrimitiveKind::F32, Value::F32(v)) => write_text(writer, &v.to_string())?,
        (PrimitiveKind::F64, Value::F64(v)) => write_text(writer, &v.to_string())?,
        (PrimitiveKind::Decimal, Value::Decimal(v)) => write_text(writer, &v.to_string())?,
        (PrimitiveKind::DateTime, Value::DateTime(v)) => {
            write_text(writer, &v.to_rfc3339_opts(SecondsFormat::AutoSi, true))?;
        }
        (PrimitiveKind::String, Value::String(v)) => write_text(writer, v)?,
        (_, Value::Unsupported(type_name)) => return Err(BinaryError::NotSupported(*type_name)),
        (kind, value) => return Err(mismatch(kind.name(), value)),
    }
    Ok(())
}

fn write_text<W: Write>(writer: &mut W, text: &str) -> Result<(), BinaryError> {
    let len = i32::try_from(text.len())
        .map_err(|_| BinaryError::InvalidData(format!("{} byte text exceeds the length range", text.len())))?;
    writer.write_i32::<LittleEndian>(len)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

fn read_primitive<R: Read>(reader: &mut R, kind: PrimitiveKind) -> Result<Value, BinaryError> {
    let value = match kind {
        PrimitiveKind::I16 => Value::I16(reader.read_i16::<LittleEndian>()?),
        PrimitiveKind::I32 => Value::I32(reader.read_i32::<LittleEndian>()?),
        PrimitiveKind::I64 => Value::I64(reader.read_i64::<LittleEndian>()?),
        PrimitiveKind::Char => {
            let unit = reader.read_u16::<LittleEndian>()?;
            let c = char::from_u32(u32::from(unit))
                .ok_or_else(|| BinaryError::InvalidData(format!("lone surrogate {unit:#06x}")))?;
            Value::Char(c)
        }
        PrimitiveKind::Bool => match reader.read_i16::<LittleEndian>()? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            other => return Err(BinaryError::InvalidData(format!("invalid boolean {other}"))),
        },
        PrimitiveKind::F32 => Value::F32(parse_text(reader, "f32")?),
        PrimitiveKind::F64 => Value::F64(parse_text(reader, "f64")?),
        PrimitiveKind::Decimal => Value::Decimal(parse_text::<_, Decimal>(reader, "decimal")?),
        PrimitiveKind::DateTime => {
            let text = read_text(reader)?;
            let parsed = DateTime::parse_from_rfc3339(&text)
                .map_err(|err| BinaryError::InvalidData(format!("invalid date-time '{text}': {err}")))?;
            Value::DateTime(parsed.with_timezone(&Utc))
        }
        PrimitiveKind::String => Value::String(read_text(reader)?),
    };
    Ok(value)
}

fn read_text<R: Read>(reader: &mut R) -> Result<String, BinaryError> {
    let len = reader.read_i32::<LittleEndian>()?;
    let len = usize::try_from(len).map_err(|_| BinaryError::InvalidData(format!("negative text length {len}")))?;
    let mut bytes = Vec::new();
    reader.take(u64::try_from(len).unwrap_or(u64::MAX)).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }
    String::from_utf8(bytes).map_err(|err| BinaryError::InvalidData(err.to_string()))
}

fn parse_text<R: Read, T: core::str::FromStr>(reader: &mut R, what: &str) -> Result<T, BinaryError>
where
    T::Err: core::fmt::Display,
{
    let text = read_text(reader)?;
    text.parse()
        .map_err(|err| BinaryError::InvalidData(format!("invalid {what} '{text}': {err}")))
}
