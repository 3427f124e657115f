use crate::{Error, Result};
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, macros::datetime};
use uuid::Uuid;

/// The zero timestamp, `0001-01-01 00:00:00`. Conditionals treat it as absent.
pub const ZERO_TIMESTAMP: PrimitiveDateTime = datetime!(0001-01-01 00:00:00);

/// A dynamically typed SQL value.
///
/// Each variant carries an `Option` so that a NULL still knows its SQL type, this is what drivers
/// need to bind typed NULLs and what the bulk insert builder uses as array element types.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    /// A list of values, expanded into one placeholder per element when bound.
    List(Option<Vec<Value>>, /* type: */ Box<Value>),
    /// A native array, always bound as a single parameter.
    Array(Option<Box<[Value]>>, /* type: */ Box<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::List(l, ..), Self::List(r, ..)) => l == r && self.same_type(other),
            (Self::Array(l, ..), Self::Array(r, ..)) => l == r && self.same_type(other),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(.., l), Self::List(.., r)) => l.same_type(r),
            (Self::Array(.., l), Self::Array(.., r)) => l.same_type(r),
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int8(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::UInt8(None)
            | Value::UInt16(None)
            | Value::UInt32(None)
            | Value::UInt64(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Decimal(None)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::TimestampWithTimezone(None)
            | Value::Uuid(None)
            | Value::List(None, ..)
            | Value::Array(None, ..) => true,
            _ => false,
        }
    }

    /// The same variant holding no value.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
            Value::List(.., ty) => Value::List(None, ty.clone()),
            Value::Array(.., ty) => Value::Array(None, ty.clone()),
        }
    }

    /// Truthiness used by the `{{:name ...}}` conditionals.
    ///
    /// Booleans are themselves, strings, blobs, lists and arrays are true when non-empty, numbers
    /// when greater than zero, times when present and not the zero time. NULL of any supported
    /// type is false. Any other type is an error.
    pub fn is_truthy(&self) -> Result<bool> {
        Ok(match self {
            Value::Null => false,
            Value::Boolean(v) => v.unwrap_or(false),
            Value::Int8(v) => v.is_some_and(|v| v > 0),
            Value::Int16(v) => v.is_some_and(|v| v > 0),
            Value::Int32(v) => v.is_some_and(|v| v > 0),
            Value::Int64(v) => v.is_some_and(|v| v > 0),
            Value::UInt8(v) => v.is_some_and(|v| v > 0),
            Value::UInt16(v) => v.is_some_and(|v| v > 0),
            Value::UInt32(v) => v.is_some_and(|v| v > 0),
            Value::UInt64(v) => v.is_some_and(|v| v > 0),
            Value::Float32(v) => v.is_some_and(|v| v > 0.0),
            Value::Float64(v) => v.is_some_and(|v| v > 0.0),
            Value::Decimal(v) => v.is_some_and(|v| v > Decimal::ZERO),
            Value::Varchar(v) => v.as_ref().is_some_and(|v| !v.is_empty()),
            Value::Blob(v) => v.as_ref().is_some_and(|v| !v.is_empty()),
            Value::List(v, ..) => v.as_ref().is_some_and(|v| !v.is_empty()),
            Value::Array(v, ..) => v.as_ref().is_some_and(|v| !v.is_empty()),
            Value::Date(v) => v.is_some_and(|v| v != ZERO_TIMESTAMP.date()),
            Value::Time(v) => v.is_some(),
            Value::Timestamp(v) => v.is_some_and(|v| v != ZERO_TIMESTAMP),
            Value::TimestampWithTimezone(v) => {
                v.is_some_and(|v| v != ZERO_TIMESTAMP.assume_utc())
            }
            Value::Uuid(..) => {
                return Err(Error::msg(format!(
                    "Unsupported type {:?} for a conditional, expected a boolean, string, number, list or time",
                    self
                )));
            }
        })
    }
}
