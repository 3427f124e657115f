use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use std::{any, borrow::Cow, collections::VecDeque, rc::Rc, sync::Arc};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Every `AsValue` type is accepted as a positional parameter (see [`crate::IntoParam`]). Lists
/// (`Vec<T>`, `VecDeque<T>`) become [`Value::List`] and are expanded into one placeholder per
/// element. Byte sequences must be given as `Box<[u8]>` or `&[u8]` to be bound as a single blob.
///
/// ```rust
/// use verbatim_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The NULL of the corresponding variant.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`, widening integers when lossless.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {:?} to {}",
        value,
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $from:path)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    $($from(Some(v)) => <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {} is out of range for {}",
                            v,
                            any::type_name::<$source>(),
                        ))
                    }),)*
                    _ => Err(conversion_error::<$source>(&value)),
                }
            }
        }
    };
}

impl_as_value!(i8, Value::Int8, Value::Int16, Value::Int32, Value::Int64, Value::UInt8);
impl_as_value!(i16, Value::Int16, Value::Int8, Value::Int32, Value::Int64, Value::UInt8, Value::UInt16);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int8,
    Value::Int16,
    Value::Int64,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int8,
    Value::Int16,
    Value::Int32,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
    Value::UInt64,
);
impl_as_value!(u8, Value::UInt8, Value::Int8, Value::Int16, Value::Int32, Value::Int64);
impl_as_value!(u16, Value::UInt16, Value::UInt8, Value::Int16, Value::Int32, Value::Int64);
impl_as_value!(u32, Value::UInt32, Value::UInt8, Value::UInt16, Value::Int32, Value::Int64);
impl_as_value!(
    u64,
    Value::UInt64,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
    Value::Int32,
    Value::Int64,
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(time::Date, Value::Date);
impl_as_value!(time::Time, Value::Time);
impl_as_value!(time::PrimitiveDateTime, Value::Timestamp);
impl_as_value!(time::OffsetDateTime, Value::TimestampWithTimezone);
impl_as_value!(Uuid, Value::Uuid);
impl_as_value!(Decimal, Value::Decimal);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v != 0),
            Value::Int16(Some(v)) => Ok(v != 0),
            Value::Int32(Some(v)) => Ok(v != 0),
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::UInt8(Some(v)) => Ok(v != 0),
            Value::UInt16(Some(v)) => Ok(v != 0),
            Value::UInt32(Some(v)) => Ok(v != 0),
            Value::UInt64(Some(v)) => Ok(v != 0),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path $(, $from:path)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v),
                    $($from(Some(v)) => Ok(v as _),)*
                    Value::Decimal(Some(v)) => v
                        .to_string()
                        .parse()
                        .map_err(|_| conversion_error::<$source>(&value)),
                    _ => Err(conversion_error::<$source>(&value)),
                }
            }
        }
    };
}

impl_as_value_float!(f32, Value::Float32, Value::Int8, Value::Int16, Value::UInt8, Value::UInt16);
impl_as_value_float!(
    f64,
    Value::Float64,
    Value::Float32,
    Value::Int8,
    Value::Int16,
    Value::Int32,
    Value::UInt8,
    Value::UInt16,
    Value::UInt32,
);

impl AsValue for &str {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Err(Error::msg(format!(
            "Cannot convert {:?} to a borrowed &str, use String instead",
            value
        )))
    }
}

impl<'a> AsValue for Cow<'a, str> {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        String::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

impl AsValue for &[u8] {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Err(Error::msg(format!(
            "Cannot convert {:?} to a borrowed &[u8], use Box<[u8]> instead",
            value
        )))
    }
}

macro_rules! impl_as_value_list {
    ($source:ident) => {
        impl<T: AsValue> AsValue for $source<T> {
            fn as_empty_value() -> Value {
                Value::List(None, Box::new(T::as_empty_value()))
            }
            fn as_value(self) -> Value {
                Value::List(
                    Some(self.into_iter().map(AsValue::as_value).collect()),
                    Box::new(T::as_empty_value()),
                )
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    Value::List(Some(v), ..) => v.into_iter().map(T::try_from_value).collect(),
                    Value::Array(Some(v), ..) => v
                        .into_vec()
                        .into_iter()
                        .map(T::try_from_value)
                        .collect(),
                    Value::List(None, ..) | Value::Array(None, ..) => Ok($source::<T>::new()),
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_list!(Vec);
impl_as_value_list!(VecDeque);

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(T::try_from_value(value)?)
        })
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(Self::new(T::try_from_value(value)?))
    }
}

macro_rules! impl_as_value_shared {
    ($source:ident) => {
        impl<T: AsValue + Clone> AsValue for $source<T> {
            fn as_empty_value() -> Value {
                T::as_empty_value()
            }
            fn as_value(self) -> Value {
                $source::unwrap_or_clone(self).as_value()
            }
            fn try_from_value(value: Value) -> Result<Self> {
                Ok($source::new(T::try_from_value(value)?))
            }
        }
    };
}
impl_as_value_shared!(Arc);
impl_as_value_shared!(Rc);
