use crate::{ConversionError, ConversionReason, Error, Kind, Result, Value, convert};
use rust_decimal::Decimal;
use std::any;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// It is the bridge used by records to expose their fields, by conditions to
/// accept parameters and by row results to hand out typed cells.
///
/// # Conversion contract
/// - `try_from_value` routes every value through [`convert`] with the kind of
///   `Self`, so widening, narrowing and text parsing follow one set of rules.
/// - A NULL is an error for non optional types, wrap the type in `Option` to
///   accept it.
///
/// # Examples
/// ```rust
/// use sluice_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL for this type, also describes the declared [`Kind`].
    fn as_empty_value() -> Value;
    /// Owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse text into `Self` using the same rules as text cells.
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        Self::try_from_value(Value::Varchar(Some(input.as_ref().into())))
    }
    /// Declared kind of `Self`.
    fn kind() -> Kind {
        Self::as_empty_value().kind()
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl<'a> From<&'a str> for Value {
    fn from(value: &'a str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn unexpected_null<T>() -> Error {
    Error::msg(format!(
        "Unexpected NULL while converting to {}, use an Option to accept it",
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path, $kind:expr) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match convert(value, $kind)? {
                    $destination(Some(v)) => Ok(v.into()),
                    _ => Err(unexpected_null::<Self>()),
                }
            }
        }
    };
}
impl_as_value!(bool, Value::Boolean, Kind::Boolean);
impl_as_value!(i8, Value::Int8, Kind::Int8);
impl_as_value!(i16, Value::Int16, Kind::Int16);
impl_as_value!(i32, Value::Int32, Kind::Int32);
impl_as_value!(i64, Value::Int64, Kind::Int64);
impl_as_value!(u8, Value::UInt8, Kind::UInt8);
impl_as_value!(u16, Value::UInt16, Kind::UInt16);
impl_as_value!(u32, Value::UInt32, Kind::UInt32);
impl_as_value!(u64, Value::UInt64, Kind::UInt64);
impl_as_value!(f32, Value::Float32, Kind::Float32);
impl_as_value!(f64, Value::Float64, Kind::Float64);
impl_as_value!(Decimal, Value::Decimal, Kind::Decimal);
impl_as_value!(String, Value::Varchar, Kind::Varchar);
impl_as_value!(Box<[u8]>, Value::Blob, Kind::Blob);
impl_as_value!(OffsetDateTime, Value::Timestamp, Kind::Timestamp);
impl_as_value!(Uuid, Value::Uuid, Kind::Uuid);

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self.assume_utc()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match convert(value, Kind::Timestamp)? {
            Value::Timestamp(Some(v)) => {
                let v = v.to_offset(UtcOffset::UTC);
                Ok(PrimitiveDateTime::new(v.date(), v.time()))
            }
            _ => Err(unexpected_null::<Self>()),
        }
    }
}

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
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
}

impl<T: AsValue> AsValue for Vec<T> {
    fn as_empty_value() -> Value {
        Value::List(None)
    }
    fn as_value(self) -> Value {
        Value::List(Some(self.into_iter().map(AsValue::as_value).collect()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(Some(v)) => v.into_iter().map(T::try_from_value).collect(),
            v if v.is_null() => Err(unexpected_null::<Self>()),
            v => Err(ConversionError::new(&v, Kind::List, ConversionReason::Unsupported).into()),
        }
    }
}

/// Build a `Vec<Value>` from heterogeneous expressions.
///
/// ```rust
/// use sluice_core::{Value, values};
/// let params = values![1, "two", vec![3, 4]];
/// assert_eq!(params[1], Value::Varchar(Some("two".into())));
/// ```
#[macro_export]
macro_rules! values {
    ($($value:expr),* $(,)?) => {
        ::std::vec![$($crate::Value::from($value)),*]
    };
}
