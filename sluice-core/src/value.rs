use rust_decimal::Decimal;
use std::fmt::{self, Display, Formatter};
use time::OffsetDateTime;
use uuid::Uuid;

/// Dynamically typed value exchanged between records, conditions and rows.
///
/// Every variant carries an `Option` so that a NULL still remembers the type it
/// was declared with (`Value::Int32(None)` is a typed NULL). `Value::Null` is the
/// untyped NULL produced by drivers that do not know better.
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
    Timestamp(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    /// Textual value whose type the driver could not determine.
    Unknown(Option<String>),
    List(Option<Vec<Value>>),
}

/// The semantic type a [`Value`] can be converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Varchar,
    Blob,
    Timestamp,
    Uuid,
    Unknown,
    List,
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
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Unknown(l), Self::Unknown(r)) => l == r,
            (Self::List(l), Self::List(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Boolean(..) => Kind::Boolean,
            Value::Int8(..) => Kind::Int8,
            Value::Int16(..) => Kind::Int16,
            Value::Int32(..) => Kind::Int32,
            Value::Int64(..) => Kind::Int64,
            Value::UInt8(..) => Kind::UInt8,
            Value::UInt16(..) => Kind::UInt16,
            Value::UInt32(..) => Kind::UInt32,
            Value::UInt64(..) => Kind::UInt64,
            Value::Float32(..) => Kind::Float32,
            Value::Float64(..) => Kind::Float64,
            Value::Decimal(..) => Kind::Decimal,
            Value::Varchar(..) => Kind::Varchar,
            Value::Blob(..) => Kind::Blob,
            Value::Timestamp(..) => Kind::Timestamp,
            Value::Uuid(..) => Kind::Uuid,
            Value::Unknown(..) => Kind::Unknown,
            Value::List(..) => Kind::List,
        }
    }

    /// Rust type name of the payload, used in conversion diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(..) => "bool",
            Value::Int8(..) => "i8",
            Value::Int16(..) => "i16",
            Value::Int32(..) => "i32",
            Value::Int64(..) => "i64",
            Value::UInt8(..) => "u8",
            Value::UInt16(..) => "u16",
            Value::UInt32(..) => "u32",
            Value::UInt64(..) => "u64",
            Value::Float32(..) => "f32",
            Value::Float64(..) => "f64",
            Value::Decimal(..) => "rust_decimal::Decimal",
            Value::Varchar(..) => "String",
            Value::Blob(..) => "Box<[u8]>",
            Value::Timestamp(..) => "time::OffsetDateTime",
            Value::Uuid(..) => "uuid::Uuid",
            Value::Unknown(..) => "unknown",
            Value::List(..) => "Vec<Value>",
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(v) => v.is_none(),
            Value::Int8(v) => v.is_none(),
            Value::Int16(v) => v.is_none(),
            Value::Int32(v) => v.is_none(),
            Value::Int64(v) => v.is_none(),
            Value::UInt8(v) => v.is_none(),
            Value::UInt16(v) => v.is_none(),
            Value::UInt32(v) => v.is_none(),
            Value::UInt64(v) => v.is_none(),
            Value::Float32(v) => v.is_none(),
            Value::Float64(v) => v.is_none(),
            Value::Decimal(v) => v.is_none(),
            Value::Varchar(v) => v.is_none(),
            Value::Blob(v) => v.is_none(),
            Value::Timestamp(v) => v.is_none(),
            Value::Uuid(v) => v.is_none(),
            Value::Unknown(v) => v.is_none(),
            Value::List(v) => v.is_none(),
        }
    }

    /// Whether the value equals the zero value of its kind. NULL counts as zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Boolean(Some(v)) => !v,
            Value::Int8(Some(v)) => *v == 0,
            Value::Int16(Some(v)) => *v == 0,
            Value::Int32(Some(v)) => *v == 0,
            Value::Int64(Some(v)) => *v == 0,
            Value::UInt8(Some(v)) => *v == 0,
            Value::UInt16(Some(v)) => *v == 0,
            Value::UInt32(Some(v)) => *v == 0,
            Value::UInt64(Some(v)) => *v == 0,
            // Only positive zero, `-0.0` is a distinct assigned value
            Value::Float32(Some(v)) => v.to_bits() == 0,
            Value::Float64(Some(v)) => v.to_bits() == 0,
            Value::Decimal(Some(v)) => v.is_zero(),
            Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => v.is_empty(),
            Value::Blob(Some(v)) => v.is_empty(),
            Value::Timestamp(Some(v)) => *v == OffsetDateTime::UNIX_EPOCH,
            Value::Uuid(Some(v)) => v.is_nil(),
            Value::List(Some(v)) => v.is_empty(),
            _ => self.is_null(),
        }
    }
}

impl Kind {
    /// Typed NULL of this kind.
    pub fn empty_value(self) -> Value {
        match self {
            Kind::Null => Value::Null,
            Kind::Boolean => Value::Boolean(None),
            Kind::Int8 => Value::Int8(None),
            Kind::Int16 => Value::Int16(None),
            Kind::Int32 => Value::Int32(None),
            Kind::Int64 => Value::Int64(None),
            Kind::UInt8 => Value::UInt8(None),
            Kind::UInt16 => Value::UInt16(None),
            Kind::UInt32 => Value::UInt32(None),
            Kind::UInt64 => Value::UInt64(None),
            Kind::Float32 => Value::Float32(None),
            Kind::Float64 => Value::Float64(None),
            Kind::Decimal => Value::Decimal(None),
            Kind::Varchar => Value::Varchar(None),
            Kind::Blob => Value::Blob(None),
            Kind::Timestamp => Value::Timestamp(None),
            Kind::Uuid => Value::Uuid(None),
            Kind::Unknown => Value::Unknown(None),
            Kind::List => Value::List(None),
        }
    }

    /// Value used when a NULL lands in a non nullable destination.
    ///
    /// Timestamps use the Unix epoch and UUIDs the nil UUID.
    pub fn zero_value(self) -> Value {
        match self {
            Kind::Null => Value::Null,
            Kind::Boolean => Value::Boolean(Some(false)),
            Kind::Int8 => Value::Int8(Some(0)),
            Kind::Int16 => Value::Int16(Some(0)),
            Kind::Int32 => Value::Int32(Some(0)),
            Kind::Int64 => Value::Int64(Some(0)),
            Kind::UInt8 => Value::UInt8(Some(0)),
            Kind::UInt16 => Value::UInt16(Some(0)),
            Kind::UInt32 => Value::UInt32(Some(0)),
            Kind::UInt64 => Value::UInt64(Some(0)),
            Kind::Float32 => Value::Float32(Some(0.0)),
            Kind::Float64 => Value::Float64(Some(0.0)),
            Kind::Decimal => Value::Decimal(Some(Decimal::ZERO)),
            Kind::Varchar => Value::Varchar(Some(String::new())),
            Kind::Blob => Value::Blob(Some(Box::default())),
            Kind::Timestamp => Value::Timestamp(Some(OffsetDateTime::UNIX_EPOCH)),
            Kind::Uuid => Value::Uuid(Some(Uuid::nil())),
            Kind::Unknown => Value::Unknown(Some(String::new())),
            Kind::List => Value::List(Some(Vec::new())),
        }
    }

    pub fn is_signed_integer(self) -> bool {
        matches!(self, Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64)
    }

    pub fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            Kind::UInt8 | Kind::UInt16 | Kind::UInt32 | Kind::UInt64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Null => "Null",
            Kind::Boolean => "Boolean",
            Kind::Int8 => "Int8",
            Kind::Int16 => "Int16",
            Kind::Int32 => "Int32",
            Kind::Int64 => "Int64",
            Kind::UInt8 => "UInt8",
            Kind::UInt16 => "UInt16",
            Kind::UInt32 => "UInt32",
            Kind::UInt64 => "UInt64",
            Kind::Float32 => "Float32",
            Kind::Float64 => "Float64",
            Kind::Decimal => "Decimal",
            Kind::Varchar => "Varchar",
            Kind::Blob => "Blob",
            Kind::Timestamp => "Timestamp",
            Kind::Uuid => "Uuid",
            Kind::Unknown => "Unknown",
            Kind::List => "List",
        })
    }
}
