use crate::{Kind, Value, truncate_long};
use atoi::FromRadix10SignedChecked;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339,
    macros::format_description,
};
use uuid::Uuid;

/// Why a conversion was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionReason {
    #[error("value out of range")]
    Overflow,
    #[error("negative value for an unsigned target")]
    Negative,
    #[error("value is not a finite number")]
    NotFinite,
    #[error("{0}")]
    InvalidText(String),
    #[error("unsupported conversion")]
    Unsupported,
}

/// A value could not be converted to the requested [`Kind`].
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Cannot convert {value} ({source_type}) to {target}: {reason}")]
pub struct ConversionError {
    pub source_type: &'static str,
    pub target: Kind,
    pub value: String,
    pub reason: ConversionReason,
}

impl ConversionError {
    pub fn new(value: &Value, target: Kind, reason: ConversionReason) -> Self {
        let debug = format!("{value:?}");
        Self {
            source_type: value.type_name(),
            target,
            value: format!("{}", truncate_long!(debug)),
            reason,
        }
    }
}

/// Convert `value` into the variant described by `target`.
///
/// A NULL (typed or not) converts to the typed NULL of `target`. A value that is
/// already of kind `target` is returned unchanged. Every other combination either
/// succeeds with a range checked result or fails with a [`ConversionError`], there
/// is no silent fallback to a default.
pub fn convert(value: Value, target: Kind) -> Result<Value, ConversionError> {
    if value.is_null() {
        return Ok(target.empty_value());
    }
    if value.kind() == target {
        return Ok(value);
    }
    match target {
        Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 => to_integer(&value, target),
        Kind::UInt8 | Kind::UInt16 | Kind::UInt32 | Kind::UInt64 => to_integer(&value, target),
        Kind::Float32 | Kind::Float64 => to_float(&value, target),
        Kind::Decimal => to_decimal(&value),
        Kind::Varchar => to_text(&value).map(|v| Value::Varchar(Some(v))),
        Kind::Unknown => to_text(&value)
            .map(|v| Value::Unknown(Some(v)))
            .map_err(|e| ConversionError { target, ..e }),
        Kind::Boolean => to_bool(&value),
        Kind::Timestamp => to_timestamp(&value),
        Kind::Blob => to_blob(&value),
        Kind::Uuid => to_uuid(&value),
        Kind::Null | Kind::List => Err(ConversionError::new(&value, target, ConversionReason::Unsupported)),
    }
}

fn text_of(value: &Value) -> Option<&str> {
    match value {
        Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => Some(v),
        _ => None,
    }
}

fn integer_of(value: &Value) -> Option<i128> {
    Some(match value {
        Value::Int8(Some(v)) => *v as i128,
        Value::Int16(Some(v)) => *v as i128,
        Value::Int32(Some(v)) => *v as i128,
        Value::Int64(Some(v)) => *v as i128,
        Value::UInt8(Some(v)) => *v as i128,
        Value::UInt16(Some(v)) => *v as i128,
        Value::UInt32(Some(v)) => *v as i128,
        Value::UInt64(Some(v)) => *v as i128,
        _ => return None,
    })
}

fn float_of(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(Some(v)) => Some(*v as f64),
        Value::Float64(Some(v)) => Some(*v),
        _ => None,
    }
}

fn integer_bounds(kind: Kind) -> (i128, i128) {
    match kind {
        Kind::Int8 => (i8::MIN as _, i8::MAX as _),
        Kind::Int16 => (i16::MIN as _, i16::MAX as _),
        Kind::Int32 => (i32::MIN as _, i32::MAX as _),
        Kind::Int64 => (i64::MIN as _, i64::MAX as _),
        Kind::UInt8 => (0, u8::MAX as _),
        Kind::UInt16 => (0, u16::MAX as _),
        Kind::UInt32 => (0, u32::MAX as _),
        _ => (0, u64::MAX as _),
    }
}

/// Parse a base 10 integer consuming the whole input.
pub(crate) fn parse_integer(input: &str) -> Result<i128, ConversionReason> {
    let bytes = input.as_bytes();
    let digits = bytes.strip_prefix(b"-").or(bytes.strip_prefix(b"+")).unwrap_or(bytes);
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(ConversionReason::InvalidText(format!(
            "`{}` is not a base 10 integer",
            truncate_long!(input)
        )));
    }
    let (parsed, _) = i128::from_radix_10_signed_checked(bytes);
    parsed.ok_or(ConversionReason::Overflow)
}

fn to_integer(value: &Value, target: Kind) -> Result<Value, ConversionError> {
    let fail = |reason| ConversionError::new(value, target, reason);
    let (min, max) = integer_bounds(target);
    let n = if let Some(v) = integer_of(value) {
        v
    } else if let Some(v) = float_of(value) {
        if !v.is_finite() {
            return Err(fail(ConversionReason::NotFinite));
        }
        let v = v.trunc();
        if v < 0.0 && min == 0 {
            return Err(fail(ConversionReason::Negative));
        }
        if v < min as f64 || v >= (max + 1) as f64 {
            return Err(fail(ConversionReason::Overflow));
        }
        v as i128
    } else if let Value::Decimal(Some(v)) = value {
        v.trunc().to_i128().ok_or_else(|| fail(ConversionReason::Overflow))?
    } else if let Some(v) = text_of(value) {
        parse_integer(v).map_err(fail)?
    } else {
        return Err(fail(ConversionReason::Unsupported));
    };
    if n < 0 && min == 0 {
        return Err(fail(ConversionReason::Negative));
    }
    if n < min || n > max {
        return Err(fail(ConversionReason::Overflow));
    }
    Ok(match target {
        Kind::Int8 => Value::Int8(Some(n as _)),
        Kind::Int16 => Value::Int16(Some(n as _)),
        Kind::Int32 => Value::Int32(Some(n as _)),
        Kind::Int64 => Value::Int64(Some(n as _)),
        Kind::UInt8 => Value::UInt8(Some(n as _)),
        Kind::UInt16 => Value::UInt16(Some(n as _)),
        Kind::UInt32 => Value::UInt32(Some(n as _)),
        _ => Value::UInt64(Some(n as _)),
    })
}

fn to_float(value: &Value, target: Kind) -> Result<Value, ConversionError> {
    let fail = |reason| ConversionError::new(value, target, reason);
    let v = if let Some(v) = integer_of(value) {
        v as f64
    } else if let Some(v) = float_of(value) {
        v
    } else if let Value::Decimal(Some(v)) = value {
        v.to_f64().ok_or_else(|| fail(ConversionReason::Overflow))?
    } else if let Some(v) = text_of(value) {
        fast_float::parse::<f64, _>(v).map_err(|_| {
            fail(ConversionReason::InvalidText(format!(
                "`{}` is not a floating point number",
                truncate_long!(v)
            )))
        })?
    } else {
        return Err(fail(ConversionReason::Unsupported));
    };
    if target == Kind::Float32 {
        if v.is_finite() && v.abs() > f32::MAX as f64 {
            return Err(fail(ConversionReason::Overflow));
        }
        return Ok(Value::Float32(Some(v as f32)));
    }
    Ok(Value::Float64(Some(v)))
}

fn to_decimal(value: &Value) -> Result<Value, ConversionError> {
    let fail = |reason| ConversionError::new(value, Kind::Decimal, reason);
    let v = if let Some(v) = integer_of(value) {
        Decimal::from_i128(v).ok_or_else(|| fail(ConversionReason::Overflow))?
    } else if let Some(v) = float_of(value) {
        if !v.is_finite() {
            return Err(fail(ConversionReason::NotFinite));
        }
        Decimal::from_f64(v).ok_or_else(|| fail(ConversionReason::Overflow))?
    } else if let Some(v) = text_of(value) {
        v.parse::<Decimal>()
            .map_err(|e| fail(ConversionReason::InvalidText(e.to_string())))?
    } else {
        return Err(fail(ConversionReason::Unsupported));
    };
    Ok(Value::Decimal(Some(v)))
}

fn to_text(value: &Value) -> Result<String, ConversionError> {
    let fail = |reason| ConversionError::new(value, Kind::Varchar, reason);
    if let Some(v) = integer_of(value) {
        let mut buffer = itoa::Buffer::new();
        return Ok(buffer.format(v).to_owned());
    }
    Ok(match value {
        Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => v.clone(),
        Value::Boolean(Some(v)) => v.to_string(),
        Value::Float32(Some(v)) => ryu::Buffer::new().format(*v).to_owned(),
        Value::Float64(Some(v)) => ryu::Buffer::new().format(*v).to_owned(),
        Value::Decimal(Some(v)) => v.to_string(),
        Value::Blob(Some(v)) => String::from_utf8(v.to_vec())
            .map_err(|_| fail(ConversionReason::InvalidText("bytes are not valid UTF-8".into())))?,
        Value::Timestamp(Some(v)) => v
            .format(&Rfc3339)
            .map_err(|e| fail(ConversionReason::InvalidText(e.to_string())))?,
        Value::Uuid(Some(v)) => v.hyphenated().to_string(),
        _ => return Err(fail(ConversionReason::Unsupported)),
    })
}

/// Parse the conventional boolean literals: `1`, `t`, `true`, `0`, `f`, `false` in any case.
pub(crate) fn parse_bool(input: &str) -> Option<bool> {
    match input {
        "1" => Some(true),
        "0" => Some(false),
        x if x.eq_ignore_ascii_case("t") || x.eq_ignore_ascii_case("true") => Some(true),
        x if x.eq_ignore_ascii_case("f") || x.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Result<Value, ConversionError> {
    let fail = |reason| ConversionError::new(value, Kind::Boolean, reason);
    let v = if let Some(v) = integer_of(value) {
        v != 0
    } else if let Some(v) = float_of(value) {
        v != 0.0
    } else if let Value::Decimal(Some(v)) = value {
        !v.is_zero()
    } else if let Some(v) = text_of(value) {
        parse_bool(v).ok_or_else(|| {
            fail(ConversionReason::InvalidText(format!(
                "`{}` is not a boolean literal",
                truncate_long!(v)
            )))
        })?
    } else {
        return Err(fail(ConversionReason::Unsupported));
    };
    Ok(Value::Boolean(Some(v)))
}

/// Parse a timestamp trying, in order: RFC 3339 with full precision, date time
/// with an offset, date time without offset (UTC) and date only (midnight UTC).
pub(crate) fn parse_timestamp(input: &str) -> Option<OffsetDateTime> {
    if let Ok(v) = OffsetDateTime::parse(input, &Rfc3339) {
        return Some(v);
    }
    for format in [
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour sign:mandatory][offset_minute]"
        ),
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
        ),
    ] {
        if let Ok(v) = OffsetDateTime::parse(input, format) {
            return Some(v);
        }
    }
    for format in [
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ] {
        if let Ok(v) = PrimitiveDateTime::parse(input, format) {
            return Some(v.assume_utc());
        }
    }
    Date::parse(input, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|v| v.midnight().assume_utc())
}

fn to_timestamp(value: &Value) -> Result<Value, ConversionError> {
    let fail = |reason| ConversionError::new(value, Kind::Timestamp, reason);
    let v = if let Some(v) = integer_of(value) {
        let seconds = i64::try_from(v).map_err(|_| fail(ConversionReason::Overflow))?;
        OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| fail(ConversionReason::Overflow))?
    } else if let Some(v) = float_of(value) {
        if !v.is_finite() {
            return Err(fail(ConversionReason::NotFinite));
        }
        let seconds = v.trunc();
        let nanos = ((v - seconds) * 1_000_000_000.0).round();
        if seconds.abs() >= i64::MAX as f64 {
            return Err(fail(ConversionReason::Overflow));
        }
        let total = seconds as i128 * 1_000_000_000 + nanos as i128;
        OffsetDateTime::from_unix_timestamp_nanos(total)
            .map_err(|_| fail(ConversionReason::Overflow))?
    } else if let Some(v) = text_of(value) {
        parse_timestamp(v).ok_or_else(|| {
            fail(ConversionReason::InvalidText(format!(
                "`{}` does not match any accepted timestamp format",
                truncate_long!(v)
            )))
        })?
    } else {
        return Err(fail(ConversionReason::Unsupported));
    };
    Ok(Value::Timestamp(Some(v)))
}

fn to_blob(value: &Value) -> Result<Value, ConversionError> {
    Ok(Value::Blob(Some(match value {
        Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => v.as_bytes().into(),
        Value::Uuid(Some(v)) => v.as_bytes().as_slice().into(),
        _ => {
            return Err(ConversionError::new(value, Kind::Blob, ConversionReason::Unsupported));
        }
    })))
}

fn to_uuid(value: &Value) -> Result<Value, ConversionError> {
    let fail = |reason| ConversionError::new(value, Kind::Uuid, reason);
    let parse = |v: &str| {
        Uuid::parse_str(v).map_err(|e| fail(ConversionReason::InvalidText(e.to_string())))
    };
    let v = match value {
        Value::Varchar(Some(v)) | Value::Unknown(Some(v)) => parse(v)?,
        Value::Blob(Some(v)) if v.len() == 16 => {
            Uuid::from_slice(v).map_err(|e| fail(ConversionReason::InvalidText(e.to_string())))?
        }
        Value::Blob(Some(v)) => match std::str::from_utf8(v) {
            Ok(v) => parse(v)?,
            Err(..) => return Err(fail(ConversionReason::Unsupported)),
        },
        _ => return Err(fail(ConversionReason::Unsupported)),
    };
    Ok(Value::Uuid(Some(v)))
}
