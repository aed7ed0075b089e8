use crate::{Error, Result, Value, consume_while, truncate_long};
use atoi::{FromRadix10Checked, FromRadix10SignedChecked};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{any, str::FromStr};
use time::{Date, PrimitiveDateTime, Time, macros::format_description};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// This is the bridge used to bind attributes, build literals and decode the
/// scalars a driver returns.
///
/// # Parsing contract
/// - `parse` delegates to `extract` then verifies the slice is exhausted.
/// - `extract` MUST update the input slice only on success.
///
/// # Error semantics
/// Every failure is an [`Error::Type`]: range checks happen before returning a
/// numeric conversion and the message names both the offending value and the
/// target type.
///
/// # Examples
/// ```rust
/// use keel_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int64(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL of the variant this type maps to.
    fn as_empty_value() -> Value;
    /// Owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`. Text values are
    /// parsed, because drivers often return scalars as text.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Parse a full string, failing if any input is left over (`123abc`).
    fn parse(input: impl AsRef<str>) -> Result<Self>
    where
        Self: Sized,
    {
        let mut value = input.as_ref();
        let result = Self::extract(&mut value)?;
        if !value.is_empty() {
            return Err(Error::type_error(format!(
                "Value `{}` parsed correctly as {} but it did not consume all the input (remaining: `{}`)",
                truncate_long!(input.as_ref()),
                any::type_name::<Self>(),
                truncate_long!(value),
            )));
        }
        Ok(result)
    }
    /// Parse a prefix of the input, advancing the slice past it on success.
    fn extract(value: &mut &str) -> Result<Self>
    where
        Self: Sized,
    {
        Err(Error::type_error(format!(
            "Cannot parse '{}' as {}",
            truncate_long!(value),
            any::type_name::<Self>()
        )))
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::type_error(format!(
        "Cannot convert {} value {} to {}",
        value.type_name(),
        value,
        any::type_name::<T>(),
    ))
}

impl AsValue for Value {
    fn as_empty_value() -> Value {
        Value::Null
    }
    fn as_value(self) -> Value {
        self
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

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
            Value::Int64(Some(v)) => Ok(v != 0),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let mut value = *input;
        let word = consume_while(&mut value, char::is_ascii_alphanumeric);
        let result = match word.to_ascii_lowercase().as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => {
                return Err(Error::type_error(format!(
                    "Cannot parse '{}' as bool",
                    truncate_long!(input)
                )));
            }
        };
        *input = value;
        Ok(result)
    }
}

impl AsValue for i64 {
    fn as_empty_value() -> Value {
        Value::Int64(None)
    }
    fn as_value(self) -> Value {
        Value::Int64(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int64(Some(v)) => Ok(v),
            Value::Boolean(Some(v)) => Ok(v as i64),
            Value::Float64(Some(v)) if v.fract() == 0.0 && v.abs() < 9.2e18 => Ok(v as i64),
            Value::Decimal(Some(v)) => {
                let error = Error::type_error(format!("Value {v}: Decimal does not fit into i64"));
                if !v.is_integer() {
                    return Err(error);
                }
                v.to_i64().ok_or(error)
            }
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v.trim()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let (value, len) = i64::from_radix_10_signed_checked(input.as_bytes());
        match value {
            Some(v) if len > 0 => {
                *input = &input[len..];
                Ok(v)
            }
            _ => Err(Error::type_error(format!(
                "Cannot extract an integer from `{}`",
                truncate_long!(input)
            ))),
        }
    }
}

macro_rules! impl_as_value_integer {
    ($source:ty) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                Value::Int64(None)
            }
            fn as_value(self) -> Value {
                Value::Int64(Some(self as i64))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let v = i64::try_from_value(value)?;
                <$source>::try_from(v).map_err(|_| {
                    Error::type_error(format!(
                        "Value {v}: i64 is out of range for {}",
                        any::type_name::<Self>(),
                    ))
                })
            }
            fn extract(input: &mut &str) -> Result<Self> {
                let mut value = *input;
                let v = i64::extract(&mut value)?;
                let result = <$source>::try_from(v).map_err(|_| {
                    Error::type_error(format!(
                        "Parsed integer {v} is out of range for {}",
                        any::type_name::<Self>(),
                    ))
                })?;
                *input = value;
                Ok(result)
            }
        }
    };
}
impl_as_value_integer!(i8);
impl_as_value_integer!(i16);
impl_as_value_integer!(i32);
impl_as_value_integer!(isize);
impl_as_value_integer!(u8);
impl_as_value_integer!(u16);
impl_as_value_integer!(u32);

impl AsValue for u64 {
    fn as_empty_value() -> Value {
        Value::Int64(None)
    }
    /// Values above `i64::MAX` become a decimal, the widest exact integer a row can carry.
    fn as_value(self) -> Value {
        match i64::try_from(self) {
            Ok(v) => Value::Int64(Some(v)),
            Err(..) => Value::Decimal(Some(Decimal::from(self))),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int64(Some(v)) => u64::try_from(v).map_err(|_| {
                Error::type_error(format!("Value {v}: i64 is out of range for u64"))
            }),
            Value::Decimal(Some(v)) => {
                let error = Error::type_error(format!("Value {v}: Decimal does not fit into u64"));
                if !v.is_integer() {
                    return Err(error);
                }
                v.to_u64().ok_or(error)
            }
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v.trim()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let (value, len) = u64::from_radix_10_checked(input.as_bytes());
        match value {
            Some(v) if len > 0 => {
                *input = &input[len..];
                Ok(v)
            }
            _ => Err(Error::type_error(format!(
                "Cannot extract an unsigned integer from `{}`",
                truncate_long!(input)
            ))),
        }
    }
}

impl AsValue for usize {
    fn as_empty_value() -> Value {
        Value::Int64(None)
    }
    fn as_value(self) -> Value {
        (self as u64).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let v = u64::try_from_value(value)?;
        usize::try_from(v)
            .map_err(|_| Error::type_error(format!("Value {v}: u64 is out of range for usize")))
    }
}

impl AsValue for f64 {
    fn as_empty_value() -> Value {
        Value::Float64(None)
    }
    fn as_value(self) -> Value {
        Value::Float64(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float64(Some(v)) => Ok(v),
            Value::Int64(Some(v)) => Ok(v as f64),
            Value::Decimal(Some(v)) => v
                .to_f64()
                .ok_or_else(|| Error::type_error(format!("Value {v}: Decimal does not fit into f64"))),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v.trim()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        match fast_float::parse_partial::<f64, _>(*input) {
            Ok((v, len)) if len > 0 => {
                *input = &input[len..];
                Ok(v)
            }
            _ => Err(Error::type_error(format!(
                "Cannot extract a floating point value from `{}`",
                truncate_long!(input)
            ))),
        }
    }
}

impl AsValue for f32 {
    fn as_empty_value() -> Value {
        Value::Float64(None)
    }
    fn as_value(self) -> Value {
        Value::Float64(Some(self as f64))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        f64::try_from_value(value).map(|v| v as f32)
    }
    fn extract(input: &mut &str) -> Result<Self> {
        f64::extract(input).map(|v| v as f32)
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int64(Some(v)) => Ok(Decimal::from(v)),
            Value::Float64(Some(v)) => Decimal::from_f64(v)
                .ok_or_else(|| Error::type_error(format!("Value {v}: f64 does not fit into Decimal"))),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v.trim()),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn extract(input: &mut &str) -> Result<Self> {
        let mut value = *input;
        let sign = if value.starts_with(['-', '+']) {
            let sign = &value[..1];
            value = &value[1..];
            sign
        } else {
            ""
        };
        let digits = consume_while(&mut value, |c| c.is_ascii_digit() || *c == '.');
        let result = Decimal::from_str(&format!("{sign}{digits}")).map_err(|e| {
            Error::type_error(format!(
                "Cannot extract a Decimal from `{}`: {e}",
                truncate_long!(input)
            ))
        })?;
        *input = value;
        Ok(result)
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        Ok(input.as_ref().to_owned())
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
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

fn temporal_error<T>(input: &str, error: impl std::fmt::Display) -> Error {
    Error::type_error(format!(
        "Cannot parse `{}` as {}: {error}",
        truncate_long!(input),
        any::type_name::<T>()
    ))
}

impl AsValue for Date {
    fn as_empty_value() -> Value {
        Value::Date(None)
    }
    fn as_value(self) -> Value {
        Value::Date(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Date(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.date()),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Date::parse(input, format_description!("[year]-[month]-[day]"))
            .map_err(|e| temporal_error::<Self>(input, e))
    }
}

impl AsValue for Time {
    fn as_empty_value() -> Value {
        Value::Time(None)
    }
    fn as_value(self) -> Value {
        Value::Time(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Time(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.time()),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Time::parse(
            input,
            format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]"),
        )
        .map_err(|e| temporal_error::<Self>(input, e))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::Date(Some(v)) => Ok(v.midnight()),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    /// Accepts both `YYYY-MM-DD HH:MM:SS` and the ISO `T` separator, with an optional fraction.
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        let normalized = match input.as_bytes().get(10) {
            Some(b'T') => format!("{} {}", &input[..10], &input[11..]),
            _ => input.to_owned(),
        };
        PrimitiveDateTime::parse(
            &normalized,
            format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
            ),
        )
        .map_err(|e| temporal_error::<Self>(input, e))
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            Value::Blob(Some(ref v)) => Uuid::from_slice(v).map_err(|e| {
                Error::type_error(format!("Cannot convert a blob of {} bytes to Uuid: {e}", v.len()))
            }),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref().trim();
        Uuid::parse_str(input).map_err(|e| temporal_error::<Self>(input, e))
    }
}

impl AsValue for serde_json::Value {
    fn as_empty_value() -> Value {
        Value::Json(None)
    }
    fn as_value(self) -> Value {
        Value::Json(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => <Self as AsValue>::parse(v),
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
    fn parse(input: impl AsRef<str>) -> Result<Self> {
        let input = input.as_ref();
        serde_json::from_str(input).map_err(|e| {
            Error::type_error(format!(
                "Cannot decode `{}` as JSON: {e}",
                truncate_long!(input)
            ))
        })
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
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl<T: AsValue> AsValue for Vec<T> {
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
            _ => Err(conversion_error::<Self>(&value)),
        }
    }
}

macro_rules! impl_from_as_value {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    value.as_value()
                }
            }
        )+
    };
}
impl_from_as_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    Decimal,
    String,
    Box<[u8]>,
    Date,
    Time,
    PrimitiveDateTime,
    Uuid,
    serde_json::Value,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.to_owned()))
    }
}

impl<T: AsValue> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.as_value()
    }
}

impl<T: AsValue> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        value.as_value()
    }
}
