use crate::{AsValue, Error, Result, Value, write_timestamp};
use rust_decimal::prelude::ToPrimitive;
use std::fmt::{self, Display, Formatter};
use time::{OffsetDateTime, PrimitiveDateTime};

/// Bidirectional mapping between a stored scalar and the in-memory attribute value.
///
/// `decode` runs on every value entering an entity (rows and `set`), `encode`
/// produces the form written to storage and compared for dirty tracking.
/// Out of domain values fail with [`Error::Type`], they are never coerced.
///
/// | cast | in memory | stored |
/// |---|---|---|
/// | `Array` / `Json` | `Value::Json` | JSON text |
/// | `Bool` | `Value::Boolean` | `0` / `1` |
/// | `Int` | `Value::Int64` | integer |
/// | `Float` | `Value::Float64` | real |
/// | `String` | `Value::Varchar` | text |
/// | `Datetime` | `Value::Timestamp` | `YYYY-MM-DD HH:MM:SS` text |
/// | `Enum` | a declared case | the same case |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cast {
    /// JSON array or object.
    Array,
    /// Any JSON document.
    Json,
    Bool,
    Int,
    Float,
    String,
    Datetime,
    Enum(EnumCast),
}

/// A backing value of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCase {
    Str(&'static str),
    Int(i64),
}

impl EnumCase {
    pub fn to_value(&self) -> Value {
        match self {
            EnumCase::Str(v) => Value::Varchar(Some((*v).to_owned())),
            EnumCase::Int(v) => Value::Int64(Some(*v)),
        }
    }
    fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (EnumCase::Str(case), Value::Varchar(Some(v))) => case == v,
            (EnumCase::Int(case), Value::Int64(Some(v))) => case == v,
            (EnumCase::Int(case), Value::Varchar(Some(v))) => {
                <i64 as AsValue>::parse(v.trim()).is_ok_and(|v| v == *case)
            }
            _ => false,
        }
    }
}

impl Display for EnumCase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            EnumCase::Str(v) => write!(f, "'{v}'"),
            EnumCase::Int(v) => write!(f, "{v}"),
        }
    }
}

/// Enum whose variants are stored as fixed strings or integers.
///
/// ```rust
/// use keel_core::{BackedEnum, EnumCase};
/// enum Status {
///     Draft,
///     Published,
/// }
/// impl BackedEnum for Status {
///     const NAME: &'static str = "Status";
///     const CASES: &'static [EnumCase] = &[EnumCase::Str("draft"), EnumCase::Str("published")];
/// }
/// ```
pub trait BackedEnum {
    const NAME: &'static str;
    const CASES: &'static [EnumCase];
}

/// The declared cases of a [`BackedEnum`], usable in a `const` cast table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumCast {
    pub name: &'static str,
    pub cases: &'static [EnumCase],
}

impl EnumCast {
    pub const fn of<T: BackedEnum>() -> Self {
        Self {
            name: T::NAME,
            cases: T::CASES,
        }
    }

    pub fn resolve(&self, value: &Value) -> Result<Value> {
        match self.cases.iter().find(|case| case.matches(value)) {
            Some(case) => Ok(case.to_value()),
            None => Err(Error::type_error(format!(
                "Value {value} is not a case of enum {}",
                self.name
            ))),
        }
    }
}

fn cast_error(cast: &Cast, value: &Value) -> Error {
    Error::type_error(format!(
        "Cannot apply the {cast} cast to {} value {value}",
        value.type_name()
    ))
}

impl Cast {
    /// Parse a cast tag, `array`, `json`, `bool`, `int`, `float`, `string` or `datetime`.
    pub fn parse(tag: &str) -> Option<Self> {
        Some(match tag.trim().to_ascii_lowercase().as_str() {
            "array" => Cast::Array,
            "json" | "object" => Cast::Json,
            "bool" | "boolean" => Cast::Bool,
            "int" | "integer" => Cast::Int,
            "float" | "double" | "real" => Cast::Float,
            "string" | "str" => Cast::String,
            "datetime" | "timestamp" => Cast::Datetime,
            _ => return None,
        })
    }

    /// Stored scalar (or user input) to in-memory value.
    pub fn decode(&self, value: Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self {
            Cast::Array | Cast::Json => {
                let json = match value {
                    Value::Json(Some(v)) => v,
                    Value::Varchar(Some(ref v)) => <serde_json::Value as AsValue>::parse(v)?,
                    Value::List(..) => serde_json::to_value(&value)
                        .map_err(|e| Error::type_error(e.to_string()))?,
                    _ => return Err(cast_error(self, &value)),
                };
                if *self == Cast::Array && !(json.is_array() || json.is_object()) {
                    return Err(Error::type_error(format!(
                        "JSON value {json} is neither an array nor an object"
                    )));
                }
                Ok(Value::Json(Some(json)))
            }
            Cast::Bool => match value {
                Value::Boolean(..) => Ok(value),
                Value::Int64(Some(v @ (0 | 1))) => Ok(Value::Boolean(Some(v == 1))),
                Value::Varchar(Some(ref v)) => match v.trim() {
                    "0" | "false" => Ok(Value::Boolean(Some(false))),
                    "1" | "true" => Ok(Value::Boolean(Some(true))),
                    _ => Err(cast_error(self, &value)),
                },
                _ => Err(cast_error(self, &value)),
            },
            Cast::Int => match value {
                Value::Int64(..) => Ok(value),
                Value::Boolean(Some(v)) => Ok(Value::Int64(Some(v as i64))),
                Value::Float64(Some(v)) if v.fract() == 0.0 => {
                    i64::try_from_value(value).map(AsValue::as_value)
                }
                Value::Decimal(..) | Value::Varchar(..) => {
                    i64::try_from_value(value).map(AsValue::as_value)
                }
                _ => Err(cast_error(self, &value)),
            },
            Cast::Float => match value {
                Value::Float64(..) => Ok(value),
                Value::Int64(..) | Value::Decimal(..) | Value::Varchar(..) => {
                    f64::try_from_value(value).map(AsValue::as_value)
                }
                _ => Err(cast_error(self, &value)),
            },
            Cast::String => match value {
                Value::Varchar(..) => Ok(value),
                Value::Boolean(Some(v)) => Ok(Value::Varchar(Some(v.to_string()))),
                Value::Int64(Some(v)) => Ok(Value::Varchar(Some(v.to_string()))),
                Value::Float64(Some(v)) => Ok(Value::Varchar(Some(v.to_string()))),
                Value::Decimal(Some(v)) => Ok(Value::Varchar(Some(v.to_string()))),
                Value::Uuid(Some(v)) => Ok(Value::Varchar(Some(v.to_string()))),
                _ => Err(cast_error(self, &value)),
            },
            Cast::Datetime => match value {
                Value::Timestamp(..) => Ok(value),
                Value::Date(Some(v)) => Ok(Value::Timestamp(Some(v.midnight()))),
                Value::Int64(Some(v)) => {
                    let utc = OffsetDateTime::from_unix_timestamp(v)
                        .map_err(|e| Error::type_error(format!("Timestamp {v}: {e}")))?;
                    Ok(Value::Timestamp(Some(PrimitiveDateTime::new(
                        utc.date(),
                        utc.time(),
                    ))))
                }
                Value::Varchar(Some(ref v)) => <PrimitiveDateTime as AsValue>::parse(v).map(AsValue::as_value),
                _ => Err(cast_error(self, &value)),
            },
            Cast::Enum(cast) => cast.resolve(&value),
        }
    }

    /// In-memory value to the scalar written to storage.
    pub fn encode(&self, value: &Value) -> Result<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match (self, value) {
            (Cast::Array | Cast::Json, Value::Json(Some(v))) => {
                Ok(Value::Varchar(Some(v.to_string())))
            }
            (Cast::Bool, Value::Boolean(Some(v))) => Ok(Value::Int64(Some(*v as i64))),
            (Cast::Int, Value::Int64(..))
            | (Cast::Float, Value::Float64(..))
            | (Cast::String, Value::Varchar(..)) => Ok(value.clone()),
            (Cast::Float, Value::Decimal(Some(v))) => Ok(Value::Float64(v.to_f64())),
            (Cast::Datetime, Value::Timestamp(Some(v))) => {
                let mut out = String::with_capacity(32);
                write_timestamp(&mut out, v);
                Ok(Value::Varchar(Some(out)))
            }
            (Cast::Enum(cast), _) => cast.resolve(value),
            _ => self.decode(value.clone()).and_then(|v| {
                if v.same_type(value) {
                    Err(cast_error(self, value))
                } else {
                    self.encode(&v)
                }
            }),
        }
    }
}

impl Display for Cast {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Cast::Array => f.write_str("array"),
            Cast::Json => f.write_str("json"),
            Cast::Bool => f.write_str("bool"),
            Cast::Int => f.write_str("int"),
            Cast::Float => f.write_str("float"),
            Cast::String => f.write_str("string"),
            Cast::Datetime => f.write_str("datetime"),
            Cast::Enum(cast) => write!(f, "enum {}", cast.name),
        }
    }
}
