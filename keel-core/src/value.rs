use crate::{write_date, write_time, write_timestamp};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer, ser::SerializeSeq};
use std::{
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    mem,
};
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Dynamically typed scalar moving between rows, attributes and SQL literals.
///
/// Typed variants carry `None` to represent a typed NULL, `Value::Null` is the
/// untyped one. All NULLs compare equal to each other.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int64(Option<i64>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
    Json(Option<serde_json::Value>),
    List(Option<Vec<Value>>, /* type: */ Box<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int64(None)
            | Value::Float64(None)
            | Value::Decimal(None)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::Uuid(None)
            | Value::Json(None)
            | Value::List(None, ..) => true,
            _ => false,
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(.., l), Self::List(.., r)) => l.same_type(r),
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }

    /// Elements of a list value, `None` for anything else.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(Some(v), ..) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(Some(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(Some(v)) => Some(*v),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(..) => "boolean",
            Value::Int64(..) => "integer",
            Value::Float64(..) => "float",
            Value::Decimal(..) => "decimal",
            Value::Varchar(..) => "text",
            Value::Blob(..) => "blob",
            Value::Date(..) => "date",
            Value::Time(..) => "time",
            Value::Timestamp(..) => "timestamp",
            Value::Uuid(..) => "uuid",
            Value::Json(..) => "json",
            Value::List(..) => "list",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (l, r) if l.is_null() || r.is_null() => l.is_null() && r.is_null(),
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            // Bitwise, to agree with `Hash`
            (Self::Float64(l), Self::Float64(r)) => l.map(f64::to_bits) == r.map(f64::to_bits),
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Json(l), Self::Json(r)) => l == r,
            (Self::List(l, ..), Self::List(r, ..)) => l == r,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        if self.is_null() {
            state.write_u8(0);
            return;
        }
        mem::discriminant(self).hash(state);
        match self {
            Value::Boolean(v) => v.hash(state),
            Value::Int64(v) => v.hash(state),
            Value::Float64(v) => v.map(f64::to_bits).hash(state),
            Value::Decimal(v) => v.hash(state),
            Value::Varchar(v) => v.hash(state),
            Value::Blob(v) => v.hash(state),
            Value::Date(v) => v.hash(state),
            Value::Time(v) => v.hash(state),
            Value::Timestamp(v) => v.hash(state),
            Value::Uuid(v) => v.hash(state),
            Value::Json(v) => v.as_ref().map(ToString::to_string).hash(state),
            Value::List(v, ..) => v.hash(state),
            Value::Null => {}
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("NULL");
        }
        match self {
            Value::Boolean(Some(v)) => write!(f, "{v}"),
            Value::Int64(Some(v)) => write!(f, "{v}"),
            Value::Float64(Some(v)) => write!(f, "{v}"),
            Value::Decimal(Some(v)) => write!(f, "{v}"),
            Value::Varchar(Some(v)) => write!(f, "'{v}'"),
            Value::Blob(Some(v)) => write!(f, "x'{}'", hex::encode(v)),
            Value::Uuid(Some(v)) => write!(f, "'{v}'"),
            Value::Json(Some(v)) => write!(f, "{v}"),
            Value::List(Some(v), ..) => {
                f.write_str("[")?;
                for (i, v) in v.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            }
            Value::Date(..) | Value::Time(..) | Value::Timestamp(..) => {
                write!(f, "'{}'", temporal_text(self))
            }
            _ => f.write_str("NULL"),
        }
    }
}

/// Text form of a date, time or timestamp value, empty for anything else.
pub(crate) fn temporal_text(value: &Value) -> String {
    let mut out = String::with_capacity(32);
    match value {
        Value::Date(Some(v)) => write_date(&mut out, v),
        Value::Time(Some(v)) => write_time(&mut out, v),
        Value::Timestamp(Some(v)) => write_timestamp(&mut out, v),
        _ => {}
    }
    out
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_null() {
            return serializer.serialize_none();
        }
        match self {
            Value::Boolean(Some(v)) => serializer.serialize_bool(*v),
            Value::Int64(Some(v)) => serializer.serialize_i64(*v),
            Value::Float64(Some(v)) => serializer.serialize_f64(*v),
            Value::Decimal(Some(v)) => serializer.serialize_str(&v.to_string()),
            Value::Varchar(Some(v)) => serializer.serialize_str(v),
            Value::Blob(Some(v)) => serializer.serialize_bytes(v),
            Value::Uuid(Some(v)) => serializer.serialize_str(&v.to_string()),
            Value::Json(Some(v)) => v.serialize(serializer),
            Value::List(Some(v), ..) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for item in v {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Date(..) | Value::Time(..) | Value::Timestamp(..) => {
                serializer.serialize_str(&temporal_text(self))
            }
            _ => serializer.serialize_none(),
        }
    }
}
