use crate::{AsValue, Value};
use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Verbatim SQL fragment, written as is in every render mode.
///
/// The text is trusted: it bypasses identifier quoting and parameter binding,
/// so it must never carry unchecked user input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Raw(pub String);

impl Raw {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Shorthand for [`Raw::new`].
pub fn raw(sql: impl Into<String>) -> Raw {
    Raw::new(sql)
}

/// Marks a right hand side as a column reference instead of a literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column(pub String);

/// Shorthand for a [`Column`] operand, `col("posts.author_id")`.
pub fn col(name: impl Into<String>) -> Column {
    Column(name.into())
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Column name, dotted names are quoted part by part, `*` is written bare.
    Column(String),
    Value(Value),
    Raw(Raw),
}

impl Operand {
    pub fn is_null(&self) -> bool {
        matches!(self, Operand::Value(v) if v.is_null())
    }
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Operand::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<Raw> for Operand {
    fn from(value: Raw) -> Self {
        Operand::Raw(value)
    }
}

impl From<Column> for Operand {
    fn from(value: Column) -> Self {
        Operand::Column(value.0)
    }
}

/// A bare string is a text literal, columns on the right hand side go through [`col`].
impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Value(value.into())
    }
}

macro_rules! impl_operand_from {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for Operand {
                fn from(value: $source) -> Self {
                    Operand::Value(value.as_value())
                }
            }
        )+
    };
}
impl_operand_from!(
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

impl<T: AsValue> From<Option<T>> for Operand {
    fn from(value: Option<T>) -> Self {
        Operand::Value(value.as_value())
    }
}

impl<T: AsValue> From<Vec<T>> for Operand {
    fn from(value: Vec<T>) -> Self {
        Operand::Value(value.as_value())
    }
}

impl<T: AsValue, const N: usize> From<[T; N]> for Operand {
    fn from(value: [T; N]) -> Self {
        Operand::Value(Vec::from(value).as_value())
    }
}

/// Ordered pair of bounds, as taken by `BETWEEN`.
impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Operand {
    fn from((low, high): (A, B)) -> Self {
        Operand::Value(Value::List(
            Some(vec![low.into(), high.into()]),
            Box::new(Value::Null),
        ))
    }
}
