use crate::{Value, truncate_long};
use std::{
    fmt::{self, Display},
    sync::Arc,
};

/// A statement ready to be handed to an [`crate::Executor`].
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// SQL text run verbatim, possibly several statements.
    Raw(String),
    /// A single statement with placeholders and the values bound to them, in order.
    Bound { sql: String, parameters: Vec<Value> },
}

impl Query {
    pub fn sql(&self) -> &str {
        match self {
            Query::Raw(sql) | Query::Bound { sql, .. } => sql,
        }
    }
    pub fn parameters(&self) -> &[Value] {
        match self {
            Query::Raw(..) => &[],
            Query::Bound { parameters, .. } => parameters,
        }
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::Raw(Default::default())
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Query::Raw(value.into())
    }
}

impl From<String> for Query {
    fn from(value: String) -> Self {
        Query::Raw(value)
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", truncate_long!(self.sql()))?;
        if let Query::Bound { parameters, .. } = self
            && !parameters.is_empty()
        {
            f.write_str(" -- [")?;
            for (i, v) in parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{v}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Metadata about modify operations (INSERT/UPDATE/DELETE).
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    /// Total number of rows impacted.
    pub rows_affected: u64,
    /// Key generated by the last insert, when the backend reports one.
    pub last_affected_id: Option<i64>,
}

/// Shared reference-counted column name list.
pub type RowNames = Arc<[String]>;
/// Owned row value slice matching `RowNames` length.
pub type Row = Box<[Value]>;

/// A result row with its corresponding column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    pub labels: RowNames,
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .and_then(|i| self.values.get(i))
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Items produced by `Executor::run`: rows and modify results.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Row(RowLabeled),
    Affected(RowsAffected),
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

impl From<RowLabeled> for QueryResult {
    fn from(value: RowLabeled) -> Self {
        QueryResult::Row(value)
    }
}

impl From<RowsAffected> for QueryResult {
    fn from(value: RowsAffected) -> Self {
        QueryResult::Affected(value)
    }
}
