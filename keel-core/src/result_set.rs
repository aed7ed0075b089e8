use crate::{Error, Result, RowLabeled, Value};
use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use std::{fmt, slice};

/// Plain hydration target: column name to value, in select order.
pub type Record = IndexMap<String, Value>;

/// Conversion of one raw row into a hydrated element.
pub trait FromRow: Sized {
    fn from_row(row: &RowLabeled) -> Result<Self>;
}

impl FromRow for Record {
    fn from_row(row: &RowLabeled) -> Result<Self> {
        Ok(row
            .labels
            .iter()
            .cloned()
            .zip(row.values.iter().cloned())
            .collect())
    }
}

impl FromRow for RowLabeled {
    fn from_row(row: &RowLabeled) -> Result<Self> {
        Ok(row.clone())
    }
}

/// Rows of one query, hydrated into `T` on first access and cached after.
///
/// The set is not consumed by reading it: indexing, counting and iterating
/// can be repeated and all share the same hydrated elements.
pub struct ResultSet<T = Record> {
    rows: Vec<RowLabeled>,
    items: OnceCell<Vec<T>>,
}

impl<T> ResultSet<T> {
    pub fn new(rows: Vec<RowLabeled>) -> Self {
        Self {
            rows,
            items: OnceCell::new(),
        }
    }

    /// Raw rows, as returned by the driver.
    pub fn rows(&self) -> &[RowLabeled] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether hydration already ran.
    pub fn is_hydrated(&self) -> bool {
        self.items.get().is_some()
    }

    /// Named field of the first row.
    pub fn column(&self, name: &str) -> Result<Value> {
        let row = self
            .rows
            .first()
            .ok_or_else(|| Error::not_found(format!("no row to read column `{name}` from")))?;
        field(row, name).cloned()
    }

    /// Named field of every row, in order.
    pub fn column_values(&self, name: &str) -> Result<Vec<Value>> {
        self.rows
            .iter()
            .map(|row| field(row, name).cloned())
            .collect()
    }

    /// First column of the first row.
    pub fn scalar(&self) -> Result<Value> {
        self.rows
            .first()
            .and_then(|row| row.values.first())
            .cloned()
            .ok_or_else(|| Error::not_found("no row to read a scalar from"))
    }
}

fn field<'a>(row: &'a RowLabeled, name: &str) -> Result<&'a Value> {
    row.get_column(name)
        .ok_or_else(|| Error::configuration(format!("Column `{name}` is not in the result")))
}

impl<T: FromRow> ResultSet<T> {
    fn items(&self) -> Result<&Vec<T>> {
        self.items
            .get_or_try_init(|| self.rows.iter().map(T::from_row).collect())
    }

    /// Every element, in row order.
    pub fn all(&self) -> Result<&[T]> {
        self.items().map(Vec::as_slice)
    }

    pub fn get(&self, index: usize) -> Result<Option<&T>> {
        Ok(self.items()?.get(index))
    }

    pub fn first(&self) -> Result<Option<&T>> {
        self.get(0)
    }

    pub fn iter(&self) -> Result<slice::Iter<'_, T>> {
        Ok(self.items()?.iter())
    }

    /// Invoke `visitor` once per element, in order.
    pub fn each(&self, mut visitor: impl FnMut(&T)) -> Result<()> {
        self.items()?.iter().for_each(|v| visitor(v));
        Ok(())
    }

    /// Elements keyed by the value of field `key`, a later duplicate overwrites an earlier one.
    pub fn index_by(&self, key: &str) -> Result<IndexMap<Value, &T>> {
        let items = self.items()?;
        let mut result = IndexMap::with_capacity(items.len());
        for (row, item) in self.rows.iter().zip(items) {
            result.insert(field(row, key)?.clone(), item);
        }
        Ok(result)
    }

    pub fn into_vec(self) -> Result<Vec<T>> {
        match self.items.into_inner() {
            Some(items) => Ok(items),
            None => self.rows.iter().map(T::from_row).collect(),
        }
    }
}

impl<T> fmt::Debug for ResultSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSet")
            .field("rows", &self.rows)
            .field("hydrated", &self.is_hydrated())
            .finish()
    }
}
