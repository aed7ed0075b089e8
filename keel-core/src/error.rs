use crate::Value;
use std::fmt::Display;
use thiserror::Error;

/// Every failure surfaced by the data layer.
///
/// The kinds are never merged: a lookup that finds nothing is `NotFound`, a
/// driver failure is `Storage`, a misuse of the builder is `Configuration` and
/// a value that does not fit its declared cast is `Type`.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid builder use, raised before any statement reaches the driver.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The driver could not execute otherwise valid SQL.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
    /// Strict lookup found no row.
    #[error("Not found: {0}")]
    NotFound(String),
    /// Cast or value conversion failure.
    #[error("Type error: {0}")]
    Type(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }
    /// No row of `table` has `column` equal to `key`.
    pub fn not_found_key(table: impl Display, column: impl Display, key: &Value) -> Self {
        Self::NotFound(format!("no row in `{table}` with `{column}` = {key}"))
    }
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(..))
    }
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(..))
    }
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(..))
    }
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Type(..))
    }
}
