use crate::{Connection, SqlWriter};

/// A database backend: its connection type and its SQL dialect.
pub trait Driver {
    type Connection: Connection;
    type SqlWriter: SqlWriter;

    /// URL scheme accepted by [`Connection::connect`].
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
