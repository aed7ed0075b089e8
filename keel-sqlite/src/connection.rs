use crate::{
    CBox, SqliteDriver, error_message_from_ptr,
    extract::{extract_name, extract_value},
};
use anyhow::{Context as _, Error, Result};
use keel_core::{
    Connection, Driver, Executor, Query, QueryResult, RowLabeled, RowNames, RowsAffected, Value,
    truncate_long, write_date, write_time, write_timestamp,
};
use libsqlite3_sys::*;
use rust_decimal::prelude::ToPrimitive;
use std::{
    ffi::{CString, c_char, c_int, c_void},
    ptr,
    sync::Arc,
};

/// Connection to a SQLite database file (or an in-memory database).
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
}

fn finalize(statement: *mut sqlite3_stmt) {
    unsafe {
        sqlite3_finalize(statement);
    }
}

fn last_error(connection: *mut sqlite3) -> Error {
    unsafe { Error::msg(error_message_from_ptr(&sqlite3_errmsg(connection)).to_string()) }
}

fn is_insert(sql: &str) -> bool {
    let keyword = sql
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

impl SqliteConnection {
    /// Compile the first statement of `sql`, returns it with the byte length consumed.
    /// The statement is null when only whitespace or comments were left.
    fn prepare(&mut self, sql: &str) -> Result<(CBox<*mut sqlite3_stmt>, usize)> {
        let mut statement = CBox::new(ptr::null_mut(), finalize);
        let mut tail: *const c_char = ptr::null();
        let start = sql.as_ptr() as *const c_char;
        let len = c_int::try_from(sql.len()).context("The query is too long for SQLite")?;
        unsafe {
            let rc = sqlite3_prepare_v2(*self.connection, start, len, &mut *statement, &mut tail);
            if rc != SQLITE_OK {
                let error = last_error(*self.connection).context(format!(
                    "While preparing the query:\n{}",
                    truncate_long!(sql)
                ));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        let consumed = if tail.is_null() {
            sql.len()
        } else {
            tail as usize - start as usize
        };
        Ok((statement, consumed))
    }

    fn bind(&mut self, statement: *mut sqlite3_stmt, index: c_int, value: &Value) -> Result<()> {
        let text = |out: String| unsafe {
            sqlite3_bind_text(
                statement,
                index,
                out.as_ptr() as *const c_char,
                out.len() as c_int,
                SQLITE_TRANSIENT(),
            )
        };
        let rc = unsafe {
            match value {
                v if v.is_null() => sqlite3_bind_null(statement, index),
                Value::Boolean(Some(v)) => sqlite3_bind_int64(statement, index, *v as i64),
                Value::Int64(Some(v)) => sqlite3_bind_int64(statement, index, *v),
                Value::Float64(Some(v)) => sqlite3_bind_double(statement, index, *v),
                Value::Decimal(Some(v)) => sqlite3_bind_double(
                    statement,
                    index,
                    v.to_f64().ok_or_else(|| {
                        Error::msg(format!("Cannot convert the Decimal value `{v}` to f64"))
                    })?,
                ),
                Value::Varchar(Some(v)) => text(v.clone()),
                Value::Blob(Some(v)) => sqlite3_bind_blob(
                    statement,
                    index,
                    v.as_ptr() as *const c_void,
                    v.len() as c_int,
                    SQLITE_TRANSIENT(),
                ),
                Value::Date(Some(v)) => {
                    let mut out = String::with_capacity(10);
                    write_date(&mut out, v);
                    text(out)
                }
                Value::Time(Some(v)) => {
                    let mut out = String::with_capacity(18);
                    write_time(&mut out, v);
                    text(out)
                }
                Value::Timestamp(Some(v)) => {
                    let mut out = String::with_capacity(29);
                    write_timestamp(&mut out, v);
                    text(out)
                }
                Value::Uuid(Some(v)) => text(v.to_string()),
                Value::Json(Some(v)) => text(v.to_string()),
                _ => {
                    let error = Error::msg(format!(
                        "Cannot use a {} value as a query parameter",
                        value.type_name()
                    ));
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
        };
        if rc != SQLITE_OK {
            let error = last_error(*self.connection)
                .context(format!("Cannot bind parameter {index} ({value})"));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }

    /// Step a prepared statement to completion.
    fn run_prepared(
        &mut self,
        statement: *mut sqlite3_stmt,
        sql: &str,
        result: &mut Vec<QueryResult>,
    ) -> Result<()> {
        unsafe {
            let count = sqlite3_column_count(statement);
            let labels: RowNames = (0..count)
                .map(|i| extract_name(statement, i))
                .collect::<Result<Arc<[_]>>>()?;
            let changes = sqlite3_total_changes(*self.connection);
            loop {
                match sqlite3_step(statement) {
                    SQLITE_BUSY => continue,
                    SQLITE_DONE => break,
                    SQLITE_ROW => {
                        let values = (0..count)
                            .map(|i| extract_value(statement, i))
                            .collect::<Result<_>>()?;
                        result.push(RowLabeled::new(labels.clone(), values).into());
                    }
                    _ => {
                        let error = last_error(*self.connection).context(format!(
                            "While executing the query:\n{}",
                            truncate_long!(sql)
                        ));
                        log::error!("{:#}", error);
                        return Err(error);
                    }
                }
            }
            if count == 0 {
                let rows_affected = (sqlite3_total_changes(*self.connection) - changes).max(0) as u64;
                let last_affected_id = if rows_affected > 0 && is_insert(sql) {
                    Some(sqlite3_last_insert_rowid(*self.connection))
                } else {
                    None
                };
                result.push(
                    RowsAffected {
                        rows_affected,
                        last_affected_id,
                    }
                    .into(),
                );
            }
        }
        Ok(())
    }

    /// Run every statement of `sql` in order.
    fn run_unprepared(&mut self, sql: &str) -> Result<Vec<QueryResult>> {
        let mut result = Vec::new();
        let mut remaining = sql;
        while !remaining.trim().is_empty() {
            let (statement, consumed) = self.prepare(remaining)?;
            let current = &remaining[..consumed];
            remaining = &remaining[consumed..];
            if statement.is_null() {
                continue;
            }
            self.run_prepared(*statement, current, &mut result)?;
        }
        Ok(result)
    }

    /// Run a single statement with its parameters bound in order.
    fn run_bound(&mut self, sql: &str, parameters: &[Value]) -> Result<Vec<QueryResult>> {
        let (statement, consumed) = self.prepare(sql)?;
        if !sql[consumed..].trim().is_empty() {
            let error = Error::msg("Cannot bind parameters to more than one statement")
                .context(format!("While preparing the query:\n{}", truncate_long!(sql)));
            log::error!("{:#}", error);
            return Err(error);
        }
        if statement.is_null() {
            return Ok(Vec::new());
        }
        let expected = unsafe { sqlite3_bind_parameter_count(*statement) } as usize;
        if expected != parameters.len() {
            let error = Error::msg(format!(
                "The query expects {expected} parameter(s) but {} were provided",
                parameters.len()
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        for (i, value) in parameters.iter().enumerate() {
            self.bind(*statement, i as c_int + 1, value)?;
        }
        let mut result = Vec::new();
        self.run_prepared(*statement, sql, &mut result)?;
        Ok(result)
    }
}

impl Executor for SqliteConnection {
    type Driver = SqliteDriver;

    fn driver(&self) -> &Self::Driver {
        &SqliteDriver {}
    }

    fn run(&mut self, query: Query) -> Result<Vec<QueryResult>> {
        match query {
            Query::Raw(sql) => self.run_unprepared(&sql),
            Query::Bound { sql, parameters } => self.run_bound(&sql, &parameters),
        }
    }
}

impl Connection for SqliteConnection {
    /// Accepts `sqlite://<path or :memory:>[?<uri parameters>]`.
    fn connect(url: &str) -> Result<SqliteConnection> {
        let prefix = format!("{}://", <Self::Driver as Driver>::NAME);
        let Some(location) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected sqlite connection url to start with `{prefix}`, got `{url}`"
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("Error while decoding connection URL: `{url}`");
        let location = CString::new(format!("file:{location}")).with_context(context)?;
        let mut connection: CBox<*mut sqlite3> = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        unsafe {
            let rc = sqlite3_open_v2(
                location.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
                ptr::null(),
            );
            if rc != SQLITE_OK {
                let error = match connection.is_null() {
                    true => Error::msg("Could not allocate the SQLite connection"),
                    false => last_error(*connection),
                };
                let error = error.context(format!("Could not open `{url}`"));
                log::error!("{:#}", error);
                return Err(error);
            }
        }
        Ok(Self { connection })
    }
}
