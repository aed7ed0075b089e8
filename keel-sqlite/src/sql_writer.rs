use keel_core::{Context, SqlWriter};

/// SQLite dialect: backtick quoted identifiers, no row locks.
#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteSqlWriter {}

impl SqliteSqlWriter {
    pub const fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(context, out, value, '`', "``");
        out.push('`');
    }

    fn write_value_infinity(&self, _context: &mut Context, out: &mut String, negative: bool) {
        if negative {
            out.push('-');
        }
        out.push_str("1.0e+10000");
    }

    // NaN is stored as NULL
    fn write_value_nan(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) {
        match (limit, offset) {
            (Some(limit), _) => {
                out.push_str(" LIMIT ");
                out.push_str(&limit.to_string());
            }
            // OFFSET is only accepted after a LIMIT
            (None, Some(..)) => out.push_str(" LIMIT -1"),
            (None, None) => {}
        }
        if let Some(offset) = offset {
            out.push_str(" OFFSET ");
            out.push_str(&offset.to_string());
        }
    }

    fn write_lock(&self, _context: &mut Context, _out: &mut String) {
        log::warn!("SQLite does not support row locks, FOR UPDATE is omitted");
    }
}
