use crate::{
    Condition, Conditions, Error, Join, JoinType, Operand, Operator, Order, Result, SelectItem,
    Statement, StatementKind, TableRef, Value, separated_by, try_separated_by, write_date,
    write_time, write_timestamp,
    writer::{Context, Fragment},
};

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($this:ident, $context:ident,$out:ident, $value:expr) => {{
        if $value.is_infinite() {
            $this.write_value_infinity($context, $out, $value.is_sign_negative());
        } else if $value.is_nan() {
            $this.write_value_nan($context, $out);
        } else {
            let mut buffer = ryu::Buffer::new();
            $out.push_str(buffer.format($value));
        }
    }};
}

/// Dialect printer turning condition trees and statements into SQL text.
///
/// Every method has a default rendering, dialects override the few places
/// where their syntax differs. Identifiers and literals always go through
/// [`SqlWriter::write_identifier_quoted`] and [`SqlWriter::write_value`], the
/// compiler never hardcodes quoting.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Whether the current fragment context allows alias declaration.
    fn alias_declaration(&self, context: &mut Context) -> bool {
        matches!(
            context.fragment,
            Fragment::SqlSelectFrom | Fragment::SqlJoin
        )
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &mut Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(context, out, value, '"', "\"\"");
        out.push('"');
    }

    /// Quoted identifier as an owned string.
    fn quote_identifier(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 2);
        self.write_identifier_quoted(&mut Context::default(), &mut out, value);
        out
    }

    /// Literal as an owned string.
    fn quote_literal(&self, value: &Value) -> String {
        let mut out = String::with_capacity(16);
        self.write_value(&mut Context::default(), &mut out, value);
        out
    }

    /// Column name, `a.b` is quoted part by part and `*` is left bare.
    fn write_column_name(&self, context: &mut Context, out: &mut String, value: &str) {
        separated_by(
            out,
            value.split('.'),
            |out, part| {
                if part == "*" {
                    out.push('*');
                } else {
                    self.write_identifier_quoted(context, out, part);
                }
            },
            ".",
        );
    }

    /// Render a table reference, the alias is declared only in FROM and JOIN.
    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        self.write_identifier_quoted(context, out, &value.name);
        if !value.alias.is_empty() && self.alias_declaration(context) {
            out.push_str(" AS ");
            self.write_identifier_quoted(context, out, &value.alias);
        }
    }

    /// Render a concrete value (including proper quoting / escaping).
    fn write_value(&self, context: &mut Context, out: &mut String, value: &Value) {
        match value {
            v if v.is_null() => self.write_value_none(context, out),
            Value::Boolean(Some(v)) => self.write_value_bool(context, out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float64(Some(v)) => write_float!(self, context, out, *v),
            Value::Decimal(Some(v)) => out.push_str(&v.to_string()),
            Value::Varchar(Some(v)) => self.write_value_string(context, out, v),
            Value::Blob(Some(v)) => self.write_value_blob(context, out, v),
            Value::Date(Some(v)) => {
                out.push('\'');
                write_date(out, v);
                out.push('\'');
            }
            Value::Time(Some(v)) => {
                out.push('\'');
                write_time(out, v);
                out.push('\'');
            }
            Value::Timestamp(Some(v)) => {
                out.push('\'');
                write_timestamp(out, v);
                out.push('\'');
            }
            Value::Uuid(Some(v)) => {
                out.push('\'');
                out.push_str(&v.to_string());
                out.push('\'');
            }
            Value::Json(Some(v)) => self.write_value_string(context, out, &v.to_string()),
            Value::List(Some(v), ..) => self.write_value_list(context, out, v),
            _ => self.write_value_none(context, out),
        }
    }

    /// Render NULL literal.
    fn write_value_none(&self, _context: &mut Context, out: &mut String) {
        out.push_str("NULL");
    }

    /// Render boolean literal.
    fn write_value_bool(&self, _context: &mut Context, out: &mut String, value: bool) {
        out.push_str(["false", "true"][value as usize]);
    }

    fn write_value_infinity(&self, _context: &mut Context, out: &mut String, negative: bool) {
        if negative {
            out.push('-');
        }
        out.push_str("'Infinity'");
    }

    fn write_value_nan(&self, _context: &mut Context, out: &mut String) {
        out.push_str("'NaN'");
    }

    /// Render a string literal between single quotes, doubling inner quotes.
    fn write_value_string(&self, context: &mut Context, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(context, out, value, '\'', "''");
        out.push('\'');
    }

    /// Render a blob literal as `X'..'`.
    fn write_value_blob(&self, _context: &mut Context, out: &mut String, value: &[u8]) {
        out.push_str("X'");
        out.push_str(&hex::encode_upper(value));
        out.push('\'');
    }

    /// Render a list literal as a parenthesized tuple.
    fn write_value_list(&self, context: &mut Context, out: &mut String, value: &[Value]) {
        out.push('(');
        separated_by(
            out,
            value,
            |out, v| {
                self.write_value(context, out, v);
            },
            ", ",
        );
        out.push(')');
    }

    /// Render parameter placeholder, `index` is 1-based.
    fn write_placeholder(&self, _context: &mut Context, out: &mut String, _index: u32) {
        out.push('?');
    }

    /// Render a value as a placeholder when binding, as a literal otherwise.
    fn write_parameter(&self, context: &mut Context, out: &mut String, value: &Value) {
        if context.bind {
            let index = context.push_parameter(value.clone());
            self.write_placeholder(context, out, index);
        } else {
            self.write_value(context, out, value);
        }
    }

    fn write_operand(&self, context: &mut Context, out: &mut String, value: &Operand) {
        match value {
            Operand::Column(v) => self.write_column_name(context, out, v),
            Operand::Value(v) => self.write_parameter(context, out, v),
            Operand::Raw(v) => out.push_str(v.as_str()),
        }
    }

    /// Render a single predicate.
    fn write_comparison(
        &self,
        context: &mut Context,
        out: &mut String,
        column: &Operand,
        operator: &Operator,
        value: &Operand,
    ) -> Result<()> {
        let Some(sql) = operator.as_sql() else {
            return Err(Error::configuration(format!(
                "Unknown operator `{operator}`"
            )));
        };
        match operator {
            Operator::Equal | Operator::NotEqual | Operator::Is | Operator::IsNot
                if value.is_null() =>
            {
                self.write_operand(context, out, column);
                out.push_str(
                    if matches!(operator, Operator::Equal | Operator::Is) {
                        " IS NULL"
                    } else {
                        " IS NOT NULL"
                    },
                );
            }
            Operator::IsNull | Operator::IsNotNull => {
                if !value.is_null() {
                    return Err(Error::configuration(format!(
                        "`{operator}` takes no right hand side, got {value:?}"
                    )));
                }
                self.write_operand(context, out, column);
                out.push(' ');
                out.push_str(sql);
            }
            Operator::In | Operator::NotIn => match value {
                Operand::Value(Value::List(Some(items), ..)) if items.is_empty() => {
                    // Nothing is in an empty set
                    out.push_str(if *operator == Operator::In {
                        "1 = 0"
                    } else {
                        "1 = 1"
                    });
                }
                Operand::Value(Value::List(Some(items), ..)) => {
                    self.write_operand(context, out, column);
                    out.push(' ');
                    out.push_str(sql);
                    out.push_str(" (");
                    separated_by(
                        out,
                        items,
                        |out, v| self.write_parameter(context, out, v),
                        ", ",
                    );
                    out.push(')');
                }
                _ => {
                    self.write_operand(context, out, column);
                    out.push(' ');
                    out.push_str(sql);
                    out.push_str(" (");
                    self.write_operand(context, out, value);
                    out.push(')');
                }
            },
            Operator::Between => {
                let Some([low, high]) = value
                    .as_value()
                    .and_then(Value::as_list)
                    .and_then(|v| <&[Value; 2]>::try_from(v).ok())
                else {
                    return Err(Error::configuration(format!(
                        "BETWEEN requires exactly two bounds, got {}",
                        value.as_value().map_or("a non list operand".into(), |v| v.to_string())
                    )));
                };
                self.write_operand(context, out, column);
                out.push_str(" BETWEEN ");
                self.write_parameter(context, out, low);
                out.push_str(" AND ");
                self.write_parameter(context, out, high);
            }
            _ => {
                self.write_operand(context, out, column);
                out.push(' ');
                out.push_str(sql);
                out.push(' ');
                self.write_operand(context, out, value);
            }
        }
        Ok(())
    }

    fn write_condition(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Condition,
    ) -> Result<()> {
        match value {
            Condition::Comparison {
                column,
                operator,
                value,
            } => self.write_comparison(context, out, column, operator, value),
            Condition::Raw(v) => {
                out.push_str(v.as_str());
                Ok(())
            }
            Condition::Group(v) => {
                out.push('(');
                self.write_conditions(context, out, v)?;
                out.push(')');
                Ok(())
            }
        }
    }

    /// Render a condition tree. The root is never parenthesized, nested groups
    /// always are and empty groups are skipped along with their connective.
    fn write_conditions(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Conditions,
    ) -> Result<()> {
        value.check()?;
        let mut first = true;
        for (connective, condition) in value.children() {
            if condition.is_empty() {
                continue;
            }
            if !first {
                out.push(' ');
                out.push_str(connective.as_sql());
                out.push(' ');
            }
            first = false;
            self.write_condition(context, out, condition)?;
        }
        Ok(())
    }

    /// Render join keyword(s) for the given join type.
    fn write_join_type(&self, _context: &mut Context, out: &mut String, join_type: &JoinType) {
        out.push_str(match join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
            JoinType::Cross => "CROSS JOIN",
        });
    }

    /// Render a JOIN clause.
    fn write_join(&self, context: &mut Context, out: &mut String, join: &Join) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlJoin);
        self.write_join_type(&mut context, out, &join.join);
        out.push(' ');
        self.write_table_ref(&mut context, out, &join.table);
        if !join.on.is_empty() {
            out.push_str(" ON (");
            self.write_conditions(
                &mut context.switch_fragment(Fragment::SqlJoinOn),
                out,
                &join.on,
            )?;
            out.push(')');
        }
        Ok(())
    }

    /// Render a select list entry, plain names are qualified with the target table.
    fn write_select_item(
        &self,
        context: &mut Context,
        out: &mut String,
        table: &TableRef,
        item: &SelectItem,
    ) {
        let write_name = |context: &mut Context, out: &mut String, name: &str| {
            if context.qualify_columns && !name.contains('.') {
                self.write_identifier_quoted(context, out, table.qualifier());
                out.push('.');
            }
            self.write_column_name(context, out, name);
        };
        match item {
            SelectItem::Column(name) => write_name(context, out, name),
            SelectItem::Aliased(name, alias) => {
                write_name(context, out, name);
                out.push_str(" AS ");
                self.write_identifier_quoted(context, out, alias);
            }
            SelectItem::Raw(v) => out.push_str(v.as_str()),
        }
    }

    fn write_order(&self, context: &mut Context, out: &mut String, column: &str, order: &Order) {
        self.write_column_name(context, out, column);
        out.push(' ');
        out.push_str(order.as_sql());
    }

    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) {
        if let Some(limit) = limit {
            out.push_str(" LIMIT ");
            write_integer!(out, limit);
        }
        if let Some(offset) = offset {
            out.push_str(" OFFSET ");
            write_integer!(out, offset);
        }
    }

    /// Render the row lock modifier.
    fn write_lock(&self, _context: &mut Context, out: &mut String) {
        out.push_str(" FOR UPDATE");
    }

    /// Emit SELECT statement, clauses in fixed order.
    fn write_select(
        &self,
        context: &mut Context,
        out: &mut String,
        statement: &Statement,
    ) -> Result<()> {
        let table = statement.target()?;
        out.reserve(128);
        out.push_str("SELECT ");
        if statement.distinct {
            out.push_str("DISTINCT ");
        }
        {
            let mut context = context.switch_fragment(Fragment::SqlSelect);
            match &statement.select {
                Some(items) if !items.is_empty() => separated_by(
                    out,
                    items,
                    |out, item| self.write_select_item(&mut context, out, table, item),
                    ", ",
                ),
                _ => {
                    self.write_identifier_quoted(&mut context, out, table.qualifier());
                    out.push_str(".*");
                }
            }
        }
        out.push_str(" FROM ");
        self.write_table_ref(
            &mut context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            table,
        );
        for join in &statement.joins {
            out.push(' ');
            self.write_join(context, out, join)?;
        }
        if !statement.wheres.is_empty() {
            out.push_str(" WHERE ");
            self.write_conditions(
                &mut context.switch_fragment(Fragment::SqlSelectWhere),
                out,
                &statement.wheres,
            )?;
        }
        if !statement.group_by.is_empty() {
            out.push_str(" GROUP BY ");
            let mut context = context.switch_fragment(Fragment::SqlSelectGroupBy);
            separated_by(
                out,
                &statement.group_by,
                |out, v| self.write_column_name(&mut context, out, v),
                ", ",
            );
        }
        if !statement.having.is_empty() {
            out.push_str(" HAVING ");
            self.write_conditions(
                &mut context.switch_fragment(Fragment::SqlSelectHaving),
                out,
                &statement.having,
            )?;
        }
        if !statement.order_by.is_empty() {
            out.push_str(" ORDER BY ");
            let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
            separated_by(
                out,
                &statement.order_by,
                |out, (column, order)| self.write_order(&mut context, out, column, order),
                ", ",
            );
        }
        self.write_limit_offset(context, out, statement.limit, statement.offset);
        if statement.lock {
            self.write_lock(context, out);
        }
        Ok(())
    }

    /// Emit INSERT with one or more rows, `DEFAULT VALUES` when no column is given.
    fn write_insert(
        &self,
        context: &mut Context,
        out: &mut String,
        statement: &Statement,
    ) -> Result<()> {
        let table = statement.target()?;
        out.reserve(64 + statement.columns.len() * 16 * (statement.rows.len() + 1));
        out.push_str("INSERT INTO ");
        let mut context = context.switch_fragment(Fragment::SqlInsertInto);
        self.write_table_ref(&mut context, out, table);
        if statement.columns.is_empty() {
            out.push_str(" DEFAULT VALUES");
            return Ok(());
        }
        out.push_str(" (");
        separated_by(
            out,
            &statement.columns,
            |out, v| self.write_identifier_quoted(&mut context, out, v),
            ", ",
        );
        out.push_str(") VALUES ");
        let mut context = context.switch_fragment(Fragment::SqlInsertIntoValues);
        try_separated_by(
            out,
            &statement.rows,
            |out, row| {
                out.push('(');
                separated_by(
                    out,
                    row,
                    |out, v| self.write_operand(&mut context, out, v),
                    ", ",
                );
                out.push(')');
                Ok::<_, Error>(())
            },
            ", ",
        )
    }

    /// Emit UPDATE with its assignments and WHERE clause.
    fn write_update(
        &self,
        context: &mut Context,
        out: &mut String,
        statement: &Statement,
    ) -> Result<()> {
        let table = statement.target()?;
        out.reserve(64 + statement.assignments.len() * 24);
        out.push_str("UPDATE ");
        self.write_table_ref(&mut context.switch_fragment(Fragment::SqlUpdate), out, table);
        out.push_str(" SET ");
        {
            let mut context = context.switch_fragment(Fragment::SqlUpdateSet);
            separated_by(
                out,
                &statement.assignments,
                |out, (column, value)| {
                    self.write_identifier_quoted(&mut context, out, column);
                    out.push_str(" = ");
                    self.write_operand(&mut context, out, value);
                },
                ", ",
            );
        }
        if !statement.wheres.is_empty() {
            out.push_str(" WHERE ");
            self.write_conditions(
                &mut context.switch_fragment(Fragment::SqlUpdateWhere),
                out,
                &statement.wheres,
            )?;
        }
        Ok(())
    }

    /// Emit DELETE statement with WHERE clause.
    fn write_delete(
        &self,
        context: &mut Context,
        out: &mut String,
        statement: &Statement,
    ) -> Result<()> {
        let table = statement.target()?;
        out.push_str("DELETE FROM ");
        self.write_table_ref(
            &mut context.switch_fragment(Fragment::SqlDeleteFrom),
            out,
            table,
        );
        if !statement.wheres.is_empty() {
            out.push_str(" WHERE ");
            self.write_conditions(
                &mut context.switch_fragment(Fragment::SqlDeleteFromWhere),
                out,
                &statement.wheres,
            )?;
        }
        Ok(())
    }

    /// Validate then emit any statement.
    fn write_statement(
        &self,
        context: &mut Context,
        out: &mut String,
        statement: &Statement,
    ) -> Result<()> {
        statement.check()?;
        match statement.kind {
            StatementKind::Select => self.write_select(context, out, statement),
            StatementKind::Insert => self.write_insert(context, out, statement),
            StatementKind::Update => self.write_update(context, out, statement),
            StatementKind::Delete => self.write_delete(context, out, statement),
        }
    }
}

/// Fallback generic SQL writer, ANSI double quoted identifiers.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    /// Construct a new generic writer.
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
