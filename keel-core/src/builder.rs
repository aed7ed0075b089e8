use crate::{
    AsValue, Condition, Conditions, Connective, Driver, Error, Executor, FromRow, Join, JoinType,
    Operand, Operator, Order, Query, Raw, Record, Result, ResultSet, RowLabeled, RowsAffected,
    SelectItem, SqlWriter, Statement, StatementKind, TableRef, Value,
    writer::{Context, Fragment},
};
use std::marker::PhantomData;

/// Fluent accumulator of the clause state of one statement.
///
/// Every chaining method consumes the builder and returns it, so a builder is
/// never aliased while it is being configured. `T` is the shape rows are
/// hydrated into by [`QueryBuilder::get`], a plain [`Record`] by default.
///
/// ```rust
/// use keel_core::{GenericSqlWriter, QueryBuilder};
/// let sql = QueryBuilder::new()
///     .select(["name"])
///     .from("table")
///     .and_where("field", "=", 1)
///     .compile(&GenericSqlWriter)
///     .unwrap();
/// assert_eq!(sql, r#"SELECT "table"."name" FROM "table" WHERE "field" = 1"#);
/// ```
#[derive(Debug)]
pub struct QueryBuilder<T = Record> {
    statement: Statement,
    _hydrate: PhantomData<fn() -> T>,
}

impl<T> Clone for QueryBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            statement: self.statement.clone(),
            _hydrate: PhantomData,
        }
    }
}

impl Default for QueryBuilder<Record> {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder<Record> {
    /// Empty SELECT.
    pub fn new() -> Self {
        Self::from_statement(Statement::new(StatementKind::Select))
    }

    /// SELECT from `table`.
    pub fn table(table: impl Into<TableRef>) -> Self {
        Self::new().from(table)
    }

    /// INSERT into `table`, columns and rows follow with [`QueryBuilder::columns`] and [`QueryBuilder::values`].
    pub fn insert(table: impl Into<TableRef>) -> Self {
        let mut statement = Statement::new(StatementKind::Insert);
        statement.table = Some(table.into());
        Self::from_statement(statement)
    }

    /// INSERT a single row given as `(column, value)` pairs, in order.
    pub fn insert_row<K, V>(
        table: impl Into<TableRef>,
        row: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Operand>,
    {
        let (columns, values): (Vec<String>, Vec<Operand>) =
            row.into_iter().map(|(k, v)| (k.into(), v.into())).unzip();
        let mut result = Self::insert(table);
        result.statement.columns = columns;
        result.statement.rows.push(values);
        result
    }

    pub fn update(table: impl Into<TableRef>) -> Self {
        let mut statement = Statement::new(StatementKind::Update);
        statement.table = Some(table.into());
        Self::from_statement(statement)
    }

    pub fn delete(table: impl Into<TableRef>) -> Self {
        let mut statement = Statement::new(StatementKind::Delete);
        statement.table = Some(table.into());
        Self::from_statement(statement)
    }
}

impl<T> QueryBuilder<T> {
    pub fn from_statement(statement: Statement) -> Self {
        Self {
            statement,
            _hydrate: PhantomData,
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn into_statement(self) -> Statement {
        self.statement
    }

    /// Same state, rows hydrated into `U`.
    pub fn hydrate<U>(self) -> QueryBuilder<U> {
        QueryBuilder::from_statement(self.statement)
    }

    fn misuse(&mut self, message: impl Into<String>) {
        self.statement.errors.push(message.into());
    }

    /// Set the base select list, later calls append to it.
    pub fn select<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SelectItem>,
    {
        self.statement
            .select
            .get_or_insert_with(Vec::new)
            .extend(items.into_iter().map(Into::into));
        self
    }

    /// Append to the select list, keeping `<table>.*` when nothing was selected yet.
    pub fn select_also<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SelectItem>,
    {
        self.statement
            .select
            .get_or_insert_with(|| vec![SelectItem::Column("*".into())])
            .extend(items.into_iter().map(Into::into));
        self
    }

    /// Set or override the target table.
    pub fn from(mut self, table: impl Into<TableRef>) -> Self {
        self.statement.table = Some(table.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.statement.distinct = true;
        self
    }

    /// Attach a secondary source, its predicates follow with [`QueryBuilder::on`].
    pub fn join(mut self, table: impl Into<TableRef>, join: JoinType) -> Self {
        self.statement.joins.push(Join {
            join,
            table: table.into(),
            on: Conditions::new(),
        });
        self
    }

    fn push_on(mut self, connective: Connective, condition: Condition) -> Self {
        match self.statement.joins.last_mut() {
            Some(join) => {
                join.on.push(connective, condition);
            }
            None => self.misuse("join predicate added before any join"),
        }
        self
    }

    /// Column to column predicate of the last join.
    pub fn on(self, left: &str, operator: impl Into<Operator>, right: &str) -> Self {
        self.push_on(
            Connective::And,
            Condition::Comparison {
                column: Operand::Column(left.into()),
                operator: operator.into(),
                value: Operand::Column(right.into()),
            },
        )
    }

    pub fn or_on(self, left: &str, operator: impl Into<Operator>, right: &str) -> Self {
        self.push_on(
            Connective::Or,
            Condition::Comparison {
                column: Operand::Column(left.into()),
                operator: operator.into(),
                value: Operand::Column(right.into()),
            },
        )
    }

    /// Column to value predicate of the last join.
    pub fn on_value(
        self,
        left: &str,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> Self {
        self.push_on(Connective::And, Condition::comparison(left, operator, value))
    }

    pub fn and_where(
        mut self,
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> Self {
        self.statement.wheres.and(column, operator, value);
        self
    }

    pub fn or_where(
        mut self,
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> Self {
        self.statement.wheres.or(column, operator, value);
        self
    }

    /// Verbatim predicate, joined with AND.
    pub fn and_where_raw(mut self, sql: impl Into<String>) -> Self {
        self.statement
            .wheres
            .push(Connective::And, Condition::Raw(Raw::new(sql)));
        self
    }

    pub fn or_where_raw(mut self, sql: impl Into<String>) -> Self {
        self.statement
            .wheres
            .push(Connective::Or, Condition::Raw(Raw::new(sql)));
        self
    }

    /// Parenthesized group joined with AND, filled by `build`.
    pub fn and_where_group(mut self, build: impl FnOnce(&mut Conditions)) -> Self {
        let mut group = Conditions::new();
        build(&mut group);
        self.statement
            .wheres
            .push(Connective::And, Condition::Group(group));
        self
    }

    pub fn or_where_group(mut self, build: impl FnOnce(&mut Conditions)) -> Self {
        let mut group = Conditions::new();
        build(&mut group);
        self.statement
            .wheres
            .push(Connective::Or, Condition::Group(group));
        self
    }

    /// Open a WHERE group joined with AND, closed by [`QueryBuilder::end_group`].
    pub fn begin_group(mut self) -> Self {
        self.statement.wheres.begin_group(Connective::And);
        self
    }

    pub fn or_begin_group(mut self) -> Self {
        self.statement.wheres.begin_group(Connective::Or);
        self
    }

    pub fn end_group(mut self) -> Self {
        self.statement.wheres.end_group();
        self
    }

    /// Replace the WHERE tree.
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.statement.wheres = conditions;
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statement
            .group_by
            .extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn having(
        mut self,
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> Self {
        self.statement.having.and(column, operator, value);
        self
    }

    pub fn or_having(
        mut self,
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> Self {
        self.statement.having.or(column, operator, value);
        self
    }

    pub fn having_group(mut self, build: impl FnOnce(&mut Conditions)) -> Self {
        let mut group = Conditions::new();
        build(&mut group);
        self.statement
            .having
            .push(Connective::And, Condition::Group(group));
        self
    }

    /// Append one ORDER BY entry, entries keep their call order.
    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.statement.order_by.push((column.into(), order));
        self
    }

    pub fn order_by_all<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Order)>,
        S: Into<String>,
    {
        self.statement
            .order_by
            .extend(entries.into_iter().map(|(c, o)| (c.into(), o)));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.statement.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.statement.offset = Some(offset);
        self
    }

    /// Lock the selected rows until the end of the transaction.
    pub fn for_update(mut self) -> Self {
        self.statement.lock = true;
        self
    }

    /// Columns of an INSERT.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statement.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// One row of an INSERT, call it again for a multi-row insert.
    pub fn values<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.statement
            .rows
            .push(values.into_iter().map(Into::into).collect());
        self
    }

    /// Assignments of an UPDATE, appended in order.
    pub fn set<I, K, V>(mut self, assignments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Operand>,
    {
        self.statement
            .assignments
            .extend(assignments.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Render with literals inlined, the text used for display and logs.
    pub fn compile(&self, writer: &dyn SqlWriter) -> Result<String> {
        let mut out = String::new();
        let mut context = Context::new(Fragment::None, true);
        writer.write_statement(&mut context, &mut out, &self.statement)?;
        Ok(out)
    }

    /// Render the executable statement, values become bound parameters.
    pub fn build(&self, writer: &dyn SqlWriter) -> Result<Query> {
        build_statement(writer, &self.statement)
    }

    /// Run an INSERT, UPDATE or DELETE.
    pub fn execute<E: Executor>(&self, executor: &mut E) -> Result<RowsAffected> {
        let query = self.build(executor.driver().sql_writer().as_dyn())?;
        execute(executor, query)
    }

    /// Number of rows matching, computed on a private copy without ORDER BY,
    /// select list, LIMIT or OFFSET. The builder itself is left untouched.
    pub fn count<E: Executor>(&self, executor: &mut E) -> Result<u64> {
        let mut statement = self.statement.clone();
        statement.order_by.clear();
        statement.limit = None;
        statement.offset = None;
        let writer = executor.driver().sql_writer();
        let query = if statement.distinct || !statement.group_by.is_empty() {
            let Query::Bound { sql, parameters } = build_statement(writer.as_dyn(), &statement)?
            else {
                return Err(Error::configuration("expected a bound statement"));
            };
            let mut outer = String::with_capacity(sql.len() + 40);
            outer.push_str("SELECT COUNT(*) FROM (");
            outer.push_str(&sql);
            outer.push_str(") AS ");
            outer.push_str(&writer.quote_identifier("counted"));
            Query::Bound {
                sql: outer,
                parameters,
            }
        } else {
            statement.select = Some(vec![SelectItem::Raw(Raw::new("COUNT(*)"))]);
            build_statement(writer.as_dyn(), &statement)?
        };
        let rows = fetch(executor, query)?;
        let value = ResultSet::<RowLabeled>::new(rows).scalar()?;
        u64::try_from_value(value)
    }

    /// Whether at least one row matches.
    pub fn exists<E: Executor>(&self, executor: &mut E) -> Result<bool> {
        let mut statement = self.statement.clone();
        statement.select = Some(vec![SelectItem::Raw(Raw::new("1"))]);
        statement.order_by.clear();
        statement.limit = Some(1);
        let query = build_statement(executor.driver().sql_writer().as_dyn(), &statement)?;
        Ok(!fetch(executor, query)?.is_empty())
    }
}

impl<T: FromRow> QueryBuilder<T> {
    /// Execute and wrap the rows, hydration happens on first access.
    pub fn get<E: Executor>(&self, executor: &mut E) -> Result<ResultSet<T>> {
        let query = self.build(executor.driver().sql_writer().as_dyn())?;
        Ok(ResultSet::new(fetch(executor, query)?))
    }

    /// Every row, hydrated.
    pub fn all<E: Executor>(&self, executor: &mut E) -> Result<Vec<T>> {
        self.get(executor)?.into_vec()
    }

    /// First row (LIMIT 1), `None` when nothing matches.
    pub fn first<E: Executor>(&self, executor: &mut E) -> Result<Option<T>> {
        let mut statement = self.statement.clone();
        statement.limit = Some(1);
        let query = build_statement(executor.driver().sql_writer().as_dyn(), &statement)?;
        let rows = fetch(executor, query)?;
        rows.first().map(T::from_row).transpose()
    }

    /// Alias of [`QueryBuilder::first`].
    pub fn one<E: Executor>(&self, executor: &mut E) -> Result<Option<T>> {
        self.first(executor)
    }

    /// First column of the first row.
    pub fn scalar<E: Executor>(&self, executor: &mut E) -> Result<Value> {
        let query = self.build(executor.driver().sql_writer().as_dyn())?;
        ResultSet::<RowLabeled>::new(fetch(executor, query)?).scalar()
    }
}

pub(crate) fn build_statement(writer: &dyn SqlWriter, statement: &Statement) -> Result<Query> {
    let mut sql = String::new();
    let mut context = Context::bound(Fragment::None, true);
    writer.write_statement(&mut context, &mut sql, statement)?;
    Ok(Query::Bound {
        sql,
        parameters: context.take_parameters(),
    })
}

pub(crate) fn fetch<E: Executor>(executor: &mut E, query: Query) -> Result<Vec<RowLabeled>> {
    log::debug!("{query}");
    Ok(executor.fetch(query)?)
}

pub(crate) fn execute<E: Executor>(executor: &mut E, query: Query) -> Result<RowsAffected> {
    log::debug!("{query}");
    Ok(executor.execute(query)?)
}
