use crate::{Conditions, Error, Join, Operand, Raw, Result, TableRef};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl Order {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// Entry of a select list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectItem {
    /// Plain names are qualified with the target table, dotted names are kept.
    Column(String),
    /// `(column, alias)`
    Aliased(String, String),
    Raw(Raw),
}

impl From<&str> for SelectItem {
    fn from(value: &str) -> Self {
        SelectItem::Column(value.to_owned())
    }
}

impl From<String> for SelectItem {
    fn from(value: String) -> Self {
        SelectItem::Column(value)
    }
}

impl From<(&str, &str)> for SelectItem {
    fn from((name, alias): (&str, &str)) -> Self {
        SelectItem::Aliased(name.to_owned(), alias.to_owned())
    }
}

impl From<Raw> for SelectItem {
    fn from(value: Raw) -> Self {
        SelectItem::Raw(value)
    }
}

/// Clause state of one statement, independent of how the rows are hydrated.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub table: Option<TableRef>,
    /// `None` selects every column of the target table.
    pub select: Option<Vec<SelectItem>>,
    pub distinct: bool,
    pub joins: Vec<Join>,
    pub wheres: Conditions,
    pub group_by: Vec<String>,
    pub having: Conditions,
    pub order_by: Vec<(String, Order)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock: bool,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Operand>>,
    pub assignments: Vec<(String, Operand)>,
    /// Builder misuse detected while chaining, reported at compile time.
    pub errors: Vec<String>,
}

impl Statement {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn target(&self) -> Result<&TableRef> {
        match &self.table {
            Some(table) if !table.is_empty() => Ok(table),
            _ => Err(Error::configuration(format!(
                "{:?} statement without a target table",
                self.kind
            ))),
        }
    }

    /// Every misuse that must stop the statement before it reaches a driver.
    pub fn check(&self) -> Result<()> {
        if let Some(error) = self.errors.first() {
            return Err(Error::configuration(error.clone()));
        }
        self.target()?;
        self.wheres.check()?;
        self.having.check()?;
        for join in &self.joins {
            join.on.check()?;
        }
        match self.kind {
            StatementKind::Insert => {
                if self.rows.is_empty() {
                    return Err(Error::configuration("INSERT without any row of values"));
                }
                for (i, row) in self.rows.iter().enumerate() {
                    if row.len() != self.columns.len() {
                        return Err(Error::configuration(format!(
                            "INSERT row {i} has {} value(s) for {} column(s)",
                            row.len(),
                            self.columns.len(),
                        )));
                    }
                }
            }
            StatementKind::Update if self.assignments.is_empty() => {
                return Err(Error::configuration("UPDATE without any assignment"));
            }
            _ => {}
        }
        Ok(())
    }
}
