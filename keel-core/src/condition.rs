use crate::{Error, Operand, Raw, Result};
use std::fmt::{self, Display, Formatter};

/// Comparison operator of a predicate.
///
/// Parsed from its SQL spelling (case insensitive). Anything else becomes
/// [`Operator::Unknown`], which is kept in the tree and rejected when the
/// tree is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    Is,
    IsNot,
    IsNull,
    IsNotNull,
    Unknown(String),
}

impl Operator {
    pub fn parse(value: &str) -> Self {
        let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "=" | "==" => Operator::Equal,
            "!=" | "<>" => Operator::NotEqual,
            "<" => Operator::Less,
            ">" => Operator::Greater,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "LIKE" => Operator::Like,
            "NOT LIKE" => Operator::NotLike,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            "BETWEEN" => Operator::Between,
            "IS" => Operator::Is,
            "IS NOT" => Operator::IsNot,
            "IS NULL" => Operator::IsNull,
            "IS NOT NULL" => Operator::IsNotNull,
            _ => Operator::Unknown(value.to_owned()),
        }
    }

    /// SQL spelling, `None` for an unknown operator.
    pub fn as_sql(&self) -> Option<&'static str> {
        Some(match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::Greater => ">",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Between => "BETWEEN",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
            Operator::Unknown(..) => return None,
        })
    }
}

impl From<&str> for Operator {
    fn from(value: &str) -> Self {
        Operator::parse(value)
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Unknown(v) => f.write_str(v),
            _ => f.write_str(self.as_sql().unwrap_or_default()),
        }
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl Connective {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison {
        column: Operand,
        operator: Operator,
        value: Operand,
    },
    Raw(Raw),
    /// Nested group, rendered between parentheses.
    Group(Conditions),
}

impl Condition {
    pub fn comparison(
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> Self {
        Condition::Comparison {
            column: Operand::Column(column.into()),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// Whether rendering this condition would produce no text.
    pub fn is_empty(&self) -> bool {
        match self {
            Condition::Group(group) => group.is_empty(),
            Condition::Raw(raw) => raw.0.trim().is_empty(),
            Condition::Comparison { .. } => false,
        }
    }
}

/// Ordered AND/OR predicate tree.
///
/// Children are joined by the connective they were added with, the connective
/// of the first rendered child is ignored. Explicit groups opened with
/// [`Conditions::begin_group`] collect every following predicate until the
/// matching [`Conditions::end_group`].
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Conditions {
    children: Vec<(Connective, Condition)>,
    open: Vec<(Connective, Conditions)>,
    overclosed: usize,
}

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// No predicate would be rendered. Open groups count as content.
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|(_, c)| c.is_empty())
            && self.open.iter().all(|(_, c)| c.is_empty())
    }

    pub fn children(&self) -> &[(Connective, Condition)] {
        &self.children
    }

    fn cursor(&mut self) -> &mut Vec<(Connective, Condition)> {
        match self.open.last_mut() {
            Some((_, group)) => &mut group.children,
            None => &mut self.children,
        }
    }

    /// Append a condition under the innermost open group.
    pub fn push(&mut self, connective: Connective, condition: Condition) -> &mut Self {
        self.cursor().push((connective, condition));
        self
    }

    pub fn and(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> &mut Self {
        self.push(
            Connective::And,
            Condition::comparison(column, operator, value),
        )
    }

    pub fn or(
        &mut self,
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> &mut Self {
        self.push(Connective::Or, Condition::comparison(column, operator, value))
    }

    pub fn begin_group(&mut self, connective: Connective) -> &mut Self {
        self.open.push((connective, Conditions::new()));
        self
    }

    /// Close the innermost open group. Closing with no group open is recorded
    /// and reported by [`Conditions::check`].
    pub fn end_group(&mut self) -> &mut Self {
        match self.open.pop() {
            Some((connective, group)) => {
                self.push(connective, Condition::Group(group));
            }
            None => self.overclosed += 1,
        }
        self
    }

    /// Fails when explicit groups are left open or closed too many times.
    pub fn check(&self) -> Result<()> {
        if !self.open.is_empty() {
            return Err(Error::configuration(format!(
                "{} condition group(s) opened but never closed",
                self.open.len()
            )));
        }
        if self.overclosed > 0 {
            return Err(Error::configuration(format!(
                "{} condition group(s) closed without being opened",
                self.overclosed
            )));
        }
        Ok(())
    }
}

impl From<Condition> for Conditions {
    fn from(value: Condition) -> Self {
        let mut result = Conditions::new();
        result.push(Connective::And, value);
        result
    }
}
