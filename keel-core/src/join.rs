use crate::{Conditions, TableRef};

/// Secondary source attached to a select.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join: JoinType,
    pub table: TableRef,
    pub on: Conditions,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
}
