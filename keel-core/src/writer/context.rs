use crate::Value;
use std::{
    mem,
    ops::{Deref, DerefMut},
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlDeleteFrom,
    SqlDeleteFromWhere,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlJoin,
    SqlJoinOn,
    SqlSelect,
    SqlSelectFrom,
    SqlSelectGroupBy,
    SqlSelectHaving,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUpdate,
    SqlUpdateSet,
    SqlUpdateWhere,
}

/// Render state threaded through every `SqlWriter` call.
///
/// With `bind` set, values are replaced by placeholders and collected in
/// `parameters` in the order they appear in the text. Otherwise values are
/// written as literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub counter: u32,
    pub fragment: Fragment,
    pub qualify_columns: bool,
    pub bind: bool,
    pub parameters: Vec<Value>,
}

impl Context {
    pub fn new(fragment: Fragment, qualify_columns: bool) -> Self {
        Self {
            counter: 0,
            fragment,
            qualify_columns,
            bind: false,
            parameters: Vec::new(),
        }
    }
    /// Context collecting bound parameters.
    pub fn bound(fragment: Fragment, qualify_columns: bool) -> Self {
        Self {
            bind: true,
            ..Self::new(fragment, qualify_columns)
        }
    }
    /// Record a parameter, returns its 1-based position.
    pub fn push_parameter(&mut self, value: Value) -> u32 {
        self.parameters.push(value);
        self.counter += 1;
        self.counter
    }
    pub fn take_parameters(&mut self) -> Vec<Value> {
        mem::take(&mut self.parameters)
    }
    /// Enter a fragment, the previous one is restored when the guard drops.
    pub fn switch_fragment(&mut self, fragment: Fragment) -> ContextUpdater<'_> {
        let previous = mem::replace(&mut self.fragment, fragment);
        ContextUpdater {
            current: self,
            previous,
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(Fragment::None, true)
    }
}

pub struct ContextUpdater<'a> {
    current: &'a mut Context,
    previous: Fragment,
}

impl Deref for ContextUpdater<'_> {
    type Target = Context;
    fn deref(&self) -> &Self::Target {
        self.current
    }
}

impl DerefMut for ContextUpdater<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.current
    }
}

impl Drop for ContextUpdater<'_> {
    fn drop(&mut self) {
        self.current.fragment = self.previous;
    }
}
