use std::borrow::Cow;

/// Table name with an optional alias, as used in FROM and JOIN.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: Cow<'static, str>,
    pub alias: Cow<'static, str>,
}

impl TableRef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            alias: Cow::Borrowed(""),
        }
    }
    pub const fn aliased(name: &'static str, alias: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            alias: Cow::Borrowed(alias),
        }
    }
    pub fn with_alias(mut self, alias: impl Into<Cow<'static, str>>) -> Self {
        self.alias = alias.into();
        self
    }
    /// Name used to qualify columns: the alias when present, the table name otherwise.
    pub fn qualifier(&self) -> &str {
        if self.alias.is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl From<&str> for TableRef {
    fn from(value: &str) -> Self {
        Self {
            name: Cow::Owned(value.to_owned()),
            alias: Cow::Borrowed(""),
        }
    }
}

impl From<String> for TableRef {
    fn from(value: String) -> Self {
        Self {
            name: Cow::Owned(value),
            alias: Cow::Borrowed(""),
        }
    }
}

/// `(table, alias)`
impl From<(&str, &str)> for TableRef {
    fn from((name, alias): (&str, &str)) -> Self {
        Self {
            name: Cow::Owned(name.to_owned()),
            alias: Cow::Owned(alias.to_owned()),
        }
    }
}

impl From<&TableRef> for TableRef {
    fn from(value: &TableRef) -> Self {
        value.clone()
    }
}
