use crate::{
    AsValue, Cast, Error, Executor, FromRow, Operand, Operator, Query, QueryBuilder, Record,
    Result, RowLabeled, SqlWriter, TableRef, Value,
    builder::build_statement,
};
use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use std::{fmt, marker::PhantomData};

/// Static description of a table, usually generated by `#[derive(Model)]`.
pub trait Model: Hooks + 'static {
    fn table() -> &'static TableRef;

    fn primary_key() -> &'static str {
        "id"
    }

    /// Per attribute casts, attributes not listed are stored as they are.
    fn casts() -> &'static [(&'static str, Cast)] {
        &[]
    }

    fn cast(name: &str) -> Option<&'static Cast> {
        Self::casts()
            .iter()
            .find_map(|(n, c)| if *n == name { Some(c) } else { None })
    }
}

/// Lifecycle callbacks of a model.
///
/// `#[derive(Model)]` provides the empty implementation unless the model is
/// marked `#[keel(hooks)]`, in which case this trait is implemented by hand.
pub trait Hooks: Sized {
    /// Runs before the INSERT of [`Entity::create`] is compiled, an error aborts the creation.
    fn on_create(_entity: &mut Entity<Self>) -> Result<()> {
        Ok(())
    }
    /// Runs after `set` gave attribute `name` a value different from storage.
    fn on_change(_entity: &mut Entity<Self>, _name: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Never stored.
    Transient,
    /// Mirrors a stored row.
    Loaded,
    /// Loaded, with at least one attribute differing from storage.
    Dirty,
    /// Removed from storage, terminal.
    Deleted,
}

/// Attribute bag bound to the table of model `M`.
///
/// Attributes hold the decoded (in memory) form of every value. The snapshot
/// holds the encoded form of the last loaded or saved state, and an attribute
/// is dirty exactly when its encoded value differs from the snapshot.
pub struct Entity<M> {
    attributes: IndexMap<String, Value>,
    original: IndexMap<String, Value>,
    dirty: IndexSet<String>,
    changed: IndexSet<String>,
    state: EntityState,
    _model: PhantomData<fn() -> M>,
}

impl<M: Model> Entity<M> {
    /// Transient entity with no attribute.
    pub fn new() -> Self {
        Self {
            attributes: IndexMap::new(),
            original: IndexMap::new(),
            dirty: IndexSet::new(),
            changed: IndexSet::new(),
            state: EntityState::Transient,
            _model: PhantomData,
        }
    }

    /// Transient entity, every provided attribute is dirty.
    pub fn with_attributes<I, K, V>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut result = Self::new();
        for (name, value) in attributes {
            result.assign(name.into(), value.into(), false)?;
        }
        Ok(result)
    }

    /// Loaded entity mirroring a stored row.
    pub fn from_row(row: &RowLabeled) -> Result<Self> {
        let mut result = Self::new();
        result.load(row)?;
        Ok(result)
    }

    fn load(&mut self, row: &RowLabeled) -> Result<()> {
        let mut attributes = IndexMap::with_capacity(row.len());
        let mut original = IndexMap::with_capacity(row.len());
        for (name, value) in row.labels.iter().zip(row.values.iter()) {
            let decoded = decode::<M>(name, value.clone())?;
            original.insert(name.clone(), encode::<M>(name, &decoded)?);
            attributes.insert(name.clone(), decoded);
        }
        self.attributes = attributes;
        self.original = original;
        self.dirty.clear();
        self.state = EntityState::Loaded;
        Ok(())
    }

    pub fn state(&self) -> EntityState {
        match self.state {
            EntityState::Loaded if !self.dirty.is_empty() => EntityState::Dirty,
            state => state,
        }
    }

    /// Whether the entity mirrors a stored row (possibly with pending changes).
    pub fn loaded(&self) -> bool {
        self.state == EntityState::Loaded
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Typed attribute, a missing attribute converts from NULL.
    pub fn get_as<T: AsValue>(&self, name: &str) -> Result<T> {
        T::try_from_value(self.attributes.get(name).cloned().unwrap_or_default())
    }

    /// Decode `value` with the attribute cast and store it.
    ///
    /// The attribute becomes dirty only when its encoded form differs from the
    /// snapshot, setting it back to the stored value clears the mark.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        self.assign(name.to_owned(), value.into(), true)?;
        Ok(self)
    }

    fn assign(&mut self, name: String, value: Value, notify: bool) -> Result<()> {
        let decoded = decode::<M>(&name, value)?;
        let encoded = encode::<M>(&name, &decoded)?;
        let differs = self.original.get(&name) != Some(&encoded);
        let previous = self.attributes.insert(name.clone(), decoded);
        if !differs {
            self.dirty.shift_remove(&name);
            return Ok(());
        }
        self.dirty.insert(name.clone());
        if notify && previous.as_ref() != self.attributes.get(&name) {
            M::on_change(self, &name);
        }
        Ok(())
    }

    /// Whether `name` is dirty since the last load or save.
    pub fn changed(&self, name: &str) -> bool {
        self.dirty.contains(name)
    }

    pub fn changed_any<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().any(|n| self.dirty.contains(n))
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Dirty attribute names, in the order they became dirty.
    pub fn dirty(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Whether `name` was written by the most recent save.
    pub fn was_changed(&self, name: &str) -> bool {
        self.changed.contains(name)
    }

    /// Encoded values of the last loaded or saved state.
    pub fn original(&self) -> &IndexMap<String, Value> {
        &self.original
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// Primary key value, `None` when unset or NULL.
    pub fn key(&self) -> Option<&Value> {
        self.attributes
            .get(M::primary_key())
            .filter(|v| !v.is_null())
    }

    /// Attributes present in the bag, in insertion order.
    pub fn to_record(&self) -> Record {
        self.attributes.clone()
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| Error::type_error(e.to_string()))
    }

    fn encoded(&self, name: &str) -> Result<Value> {
        encode::<M>(name, self.attributes.get(name).unwrap_or(&Value::Null))
    }

    fn snapshot(&mut self) -> Result<()> {
        self.original = self
            .attributes
            .iter()
            .map(|(k, v)| Ok((k.clone(), encode::<M>(k, v)?)))
            .collect::<Result<_>>()?;
        Ok(())
    }

    /// INSERT every attribute, then take the generated key unless one was set.
    pub fn create<E: Executor>(&mut self, executor: &mut E) -> Result<()> {
        if self.state != EntityState::Transient {
            return Err(Error::configuration(format!(
                "Cannot create a {:?} entity of `{}`",
                self.state(),
                M::table().name
            )));
        }
        M::on_create(self)?;
        let row = self
            .attributes
            .keys()
            .map(|k| Ok((k.clone(), self.encoded(k)?)))
            .collect::<Result<Vec<(String, Value)>>>()?;
        let query = QueryBuilder::insert_row(M::table(), row);
        let result = query.execute(executor)?;
        if self.key().is_none()
            && let Some(id) = result.last_affected_id
        {
            self.attributes
                .insert(M::primary_key().to_owned(), Value::Int64(Some(id)));
        }
        self.changed = std::mem::take(&mut self.dirty);
        self.snapshot()?;
        self.state = EntityState::Loaded;
        Ok(())
    }

    /// UPDATE the dirty attributes only, returns the affected row count.
    ///
    /// Nothing dirty means no statement at all and `0`.
    pub fn update<E: Executor>(&mut self, executor: &mut E) -> Result<u64> {
        if self.dirty.is_empty() {
            return Ok(0);
        }
        if self.state != EntityState::Loaded {
            return Err(Error::configuration(format!(
                "Cannot update a {:?} entity of `{}`",
                self.state(),
                M::table().name
            )));
        }
        let key = self.stored_key()?;
        let assignments = self
            .dirty
            .iter()
            .map(|k| Ok((k.clone(), self.encoded(k)?)))
            .collect::<Result<Vec<(String, Value)>>>()?;
        let result = QueryBuilder::update(M::table())
            .set(assignments.iter().cloned())
            .and_where(M::primary_key(), Operator::Equal, key)
            .execute(executor)?;
        for (name, value) in assignments {
            self.original.insert(name, value);
        }
        self.changed = std::mem::take(&mut self.dirty);
        Ok(result.rows_affected)
    }

    /// [`Entity::create`] when transient, [`Entity::update`] otherwise.
    pub fn save<E: Executor>(&mut self, executor: &mut E) -> Result<u64> {
        match self.state {
            EntityState::Transient => self.create(executor).map(|_| 1),
            _ => self.update(executor),
        }
    }

    /// DELETE by primary key, the entity ends up Deleted with its key cleared.
    pub fn delete<E: Executor>(&mut self, executor: &mut E) -> Result<u64> {
        match self.state {
            EntityState::Deleted => return Ok(0),
            EntityState::Transient => {
                self.state = EntityState::Deleted;
                return Ok(0);
            }
            _ => {}
        }
        let key = self.stored_key()?;
        let result = QueryBuilder::delete(M::table())
            .and_where(M::primary_key(), Operator::Equal, key.clone())
            .execute(executor)?;
        if result.rows_affected == 0 {
            log::info!(
                "Delete of `{}` with {} = {} matched no row",
                M::table().name,
                M::primary_key(),
                key
            );
        }
        self.attributes.shift_remove(M::primary_key());
        self.original.shift_remove(M::primary_key());
        self.state = EntityState::Deleted;
        Ok(result.rows_affected)
    }

    /// Read the stored row again, discarding pending changes.
    pub fn reload<E: Executor>(&mut self, executor: &mut E) -> Result<()> {
        let key = self.stored_key()?;
        let row = QueryBuilder::<RowLabeled>::from_statement(
            Self::find()
                .and_where(M::primary_key(), Operator::Equal, key.clone())
                .into_statement(),
        )
        .first(executor)?
        .ok_or_else(|| Error::not_found_key(&M::table().name, M::primary_key(), &key))?;
        self.load(&row)
    }

    /// Key of the stored row, the snapshot wins over a pending change.
    fn stored_key(&self) -> Result<Value> {
        self.original
            .get(M::primary_key())
            .filter(|v| !v.is_null())
            .or_else(|| self.key())
            .cloned()
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Entity of `{}` has no primary key `{}`",
                    M::table().name,
                    M::primary_key()
                ))
            })
    }

    /// SELECT from the model table, rows hydrated into entities.
    pub fn find() -> QueryBuilder<Entity<M>> {
        QueryBuilder::table(M::table()).hydrate()
    }

    pub fn filter(
        column: impl Into<String>,
        operator: impl Into<Operator>,
        value: impl Into<Operand>,
    ) -> QueryBuilder<Entity<M>> {
        Self::find().and_where(column, operator, value)
    }

    /// Lookup by primary key, `None` when absent.
    pub fn one<E: Executor>(executor: &mut E, key: impl Into<Value>) -> Result<Option<Self>> {
        Self::find()
            .and_where(M::primary_key(), Operator::Equal, key.into())
            .first(executor)
    }

    /// Lookup by primary key, [`Error::NotFound`] when absent.
    pub fn one_or_fail<E: Executor>(executor: &mut E, key: impl Into<Value>) -> Result<Self> {
        let key = key.into();
        Self::one(executor, key.clone())?
            .ok_or_else(|| Error::not_found_key(&M::table().name, M::primary_key(), &key))
    }

    /// Compile the INSERT [`Entity::create`] would run, without running it or the hooks.
    pub fn insert_query(&self, writer: &dyn SqlWriter) -> Result<Query> {
        let row = self
            .attributes
            .keys()
            .map(|k| Ok((k.clone(), self.encoded(k)?)))
            .collect::<Result<Vec<(String, Value)>>>()?;
        build_statement(
            writer,
            QueryBuilder::insert_row(M::table(), row).statement(),
        )
    }
}

fn decode<M: Model>(name: &str, value: Value) -> Result<Value> {
    match M::cast(name) {
        Some(cast) => cast.decode(value).map_err(|e| describe::<M>(name, e)),
        None => Ok(value),
    }
}

fn encode<M: Model>(name: &str, value: &Value) -> Result<Value> {
    match M::cast(name) {
        Some(cast) => cast.encode(value).map_err(|e| describe::<M>(name, e)),
        None => Ok(value.clone()),
    }
}

fn describe<M: Model>(name: &str, error: Error) -> Error {
    match error {
        Error::Type(message) => {
            Error::Type(format!("{}.{name}: {message}", M::table().name))
        }
        e => e,
    }
}

impl<M: Model> Default for Entity<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> FromRow for Entity<M> {
    fn from_row(row: &RowLabeled) -> Result<Self> {
        Entity::from_row(row)
    }
}

impl<M> Clone for Entity<M> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            original: self.original.clone(),
            dirty: self.dirty.clone(),
            changed: self.changed.clone(),
            state: self.state,
            _model: PhantomData,
        }
    }
}

impl<M: Model> fmt::Debug for Entity<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("table", &M::table().name)
            .field("state", &self.state())
            .field("attributes", &self.attributes)
            .field("dirty", &self.dirty)
            .finish()
    }
}

/// Serializes the attributes present in the bag, in insertion order.
impl<M> Serialize for Entity<M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}
