mod as_value;
mod builder;
mod cast;
mod condition;
mod connection;
mod driver;
mod entity;
mod error;
mod executor;
mod expression;
mod join;
mod query;
mod result_set;
mod statement;
mod table_ref;
mod util;
mod value;
pub mod writer;

pub use ::anyhow;
pub use as_value::*;
pub use builder::*;
pub use cast::*;
pub use condition::*;
pub use connection::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use expression::*;
pub use join::*;
pub use query::*;
pub use result_set::*;
pub use statement::*;
pub use table_ref::*;
pub use util::*;
pub use value::*;
pub use writer::{Context, ContextUpdater, Fragment, GenericSqlWriter, SqlWriter};
