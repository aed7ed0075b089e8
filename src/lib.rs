//! Keel: a synchronous relational data layer.
//!
//! A fluent [`QueryBuilder`] over a condition tree compiler, lazily hydrated
//! [`ResultSet`]s and dirty-tracking [`Entity`] records, all running on any
//! [`Driver`] implementation.
//!
//! ```rust,ignore
//! use keel::{Connection, Entity, Model};
//! use keel_sqlite::SqliteConnection;
//!
//! #[derive(Model)]
//! #[keel(name = "posts", cast(tags = array))]
//! struct Post;
//!
//! let mut connection = SqliteConnection::connect("sqlite://:memory:")?;
//! let mut post = Entity::<Post>::with_attributes([("title", "Hello")])?;
//! post.create(&mut connection)?;
//! ```
pub use keel_core::*;
pub use keel_macros::*;
