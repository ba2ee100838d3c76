//! Task storage for Taskboard
//!
//! This crate provides a storage abstraction for statuses, task types and
//! tasks. Each entity declares its table through [`Record`]; the
//! [`TaskStore`] operations are generic over it, and [`SqliteTaskStore`]
//! implements them on a SQLite connection pool.

mod error;
mod record;
mod schema;
mod sqlite;
mod store;

pub use error::*;
pub use record::*;
pub use schema::*;
pub use sqlite::*;
pub use store::*;
