//! Typed single-table data access over a relational backend.
//!
//! A [`database::Database`] is built from a [`connection::Connection`], a cache TTL and a
//! declarative [`schema::DatabaseSchema`]. Each declared table becomes a [`table::Table`]
//! exposing `get`, `get_all`, `insert`, `update` and `delete`, with values converted between
//! [`types::Value`] and the backend representation according to the declared column types.
//!
//! Reads are cached for the configured TTL and every write to a table drops that table's
//! cached reads.
//!
//! ```rust,no_run
//! use tabula::prelude::*;
//!
//! # async fn example<C: Connection>(connection: C) -> TabulaResult<()> {
//! let schema = DatabaseSchema::new().table(
//!     "people",
//!     RawTableSchema::new()
//!         .column("id", "primary int")
//!         .column("name", RawColumnType::list("varChar", [100]))
//!         .column("born", "optional date"),
//! );
//!
//! let database = Database::new(connection, CacheTtl::default(), schema).await?;
//! let people = database.table("people")?;
//!
//! people.insert(Row::new().with("id", 1).with("name", "Dave")).await?;
//! let dave = people.get(1).await?;
//! assert!(dave.is_some());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod connection;
pub mod conversions;
pub mod database;
pub mod error;
mod macros;
pub mod prelude;
pub mod schema;
pub mod statement;
pub mod table;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use tabula_config::shared::CacheTtl;
