pub use crate::CacheTtl;
pub use crate::connection::{Connection, QueryResult};
pub use crate::database::Database;
pub use crate::error::{ErrorKind, TabulaError, TabulaResult};
pub use crate::schema::{DatabaseSchema, RawColumnType, RawTableSchema};
pub use crate::table::Table;
pub use crate::types::{BackendValue, RawRow, Row, Value};
pub use crate::{bail, tabula_error};
