use chrono::NaiveDate;

use crate::schema::{DatabaseSchema, RawColumnType, RawTableSchema};
use crate::types::Row;

/// Name of the table declared by [`people_schema`].
pub const PEOPLE_TABLE: &str = "people";

/// Declares `people` with a primary `id`, a required `name` and an optional `born` date.
pub fn people_table_schema() -> RawTableSchema {
    RawTableSchema::new()
        .column("id", "primary int")
        .column("name", RawColumnType::list("varChar", [100]))
        .column("born", "optional date")
}

/// Declares `pets` with a text primary key, a unique `chip` and a json `details` column.
pub fn pets_table_schema() -> RawTableSchema {
    RawTableSchema::new()
        .column("tag", RawColumnType::list("primary varChar", [32]))
        .column("owner", "int")
        .column("chip", RawColumnType::list("unique char", [15]))
        .column("vaccinated", "boolean")
        .column("details", RawColumnType::Json)
}

/// Declares a database holding only the `people` table.
pub fn people_schema() -> DatabaseSchema {
    DatabaseSchema::new().table(PEOPLE_TABLE, people_table_schema())
}

/// Declares a database holding the `people` and `pets` tables.
pub fn people_and_pets_schema() -> DatabaseSchema {
    people_schema().table("pets", pets_table_schema())
}

/// Builds a `people` row.
pub fn person(id: i64, name: &str, born: Option<NaiveDate>) -> Row {
    Row::new()
        .with("id", id)
        .with("name", name)
        .with("born", born)
}
