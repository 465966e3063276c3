mod raw;
mod table_schema;
mod type_tag;

pub use raw::*;
pub use table_schema::*;
pub use type_tag::*;
