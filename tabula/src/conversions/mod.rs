pub mod bool;
pub mod codec;
pub mod numeric;
pub mod time;
