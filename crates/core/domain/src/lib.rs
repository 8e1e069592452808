pub mod data;
pub mod tag;

pub use data::{DecodedValue, Point, TagValue};
pub use tag::{ByteOrder, SchemaError, TagDefinition, TagSchema, ValueType};
