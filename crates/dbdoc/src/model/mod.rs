//! Data model types for database objects.
//!
//! - Field names (system vs. user fields)
//! - Records (pending add/remove state of one object)
//! - Builders (ergonomic construction)

pub mod builder;
pub mod field;
pub mod record;

pub use builder::RecordBuilder;
pub use field::{DELETED_FIELD, FieldName, ID_FIELD, SHARD_FIELD, TABLE_FIELD};
pub use record::Record;
