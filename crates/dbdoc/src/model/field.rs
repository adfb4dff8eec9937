//! Field name classification.
//!
//! Reserved (system) fields start with `_` and are exactly `_ID`, `_table`,
//! `_deleted`, and `_shard`. Every other name is a user field.

use crate::error::ValidationError;
use crate::limits::SYSTEM_FIELD_PREFIX;

/// Name of the object ID system field.
pub const ID_FIELD: &str = "_ID";
/// Name of the table system field.
pub const TABLE_FIELD: &str = "_table";
/// Name of the deleted-flag system field.
pub const DELETED_FIELD: &str = "_deleted";
/// Name of the shard system field.
pub const SHARD_FIELD: &str = "_shard";

/// A field name resolved into a system field or a user field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldName<'a> {
    /// `_ID`
    ObjectId,
    /// `_table`
    TableName,
    /// `_deleted`
    Deleted,
    /// `_shard`
    Shard,
    /// Any name without the system prefix.
    User(&'a str),
}

impl<'a> FieldName<'a> {
    /// Classifies a field name.
    ///
    /// Fails for an empty name and for a `_`-prefixed name that is not one of
    /// the four system fields.
    pub fn classify(name: &'a str) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyFieldName);
        }
        if !name.starts_with(SYSTEM_FIELD_PREFIX) {
            return Ok(FieldName::User(name));
        }
        match name {
            ID_FIELD => Ok(FieldName::ObjectId),
            TABLE_FIELD => Ok(FieldName::TableName),
            DELETED_FIELD => Ok(FieldName::Deleted),
            SHARD_FIELD => Ok(FieldName::Shard),
            _ => Err(ValidationError::UnknownSystemField {
                field: name.to_string(),
            }),
        }
    }

    /// Returns true for the four system fields.
    pub fn is_system(&self) -> bool {
        !matches!(self, FieldName::User(_))
    }

    /// Returns the wire name of this field.
    pub fn as_str(&self) -> &'a str {
        match *self {
            FieldName::ObjectId => ID_FIELD,
            FieldName::TableName => TABLE_FIELD,
            FieldName::Deleted => DELETED_FIELD,
            FieldName::Shard => SHARD_FIELD,
            FieldName::User(name) => name,
        }
    }
}

impl std::fmt::Display for FieldName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
