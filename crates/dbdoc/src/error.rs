//! Error types for record updates, tree conversion, and schema loading.

use thiserror::Error;

/// Which batch of a field update a malformed member was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    Add,
    Remove,
}

impl BatchKind {
    /// Returns the element name used for this batch on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::Add => "add",
            BatchKind::Remove => "remove",
        }
    }
}

impl std::fmt::Display for BatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when caller input violates the record or tree contract.
///
/// All variants are caller-input errors: they are reported at the point of
/// violation and are never worth retrying with the same input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field name must not be empty")]
    EmptyFieldName,

    #[error("unknown system field: {field}")]
    UnknownSystemField { field: String },

    #[error("system fields can have only 1 value: {field} was given {count}")]
    SystemFieldMultiValued { field: String, count: usize },

    #[error("method not valid for system fields: {field}")]
    SystemFieldAccessor { field: String },

    #[error("system field values cannot be removed: {field}")]
    SystemFieldRemoval { field: String },

    #[error("field has more than 1 value: {field} ({count} values)")]
    MultipleValues { field: String, count: usize },

    #[error("'doc' node expected: {found}")]
    WrongRootName { found: String },

    #[error("'doc' node must be a map of unique names: {name}")]
    RootNotMap { name: String },

    #[error("document root is missing")]
    MissingDocRoot,

    #[error("value expected for '{batch}' element of field {field}: found {member}")]
    MalformedBatchMember {
        field: String,
        batch: BatchKind,
        member: String,
    },

    #[error("document nesting depth {depth} exceeds maximum {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("group hierarchy of field {field} contains a cycle")]
    CyclicGroupHierarchy { field: String },

    #[error("field {field} names unknown parent field {parent}")]
    UnknownParentField { field: String, parent: String },
}

/// Error while loading a table schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field name must not be empty (in table {table})")]
    EmptyFieldName { table: String },

    #[error("field {field} is defined more than once in table {table}")]
    DuplicateField { table: String, field: String },

    #[error("cannot nest field {field} under {group}: not a group field of this table")]
    UnknownGroup { field: String, group: String },

    #[error("field {field} declares nested fields but is not a group")]
    NestedNonGroup { field: String },

    #[error("group field {field} declares no nested fields")]
    EmptyGroup { field: String },
}
