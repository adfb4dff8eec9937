//! Wire names and limits for document trees.
//!
//! The element names here are part of the rendering-independent wire shape
//! and must not change.

/// Name of the root node of every document tree.
pub const DOC_ROOT: &str = "doc";

/// Name of the array holding values to add to a field.
pub const ADD: &str = "add";

/// Name of the array holding values to remove from a field.
pub const REMOVE: &str = "remove";

/// Name of each scalar member of an add/remove array.
pub const VALUE: &str = "value";

/// Tag attached to field nodes by the serializer.
pub const FIELD_TAG: &str = "field";

/// Literal rendered for a set `_deleted` flag.
pub const DELETED_TRUE: &str = "true";

/// Leading character of reserved (system) field names.
pub const SYSTEM_FIELD_PREFIX: char = '_';

/// Maximum nesting depth accepted when parsing a document tree.
///
/// Group fields nest arbitrarily in principle; this bound only protects the
/// recursive parser and JSON reader from hostile input.
pub const MAX_NESTING_DEPTH: usize = 64;
