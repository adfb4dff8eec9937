//! dbdoc: Pending-update documents for schema-flexible database objects.
//!
//! This crate models the add/remove state of one database object and converts
//! it to and from a wire-format independent document tree.
//!
//! # Overview
//!
//! A [`Record`] holds, per field, the values to add and the values to remove
//! when the update is applied:
//! - **System fields**: `_ID`, `_table`, `_deleted`, and `_shard` are reserved
//!   and single-valued
//! - **User fields**: any other non-empty name, with any number of values
//! - **Groups**: the schema may nest fields inside group fields; grouped
//!   serialization reproduces that nesting
//!
//! # Quick Start
//!
//! ```rust
//! use dbdoc::{Record, UNode};
//!
//! let mut record = Record::with_id("28cn2812ur", "Message");
//! record.add_field_value("Subject", "Hello").unwrap();
//! record.add_field_values("Tags", ["A", "B"]).unwrap();
//! record.remove_field_values("Tags", ["C"]).unwrap();
//!
//! // Serialize to a tree and render it as JSON
//! let doc = record.to_doc();
//! assert_eq!(
//!     doc.to_json(),
//!     serde_json::json!({"doc": {
//!         "_ID": "28cn2812ur",
//!         "_table": "Message",
//!         "Subject": "Hello",
//!         "Tags": {"add": ["A", "B"], "remove": ["C"]}
//!     }})
//! );
//!
//! // Parse it back
//! let json: serde_json::Value = serde_json::from_str(&doc.to_json_string()).unwrap();
//! let mut parsed = Record::new();
//! parsed.parse(&UNode::from_json(&json).unwrap()).unwrap();
//! assert_eq!(parsed, record);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Record, field names, and the record builder
//! - [`schema`]: Field and table definitions used for grouping
//! - [`codec`]: Record to tree serialization and tree to record parsing
//! - [`tree`]: The generic document tree and its JSON form
//! - [`error`]: Error types
//! - [`limits`]: Wire names and parse limits
//!
//! # Wire Format
//!
//! Every document is a map named `"doc"`. A field with exactly one value to
//! add and nothing to remove is a scalar member; any other field is a map
//! with an `"add"` and/or a `"remove"` array of values.

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod schema;
pub mod tree;

// Re-export commonly used types at crate root
pub use codec::{ParseOptions, parse_doc, parse_doc_with_options, to_doc, to_grouped_doc};
pub use error::{BatchKind, SchemaError, ValidationError};
pub use model::{FieldName, Record, RecordBuilder};
pub use schema::{FieldDef, FieldSchema, FieldType, TableDef};
pub use tree::{NodeKind, UNode};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
