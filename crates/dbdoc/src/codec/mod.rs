//! Conversion between [`Record`](crate::model::Record) and `"doc"` trees.
//!
//! - [`serialize`]: flat and grouped record to tree serialization
//! - [`parse`]: tree to record parsing
//! - [`hierarchy`]: placement of nested fields for grouped serialization

pub mod hierarchy;
pub mod parse;
pub mod serialize;

pub use hierarchy::{GroupHierarchy, resolve_groups};
pub use parse::{ParseOptions, parse_doc, parse_doc_with_options};
pub use serialize::{to_doc, to_grouped_doc};
