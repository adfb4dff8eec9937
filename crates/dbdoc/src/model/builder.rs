//! Builder API for ergonomic Record construction.
//!
//! # Example
//!
//! ```rust
//! use dbdoc::model::builder::RecordBuilder;
//!
//! let record = RecordBuilder::new()
//!     .id("28cn2812ur")
//!     .table("Message")
//!     .value("Subject", "Concrete slabs")
//!     .values("Tags", ["Confidential", "Priority"])
//!     .remove("Tags", ["Draft"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(record.field_value("Subject").unwrap(), Some("Concrete slabs"));
//! ```

use crate::error::ValidationError;
use crate::model::Record;

/// Builder for constructing a Record.
///
/// Field updates go through the same checks as the [`Record`] setters. The
/// first failure is kept and returned by [`RecordBuilder::build`]; later
/// calls are ignored once a failure has been seen.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    record: Record,
    error: Option<ValidationError>,
}

impl RecordBuilder {
    /// Creates a builder for an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `_ID`.
    pub fn id(mut self, object_id: impl Into<String>) -> Self {
        self.record.set_object_id(object_id);
        self
    }

    /// Sets `_table`.
    pub fn table(mut self, table_name: impl Into<String>) -> Self {
        self.record.set_table_name(table_name);
        self
    }

    /// Sets `_deleted`.
    pub fn deleted(mut self, deleted: bool) -> Self {
        self.record.set_deleted(deleted);
        self
    }

    /// Sets `_shard`.
    pub fn shard(mut self, shard_name: impl Into<String>) -> Self {
        self.record.set_shard_name(shard_name);
        self
    }

    /// Adds one value to a field.
    pub fn value(self, name: &str, value: impl Into<String>) -> Self {
        self.apply(|record| record.add_field_value(name, value))
    }

    /// Adds several values to a field.
    pub fn values<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply(|record| record.add_field_values(name, values))
    }

    /// Marks values to be removed from a field.
    pub fn remove<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply(|record| record.remove_field_values(name, values))
    }

    /// Builds the record, or returns the first update that failed.
    pub fn build(self) -> Result<Record, ValidationError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.record),
        }
    }

    fn apply<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Record) -> Result<(), ValidationError>,
    {
        if self.error.is_none() {
            if let Err(err) = f(&mut self.record) {
                self.error = Some(err);
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_system_and_user_fields() {
        let record = RecordBuilder::new()
            .id("x1")
            .table("Message")
            .deleted(true)
            .shard("s1")
            .value("Sender", "u1")
            .values("Tags", ["A", "B"])
            .remove("Tags", ["C"])
            .build()
            .unwrap();

        assert_eq!(record.object_id(), Some("x1"));
        assert_eq!(record.table_name(), Some("Message"));
        assert!(record.is_deleted());
        assert_eq!(record.shard_name(), Some("s1"));
        assert_eq!(record.field_value("Sender").unwrap(), Some("u1"));
        assert_eq!(record.field_values("Tags").unwrap().map(<[String]>::len), Some(2));
        assert_eq!(record.remove_values("Tags"), Some(vec!["C".to_string()]));
    }

    #[test]
    fn test_builder_keeps_first_error() {
        let result = RecordBuilder::new()
            .value("_bogus", "x")
            .values("_ID", ["a", "b"])
            .build();
        assert!(matches!(
            result,
            Err(ValidationError::UnknownSystemField { .. })
        ));
    }

    #[test]
    fn test_builder_empty() {
        let record = RecordBuilder::new().build().unwrap();
        assert!(record.is_empty());
    }
}
