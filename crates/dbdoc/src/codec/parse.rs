//! Tree to record parsing.
//!
//! The root must be a map named `"doc"`. Each child is a field update:
//!
//! - a value node adds its value to the field of the same name
//! - a collection node may hold a non-empty `"add"` and/or `"remove"`
//!   collection of `"value"` nodes; any other child is parsed recursively
//!   as a field of its own, which is how grouped documents read back flat
//!
//! Batches are deduplicated before they are applied. Parsing stops at the
//! first error; updates applied before it are kept.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{BatchKind, ValidationError};
use crate::limits::{ADD, DOC_ROOT, MAX_NESTING_DEPTH, REMOVE, VALUE};
use crate::model::Record;
use crate::tree::UNode;

/// Limits applied while parsing a document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum depth of field nodes below the root.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_NESTING_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Creates options with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Applies the updates of a `"doc"` tree to `record` with default limits.
pub fn parse_doc(record: &mut Record, doc: &UNode) -> Result<(), ValidationError> {
    parse_doc_with_options(record, doc, ParseOptions::default())
}

/// Applies the updates of a `"doc"` tree to `record`.
pub fn parse_doc_with_options(
    record: &mut Record,
    doc: &UNode,
    options: ParseOptions,
) -> Result<(), ValidationError> {
    if doc.name() != DOC_ROOT {
        return Err(ValidationError::WrongRootName {
            found: doc.name().to_string(),
        });
    }
    if !doc.is_map() {
        return Err(ValidationError::RootNotMap {
            name: doc.name().to_string(),
        });
    }

    for field in doc.members() {
        parse_field_update(record, field.name(), field, 1, &options)?;
    }

    debug!(
        object_id = ?record.object_id(),
        members = doc.members().len(),
        "parsed doc"
    );
    Ok(())
}

fn parse_field_update(
    record: &mut Record,
    field_name: &str,
    node: &UNode,
    depth: usize,
    options: &ParseOptions,
) -> Result<(), ValidationError> {
    if depth > options.max_depth {
        return Err(ValidationError::NestingTooDeep {
            depth,
            max: options.max_depth,
        });
    }

    if let Some(value) = node.value() {
        return record.add_field_value(field_name, value);
    }

    for child in node.members() {
        match child.name() {
            ADD if child.is_collection() && child.has_members() => {
                let values = batch_values(field_name, child, BatchKind::Add)?;
                record.add_field_values(field_name, values)?;
            }
            REMOVE if child.is_collection() && child.has_members() => {
                let values = batch_values(field_name, child, BatchKind::Remove)?;
                record.remove_field_values(field_name, values)?;
            }
            _ => parse_field_update(record, child.name(), child, depth + 1, options)?,
        }
    }
    Ok(())
}

/// Collects the distinct values of an add/remove batch.
fn batch_values<'a>(
    field_name: &str,
    batch: &'a UNode,
    kind: BatchKind,
) -> Result<BTreeSet<&'a str>, ValidationError> {
    batch
        .members()
        .iter()
        .map(|member| match member.value() {
            Some(value) if member.name() == VALUE => Ok(value),
            _ => Err(ValidationError::MalformedBatchMember {
                field: field_name.to_string(),
                batch: kind,
                member: member.to_string(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::model::RecordBuilder;
    use crate::schema::{FieldDef, FieldType, TableDef};

    fn parse_json(value: serde_json::Value) -> Result<Record, ValidationError> {
        let doc = UNode::from_json(&value)?;
        let mut record = Record::new();
        record.parse(&doc)?;
        Ok(record)
    }

    #[test]
    fn test_parse_scalars_and_system_fields() {
        let record = parse_json(json!({"doc": {
            "_ID": "x1",
            "_table": "Message",
            "_deleted": "TRUE",
            "_shard": "s1",
            "Subject": "Hello"
        }}))
        .unwrap();

        assert_eq!(record.object_id(), Some("x1"));
        assert_eq!(record.table_name(), Some("Message"));
        assert!(record.is_deleted());
        assert_eq!(record.shard_name(), Some("s1"));
        assert_eq!(record.field_value("Subject").unwrap(), Some("Hello"));
    }

    #[test]
    fn test_parse_add_remove_dedups() {
        let record = parse_json(json!({"doc": {
            "Tags": {"add": ["B", "A", "B"], "remove": ["C", "C"]}
        }}))
        .unwrap();

        assert_eq!(
            record.field_values("Tags").unwrap(),
            Some(&["A".to_string(), "B".to_string()][..])
        );
        assert_eq!(record.remove_values("Tags"), Some(vec!["C".to_string()]));
    }

    #[test]
    fn test_parse_nested_groups_flatten() {
        let record = parse_json(json!({"doc": {
            "_ID": "x1",
            "G1": {"G2": {"Body": "text", "Tags": {"add": ["a"]}}, "_table": "Message"}
        }}))
        .unwrap();

        assert_eq!(record.field_value("Body").unwrap(), Some("text"));
        assert_eq!(record.field_value("Tags").unwrap(), Some("a"));
        // A reserved name at a nested level still routes to the system attribute.
        assert_eq!(record.table_name(), Some("Message"));
        assert!(!record.updated_field_names().contains("G1"));
        assert!(!record.updated_field_names().contains("G2"));
    }

    #[test]
    fn test_empty_batch_is_recursed_as_field() {
        // An empty "add" collection is not a batch; it is read as a field
        // named "add" that has no values.
        let record = parse_json(json!({"doc": {"Tags": {"add": []}}})).unwrap();
        assert!(record.updated_field_names().is_empty());
    }

    #[test]
    fn test_scalar_add_child_is_a_field() {
        let record = parse_json(json!({"doc": {"Wrapper": {"add": "x"}}})).unwrap();
        assert_eq!(record.field_value("add").unwrap(), Some("x"));
    }

    #[test]
    fn test_malformed_batch_member() {
        let result = parse_json(json!({"doc": {"Tags": {"add": ["A", {"other": "B"}]}}}));
        assert_eq!(
            result.unwrap_err(),
            ValidationError::MalformedBatchMember {
                field: "Tags".to_string(),
                batch: BatchKind::Add,
                member: "other=\"B\"".to_string()
            }
        );

        let result = parse_json(json!({"doc": {"Tags": {"remove": [{"value": {"x": "1"}}]}}}));
        assert!(matches!(
            result,
            Err(ValidationError::MalformedBatchMember {
                batch: BatchKind::Remove,
                ..
            })
        ));
    }

    #[test]
    fn test_wrong_root_name() {
        let doc = UNode::create_map_node("document");
        let mut record = Record::new();
        assert_eq!(
            record.parse(&doc).unwrap_err(),
            ValidationError::WrongRootName {
                found: "document".to_string()
            }
        );
    }

    #[test]
    fn test_root_not_map() {
        let mut record = Record::new();
        let doc = UNode::create_array_node("doc");
        assert!(matches!(
            record.parse(&doc),
            Err(ValidationError::RootNotMap { .. })
        ));
        let doc = UNode::create_value_node("doc", "x");
        assert!(matches!(
            record.parse(&doc),
            Err(ValidationError::RootNotMap { .. })
        ));
    }

    #[test]
    fn test_partial_updates_kept_on_error() {
        let mut doc = UNode::create_map_node("doc");
        doc.add_value_node("A", "1");
        doc.add_value_node("_owner", "x");
        doc.add_value_node("B", "2");

        let mut record = Record::new();
        let result = record.parse(&doc);
        assert!(matches!(
            result,
            Err(ValidationError::UnknownSystemField { .. })
        ));
        assert_eq!(record.field_value("A").unwrap(), Some("1"));
        assert_eq!(record.field_value("B").unwrap(), None);
    }

    #[test]
    fn test_null_reserved_like_field_is_noop() {
        let record = parse_json(json!({"doc": {"_owner": null, "Subject": "Hi"}})).unwrap();
        assert_eq!(record.field_value("Subject").unwrap(), Some("Hi"));
        assert_eq!(record.updated_field_names().len(), 1);
    }

    #[test]
    fn test_fields_applied_in_document_order() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"doc": {"Zeta": "1", "_owner": "x", "Alpha": "2"}}"#).unwrap();
        let doc = UNode::from_json(&json).unwrap();
        let mut record = Record::new();
        assert!(matches!(
            record.parse(&doc),
            Err(ValidationError::UnknownSystemField { .. })
        ));
        assert_eq!(record.field_value("Zeta").unwrap(), Some("1"));
        assert_eq!(record.field_value("Alpha").unwrap(), None);
    }

    #[test]
    fn test_remove_on_system_field_fails() {
        let result = parse_json(json!({"doc": {"_ID": {"remove": ["x1"]}}}));
        assert!(matches!(
            result,
            Err(ValidationError::SystemFieldRemoval { .. })
        ));
    }

    #[test]
    fn test_system_field_batch_of_one() {
        let record = parse_json(json!({"doc": {"_ID": {"add": ["x1", "x1"]}}})).unwrap();
        assert_eq!(record.object_id(), Some("x1"));

        let result = parse_json(json!({"doc": {"_ID": {"add": ["x1", "x2"]}}}));
        assert!(matches!(
            result,
            Err(ValidationError::SystemFieldMultiValued { count: 2, .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut doc = UNode::create_map_node("doc");
        doc.add_map_node("G1")
            .add_map_node("G2")
            .add_map_node("G3")
            .add_value_node("Deep", "x");

        let mut record = Record::new();
        let options = ParseOptions::new().with_max_depth(3);
        assert_eq!(
            record.parse_with_options(&doc, options).unwrap_err(),
            ValidationError::NestingTooDeep { depth: 4, max: 3 }
        );

        let options = ParseOptions::new().with_max_depth(4);
        record.parse_with_options(&doc, options).unwrap();
        assert_eq!(record.field_value("Deep").unwrap(), Some("x"));
    }

    #[test]
    fn test_parse_is_additive() {
        let mut record = Record::new();
        record.add_field_value("Tags", "A").unwrap();
        let doc = UNode::from_json(&json!({"doc": {"Tags": "B"}})).unwrap();
        record.parse(&doc).unwrap().add_field_value("Tags", "C").unwrap();
        assert_eq!(
            record.field_values("Tags").unwrap(),
            Some(&["A".to_string(), "B".to_string(), "C".to_string()][..])
        );
    }

    #[test]
    fn test_grouped_doc_reads_back_flat() {
        let mut table = TableDef::new("Message");
        table.add_field(FieldDef::group("Content")).unwrap();
        table
            .add_nested_field("Content", FieldDef::new("Body", FieldType::Text))
            .unwrap();
        table
            .add_nested_field("Content", FieldDef::new("Tags", FieldType::Text).collection())
            .unwrap();

        let original = RecordBuilder::new()
            .id("x1")
            .table("Message")
            .value("Body", "text")
            .values("Tags", ["a", "b"])
            .remove("Tags", ["c"])
            .value("Subject", "Hi")
            .build()
            .unwrap();
        let doc = original.to_grouped_doc(&table).unwrap();
        let json = doc.to_json_string();

        let reparsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record = parse_json(reparsed).unwrap();
        assert_eq!(record, original);
    }

    proptest! {
        #[test]
        fn prop_flat_doc_round_trip(
            adds in prop::collection::btree_map(
                "[A-Z][a-z]{0,6}",
                prop::collection::btree_set("[a-z0-9]{1,5}", 1..4),
                0..6,
            ),
            removes in prop::collection::btree_map(
                "[A-Z][a-z]{0,6}",
                prop::collection::btree_set("[a-z0-9]{1,5}", 1..3),
                0..3,
            ),
            deleted in any::<bool>(),
        ) {
            let mut original = Record::with_id("x1", "T");
            original.set_deleted(deleted);
            for (name, values) in &adds {
                original.add_field_values(name, values.iter().cloned()).unwrap();
            }
            for (name, values) in &removes {
                original.remove_field_values(name, values.iter().cloned()).unwrap();
            }

            let mut parsed = Record::new();
            parsed.parse(&original.to_doc()).unwrap();

            prop_assert_eq!(parsed.object_id(), Some("x1"));
            prop_assert_eq!(parsed.table_name(), Some("T"));
            prop_assert_eq!(parsed.is_deleted(), deleted);
            prop_assert_eq!(parsed.updated_field_names(), original.updated_field_names());
            for (name, values) in &adds {
                let expected: Vec<String> = values.iter().cloned().collect();
                prop_assert_eq!(parsed.field_values(name).unwrap(), Some(&expected[..]));
            }
            for (name, values) in &removes {
                let expected: Vec<String> = values.iter().cloned().collect();
                prop_assert_eq!(parsed.remove_values(name), Some(expected));
            }
        }
    }
}
