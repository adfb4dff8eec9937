//! Record to tree serialization.
//!
//! Both forms produce a map node named `"doc"` that starts with the set
//! system fields (`_ID`, `_table`, `_deleted`). Every updated field is then
//! rendered by the leaf rule:
//!
//! - exactly one distinct add value and no remove values: a scalar leaf
//! - otherwise: a map with an `"add"` array (sorted, deduplicated) and/or a
//!   `"remove"` array (original order, duplicates kept)
//!
//! The flat form puts every field under the root. The grouped form nests
//! fields inside their group fields as declared by the schema.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::codec::hierarchy::{GroupHierarchy, resolve_groups};
use crate::error::ValidationError;
use crate::limits::{ADD, DELETED_TRUE, DOC_ROOT, FIELD_TAG, REMOVE, VALUE};
use crate::model::{DELETED_FIELD, ID_FIELD, Record, TABLE_FIELD};
use crate::schema::{FieldDef, FieldSchema};
use crate::tree::UNode;

/// Serializes a record as a flat `"doc"` tree.
///
/// Group structure is ignored: every updated field becomes a direct child of
/// the root, in name order.
pub fn to_doc(record: &Record) -> UNode {
    let mut doc = UNode::create_map_node(DOC_ROOT);
    add_system_fields(&mut doc, record);

    let mut names: Vec<String> = record.updated_field_names().into_iter().collect();
    names.sort_unstable();
    for name in &names {
        leaf_to_doc(&mut doc, record, name);
    }

    debug!(object_id = ?record.object_id(), fields = names.len(), "serialized flat doc");
    doc
}

/// Serializes a record as a `"doc"` tree with nested fields placed inside
/// their group fields.
///
/// Undeclared and top-level fields are rendered under the root. Group fields
/// appear only when at least one of their (possibly indirect) children was
/// updated; children that were not updated are omitted. A root group that
/// also holds values of its own is rendered as the group; its own values are
/// dropped with a warning.
///
/// The output nests as deep as the schema does. Reading it back with
/// [`parse_doc`](crate::codec::parse_doc) is bounded by
/// [`MAX_NESTING_DEPTH`](crate::limits::MAX_NESTING_DEPTH); documents from
/// deeper schemas need a larger
/// [`ParseOptions::max_depth`](crate::codec::ParseOptions::max_depth).
pub fn to_grouped_doc<S>(record: &Record, schema: &S) -> Result<UNode, ValidationError>
where
    S: FieldSchema + ?Sized,
{
    let mut doc = UNode::create_map_node(DOC_ROOT);
    add_system_fields(&mut doc, record);

    let hierarchy = resolve_groups(record.updated_field_names(), schema)?;
    for name in hierarchy.root_fields() {
        leaf_to_doc(&mut doc, record, name);
    }

    let mut rendered = FxHashSet::default();
    let mut path = Vec::new();
    for group in hierarchy.root_groups() {
        if doc.member(group.name()).is_some() {
            warn!(field = %group.name(), "group field has values of its own; rendering its nested fields instead");
        }
        group_to_doc(&mut doc, record, *group, &hierarchy, schema, &mut path, &mut rendered)?;
    }

    for name in hierarchy.nested_fields() {
        if !rendered.contains(name.as_str()) {
            warn!(field = %name, "nested field is not declared by any group on its parent chain; omitted");
        }
    }

    debug!(
        object_id = ?record.object_id(),
        root_fields = hierarchy.root_fields().len(),
        nested_fields = rendered.len(),
        "serialized grouped doc"
    );
    Ok(doc)
}

fn add_system_fields(doc: &mut UNode, record: &Record) {
    if let Some(id) = record.object_id() {
        doc.add_tagged_value_node(ID_FIELD, id, FIELD_TAG);
    }
    if let Some(table) = record.table_name() {
        doc.add_tagged_value_node(TABLE_FIELD, table, FIELD_TAG);
    }
    if record.is_deleted() {
        doc.add_tagged_value_node(DELETED_FIELD, DELETED_TRUE, FIELD_TAG);
    }
    // _shard is stored with the add values and rendered as a regular field.
}

/// Renders one field's add/remove values under `parent`.
fn leaf_to_doc(parent: &mut UNode, record: &Record, name: &str) {
    let added: BTreeSet<&str> = record
        .added(name)
        .unwrap_or_default()
        .iter()
        .map(String::as_str)
        .collect();
    let removed = record.removed(name).unwrap_or_default();

    if added.len() == 1 && removed.is_empty() {
        if let Some(value) = added.first() {
            parent.add_tagged_value_node(name, *value, FIELD_TAG);
        }
        return;
    }

    let field_node = parent.add_tagged_map_node(name, FIELD_TAG);
    if !added.is_empty() {
        let add_node = field_node.add_array_node(ADD);
        for value in added {
            add_node.add_value_node(VALUE, value);
        }
    }
    if !removed.is_empty() {
        let remove_node = field_node.add_array_node(REMOVE);
        for value in removed {
            remove_node.add_value_node(VALUE, value.as_str());
        }
    }
}

/// Renders a group field and its updated descendants under `parent`.
///
/// `path` holds the groups currently being rendered so that a malformed
/// schema listing an ancestor among a group's children cannot recurse
/// forever.
fn group_to_doc<'s, S>(
    parent: &mut UNode,
    record: &Record,
    group: &'s FieldDef,
    hierarchy: &GroupHierarchy<'s>,
    schema: &'s S,
    path: &mut Vec<&'s str>,
    rendered: &mut FxHashSet<&'s str>,
) -> Result<(), ValidationError>
where
    S: FieldSchema + ?Sized,
{
    if path.contains(&group.name()) {
        return Err(ValidationError::CyclicGroupHierarchy {
            field: group.name().to_string(),
        });
    }
    path.push(group.name());

    let group_node = parent.add_tagged_map_node(group.name(), FIELD_TAG);
    for child_name in group.nested_fields() {
        if !hierarchy.contains(child_name) {
            continue;
        }
        match schema.field_def(child_name) {
            Some(child) if child.is_group() => {
                group_to_doc(group_node, record, child, hierarchy, schema, path, rendered)?;
            }
            _ => {
                leaf_to_doc(group_node, record, child_name);
                rendered.insert(child_name.as_str());
            }
        }
    }

    path.pop();
    Ok(())
}
