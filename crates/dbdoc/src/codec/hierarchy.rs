//! Group hierarchy resolution for grouped serialization.
//!
//! Given the names of updated fields and a schema, decides which fields are
//! rendered directly under the document root and which group fields must be
//! materialized to hold the nested ones.

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::error::ValidationError;
use crate::schema::{FieldDef, FieldSchema};

/// Placement of a record's updated fields within the schema's groups.
#[derive(Debug, Clone, Default)]
pub struct GroupHierarchy<'s> {
    /// Updated fields that are undeclared or not nested, sorted by name.
    root_fields: Vec<String>,
    /// Updated fields that are nested in a group, sorted by name.
    nested_fields: Vec<String>,
    /// Nested updated fields plus every ancestor group of them.
    deferred: FxHashSet<&'s str>,
    /// Deferred groups that are not nested themselves, sorted by name.
    root_groups: Vec<&'s FieldDef>,
}

impl<'s> GroupHierarchy<'s> {
    pub fn root_fields(&self) -> &[String] {
        &self.root_fields
    }

    pub fn nested_fields(&self) -> &[String] {
        &self.nested_fields
    }

    pub fn root_groups(&self) -> &[&'s FieldDef] {
        &self.root_groups
    }

    /// Returns true if the named field is a nested updated field or one of
    /// their ancestor groups.
    pub fn contains(&self, name: &str) -> bool {
        self.deferred.contains(name)
    }
}

/// Resolves the group hierarchy of the given updated field names.
///
/// Parent chains are walked upward until a group already seen is reached.
/// A chain that revisits one of its own fields is reported as
/// [`ValidationError::CyclicGroupHierarchy`]; a parent name the schema does
/// not declare as [`ValidationError::UnknownParentField`].
pub fn resolve_groups<'s, I, S>(
    updated_names: I,
    schema: &'s S,
) -> Result<GroupHierarchy<'s>, ValidationError>
where
    I: IntoIterator<Item = String>,
    S: FieldSchema + ?Sized,
{
    let mut names: Vec<String> = updated_names.into_iter().collect();
    names.sort_unstable();

    let mut hierarchy = GroupHierarchy::default();
    for name in names {
        match schema.field_def(&name) {
            Some(def) if def.is_nested() => {
                hierarchy.deferred.insert(def.name());
                walk_ancestors(def, schema, &mut hierarchy.deferred)?;
                hierarchy.nested_fields.push(name);
            }
            _ => hierarchy.root_fields.push(name),
        }
    }

    let mut root_groups: Vec<&FieldDef> = hierarchy
        .deferred
        .iter()
        .filter_map(|name| schema.field_def(name))
        .filter(|def| !def.is_nested())
        .collect();
    root_groups.sort_unstable_by(|a, b| a.name().cmp(b.name()));
    hierarchy.root_groups = root_groups;

    trace!(
        root_fields = hierarchy.root_fields.len(),
        nested_fields = hierarchy.nested_fields.len(),
        groups = hierarchy.root_groups.len(),
        "resolved group hierarchy"
    );
    Ok(hierarchy)
}

/// Inserts every ancestor group of `field` into `deferred`, stopping at the
/// first ancestor that is already present.
fn walk_ancestors<'s, S>(
    field: &'s FieldDef,
    schema: &'s S,
    deferred: &mut FxHashSet<&'s str>,
) -> Result<(), ValidationError>
where
    S: FieldSchema + ?Sized,
{
    let mut chain: FxHashSet<&str> = FxHashSet::default();
    chain.insert(field.name());

    let mut current = field;
    while let Some(parent_name) = current.parent_field() {
        if !chain.insert(parent_name) {
            return Err(ValidationError::CyclicGroupHierarchy {
                field: field.name().to_string(),
            });
        }
        let parent = schema
            .field_def(parent_name)
            .ok_or_else(|| ValidationError::UnknownParentField {
                field: current.name().to_string(),
                parent: parent_name.to_string(),
            })?;
        if !deferred.insert(parent.name()) {
            break;
        }
        current = parent;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldType, TableDef};

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn make_nested_table() -> TableDef {
        let mut table = TableDef::new("T");
        table.add_field(FieldDef::new("Plain", FieldType::Text)).unwrap();
        table.add_field(FieldDef::group("G1")).unwrap();
        table.add_nested_field("G1", FieldDef::group("G2")).unwrap();
        table
            .add_nested_field("G1", FieldDef::new("Shallow", FieldType::Text))
            .unwrap();
        table
            .add_nested_field("G2", FieldDef::new("Deep", FieldType::Text))
            .unwrap();
        table.add_field(FieldDef::group("Other")).unwrap();
        table
            .add_nested_field("Other", FieldDef::new("Lone", FieldType::Text))
            .unwrap();
        table
    }

    #[test]
    fn test_partition_root_and_nested() {
        let table = make_nested_table();
        let h = resolve_groups(strings(&["Deep", "Plain", "Undeclared"]), &table).unwrap();

        assert_eq!(h.root_fields(), &strings(&["Plain", "Undeclared"])[..]);
        assert_eq!(h.nested_fields(), &strings(&["Deep"])[..]);
        assert!(h.contains("Deep"));
        assert!(h.contains("G2"));
        assert!(h.contains("G1"));
        assert!(!h.contains("Shallow"));
        assert!(!h.contains("Other"));

        let roots: Vec<&str> = h.root_groups().iter().map(|d| d.name()).collect();
        assert_eq!(roots, vec!["G1"]);
    }

    #[test]
    fn test_multiple_root_groups_sorted() {
        let table = make_nested_table();
        let h = resolve_groups(strings(&["Lone", "Shallow", "Deep"]), &table).unwrap();
        let roots: Vec<&str> = h.root_groups().iter().map(|d| d.name()).collect();
        assert_eq!(roots, vec!["G1", "Other"]);
        assert!(h.root_fields().is_empty());
    }

    #[test]
    fn test_no_schema_entries() {
        let table = TableDef::new("Empty");
        let h = resolve_groups(strings(&["B", "A"]), &table).unwrap();
        assert_eq!(h.root_fields(), &strings(&["A", "B"])[..]);
        assert!(h.root_groups().is_empty());
    }

    #[test]
    fn test_cycle_detected() {
        let mut table = TableDef::new("Bad");
        table.insert(FieldDef::group("A").with_parent("B").with_nested("B").with_nested("X"));
        table.insert(FieldDef::group("B").with_parent("A").with_nested("A"));
        table.insert(FieldDef::new("X", FieldType::Text).with_parent("A"));

        let result = resolve_groups(strings(&["X"]), &table);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::CyclicGroupHierarchy {
                field: "X".to_string()
            }
        );
    }

    #[test]
    fn test_self_parent_detected() {
        let mut table = TableDef::new("Bad");
        table.insert(FieldDef::group("G").with_parent("G"));
        let result = resolve_groups(strings(&["G"]), &table);
        assert!(matches!(
            result,
            Err(ValidationError::CyclicGroupHierarchy { .. })
        ));
    }

    #[test]
    fn test_unknown_parent() {
        let mut table = TableDef::new("Bad");
        table.insert(FieldDef::new("X", FieldType::Text).with_parent("Ghost"));
        let result = resolve_groups(strings(&["X"]), &table);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::UnknownParentField {
                field: "X".to_string(),
                parent: "Ghost".to_string()
            }
        );
    }
}
