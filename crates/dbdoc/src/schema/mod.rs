//! Table schema consumed by grouped serialization and scalar classification.
//!
//! The record model never mutates a schema. It only asks two questions of
//! it through [`FieldSchema`]: is a field scalar, and what is its
//! definition (nesting, group membership, parent, children).
//!
//! [`TableDef`] is the concrete schema shipped with this crate. It can be
//! built in code or loaded from a JSON schema document:
//!
//! ```rust
//! use dbdoc::schema::{FieldSchema, TableDef};
//!
//! let table = TableDef::from_json_str(r#"{
//!     "name": "Message",
//!     "fields": {
//!         "Subject": {"type": "text"},
//!         "Content": {"type": "group", "fields": {
//!             "Body": {"type": "text"}
//!         }}
//!     }
//! }"#).unwrap();
//!
//! let body = table.field_def("Body").unwrap();
//! assert!(body.is_nested());
//! assert_eq!(body.parent_field(), Some("Content"));
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Read-only view of a table's field definitions.
pub trait FieldSchema {
    /// Returns the definition of the named field, if the schema declares it.
    fn field_def(&self, name: &str) -> Option<&FieldDef>;

    /// Returns true if the named field holds scalar values.
    ///
    /// Undeclared fields are implicitly text scalars in a schema-flexible
    /// table, so they count as scalar.
    fn is_scalar_field(&self, name: &str) -> bool {
        self.field_def(name).is_none_or(FieldDef::is_scalar)
    }
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Boolean,
    Integer,
    Long,
    Float,
    Double,
    Timestamp,
    Binary,
    Link,
    Xlink,
    Group,
}

impl FieldType {
    /// Returns true for link types (always multi-valued).
    pub fn is_link(self) -> bool {
        matches!(self, FieldType::Link | FieldType::Xlink)
    }
}

/// Definition of one field in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    field_type: FieldType,
    collection: bool,
    parent: Option<String>,
    nested: Vec<String>,
}

impl FieldDef {
    /// Creates a single-valued, top-level field definition.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            collection: false,
            parent: None,
            nested: Vec::new(),
        }
    }

    /// Creates a top-level group field definition with no children yet.
    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Group)
    }

    /// Marks this field as multi-valued.
    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    /// Sets the parent group field by name.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Appends a declared child field by name.
    pub fn with_nested(mut self, child: impl Into<String>) -> Self {
        self.nested.push(child.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns true if this field is a group of other fields.
    pub fn is_group(&self) -> bool {
        self.field_type == FieldType::Group
    }

    /// Returns true for link and xlink fields.
    pub fn is_link(&self) -> bool {
        self.field_type.is_link()
    }

    /// Returns true for any non-link, non-group field.
    pub fn is_scalar(&self) -> bool {
        !self.is_group() && !self.is_link()
    }

    /// Returns true if the field holds multiple values. Links always do.
    pub fn is_collection(&self) -> bool {
        self.collection || self.is_link()
    }

    /// Returns true if this field is declared inside a group field.
    pub fn is_nested(&self) -> bool {
        self.parent.is_some()
    }

    /// Name of the enclosing group field, if nested.
    pub fn parent_field(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Names of the fields declared inside this group, in declaration order.
    pub fn nested_fields(&self) -> &[String] {
        &self.nested
    }
}

/// Field definitions of one table.
#[derive(Debug, Clone, Default)]
pub struct TableDef {
    name: String,
    fields: FxHashMap<String, FieldDef>,
}

impl TableDef {
    /// Creates an empty table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of declared fields, including nested ones.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over all field definitions in no particular order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.values()
    }

    /// Declares a top-level field.
    pub fn add_field(&mut self, def: FieldDef) -> Result<(), SchemaError> {
        if def.name.is_empty() {
            return Err(SchemaError::EmptyFieldName {
                table: self.name.clone(),
            });
        }
        if self.fields.contains_key(&def.name) {
            return Err(SchemaError::DuplicateField {
                table: self.name.clone(),
                field: def.name,
            });
        }
        self.fields.insert(def.name.clone(), def);
        Ok(())
    }

    /// Declares a field inside an existing group field.
    ///
    /// Links the child to its parent in both directions.
    pub fn add_nested_field(&mut self, group: &str, def: FieldDef) -> Result<(), SchemaError> {
        match self.fields.get(group) {
            Some(parent) if parent.is_group() => {}
            _ => {
                return Err(SchemaError::UnknownGroup {
                    field: def.name,
                    group: group.to_string(),
                })
            }
        }
        let child_name = def.name.clone();
        self.add_field(def.with_parent(group))?;
        if let Some(parent) = self.fields.get_mut(group) {
            parent.nested.push(child_name);
        }
        Ok(())
    }

    /// Inserts a definition as-is, replacing any previous one of that name.
    ///
    /// No parent/child consistency checks are made.
    pub fn insert(&mut self, def: FieldDef) -> Option<FieldDef> {
        self.fields.insert(def.name.clone(), def)
    }

    /// Loads a table definition from a JSON schema document.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let spec: TableSpec = serde_json::from_str(json)?;
        let mut table = TableDef::new(spec.name);
        for (name, field) in spec.fields {
            table.load_field(name, serde_json::from_value(field)?, None)?;
        }
        Ok(table)
    }

    fn load_field(
        &mut self,
        name: String,
        spec: FieldSpec,
        parent: Option<&str>,
    ) -> Result<(), SchemaError> {
        let is_group = spec.field_type == FieldType::Group;
        if !is_group && !spec.fields.is_empty() {
            return Err(SchemaError::NestedNonGroup { field: name });
        }
        if is_group && spec.fields.is_empty() {
            return Err(SchemaError::EmptyGroup { field: name });
        }

        let mut def = FieldDef::new(name.clone(), spec.field_type);
        def.collection = spec.collection;
        def.parent = parent.map(str::to_string);
        def.nested = spec.fields.keys().cloned().collect();
        self.add_field(def)?;

        for (child_name, child) in spec.fields {
            self.load_field(child_name, serde_json::from_value(child)?, Some(&name))?;
        }
        Ok(())
    }
}

impl FieldSchema for TableDef {
    fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }
}

// Field entries are decoded one at a time by `load_field`, in declaration order.
#[derive(Debug, Deserialize)]
struct TableSpec {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct FieldSpec {
    #[serde(rename = "type", default = "default_field_type")]
    field_type: FieldType,
    #[serde(default)]
    collection: bool,
    #[serde(default)]
    fields: Map<String, Value>,
}

fn default_field_type() -> FieldType {
    FieldType::Text
}
