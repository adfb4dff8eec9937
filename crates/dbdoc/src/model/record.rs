//! Pending field updates of one database object.
//!
//! A [`Record`] holds, per field, the values to add and the values to remove
//! when the update is applied to storage. The system fields `_ID`, `_table`,
//! and `_deleted` live in dedicated attributes; `_shard` is kept as a
//! single-valued entry of the add map.
//!
//! Field types and cardinality are not checked here: assigning a value a
//! field cannot hold fails only when the update is applied.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::codec::{ParseOptions, parse_doc_with_options, to_doc, to_grouped_doc};
use crate::error::ValidationError;
use crate::limits::DELETED_TRUE;
use crate::model::field::{DELETED_FIELD, FieldName, ID_FIELD, SHARD_FIELD, TABLE_FIELD};
use crate::schema::FieldSchema;
use crate::tree::UNode;

/// Pending add/remove state of a single database object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    object_id: Option<String>,
    table_name: Option<String>,
    deleted: bool,
    /// Values to add, per field. Duplicates are kept.
    values: FxHashMap<String, Vec<String>>,
    /// Values to remove, per field. Duplicates are kept.
    removals: FxHashMap<String, Vec<String>>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record with the given `_ID` and `_table` values.
    pub fn with_id(object_id: impl Into<String>, table_name: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.set_object_id(object_id);
        record.set_table_name(table_name);
        record
    }

    /// Returns true if no field, system or user, has a value.
    pub fn is_empty(&self) -> bool {
        self.object_id.is_none()
            && self.table_name.is_none()
            && !self.deleted
            && self.values.is_empty()
            && self.removals.is_empty()
    }

    // =========================================================================
    // System fields
    // =========================================================================

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    /// Sets `_ID`, replacing any previous value. An empty ID unsets it.
    pub fn set_object_id(&mut self, object_id: impl Into<String>) {
        self.object_id = non_empty(object_id.into());
    }

    pub fn clear_object_id(&mut self) {
        self.object_id = None;
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Sets `_table`, replacing any previous value. An empty name unsets it.
    pub fn set_table_name(&mut self, table_name: impl Into<String>) {
        self.table_name = non_empty(table_name.into());
    }

    pub fn clear_table_name(&mut self) {
        self.table_name = None;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn set_deleted(&mut self, deleted: bool) {
        self.deleted = deleted;
    }

    /// Returns the `_shard` value, if any.
    pub fn shard_name(&self) -> Option<&str> {
        self.values
            .get(SHARD_FIELD)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Sets `_shard`, replacing any previous value.
    pub fn set_shard_name(&mut self, shard_name: impl Into<String>) {
        self.values
            .insert(SHARD_FIELD.to_string(), vec![shard_name.into()]);
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Adds one value to a field.
    ///
    /// An empty value is ignored, whatever the field name (other than an
    /// empty one). System fields are assigned through their
    /// dedicated attributes; `_deleted` is set from a case-insensitive
    /// `"true"`.
    pub fn add_field_value(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ValidationError> {
        require_name(name)?;
        let value = value.into();
        if value.is_empty() {
            return Ok(());
        }
        match FieldName::classify(name)? {
            FieldName::User(name) => {
                self.values.entry(name.to_string()).or_default().push(value);
            }
            system => self.set_system_field(system, value),
        }
        Ok(())
    }

    /// Adds values to a field. Nothing happens if `values` is empty.
    ///
    /// System fields accept exactly one value.
    pub fn add_field_values<I, S>(&mut self, name: &str, values: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        require_name(name)?;
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Ok(());
        }
        match FieldName::classify(name)? {
            FieldName::User(name) => {
                self.values
                    .entry(name.to_string())
                    .or_default()
                    .append(&mut values);
            }
            system => {
                if values.len() != 1 {
                    return Err(ValidationError::SystemFieldMultiValued {
                        field: system.to_string(),
                        count: values.len(),
                    });
                }
                if let Some(value) = values.pop() {
                    self.set_system_field(system, value);
                }
            }
        }
        Ok(())
    }

    /// Marks values to be removed from an MV field. Nothing happens if
    /// `values` is empty. System fields cannot have values removed.
    pub fn remove_field_values<I, S>(
        &mut self,
        name: &str,
        values: I,
    ) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        require_name(name)?;
        let mut values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            return Ok(());
        }
        match FieldName::classify(name)? {
            FieldName::User(name) => {
                self.removals
                    .entry(name.to_string())
                    .or_default()
                    .append(&mut values);
                Ok(())
            }
            system => Err(ValidationError::SystemFieldRemoval {
                field: system.to_string(),
            }),
        }
    }

    /// Deletes both the add and the remove values of a field.
    ///
    /// For a system field this resets the field to its unset state.
    pub fn clear_values(&mut self, name: &str) -> Result<(), ValidationError> {
        match FieldName::classify(name)? {
            FieldName::ObjectId => self.object_id = None,
            FieldName::TableName => self.table_name = None,
            FieldName::Deleted => self.deleted = false,
            FieldName::Shard => {
                self.values.remove(SHARD_FIELD);
            }
            FieldName::User(name) => {
                self.values.remove(name);
                self.removals.remove(name);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns the single value of a user or system field.
    ///
    /// Fails if a user field holds more than one value.
    pub fn field_value(&self, name: &str) -> Result<Option<&str>, ValidationError> {
        match FieldName::classify(name)? {
            FieldName::User(name) => match self.values.get(name).map(Vec::as_slice) {
                None | Some([]) => Ok(None),
                Some([value]) => Ok(Some(value.as_str())),
                Some(values) => Err(ValidationError::MultipleValues {
                    field: name.to_string(),
                    count: values.len(),
                }),
            },
            system => Ok(self.system_field(system)),
        }
    }

    /// Returns all values to add for a user field, duplicates included.
    ///
    /// System fields must be read through their dedicated accessors.
    pub fn field_values(&self, name: &str) -> Result<Option<&[String]>, ValidationError> {
        match FieldName::classify(name)? {
            FieldName::User(name) => Ok(self.values.get(name).map(Vec::as_slice)),
            system => Err(ValidationError::SystemFieldAccessor {
                field: system.to_string(),
            }),
        }
    }

    /// Returns a copy of the values to remove for a field.
    pub fn remove_values(&self, name: &str) -> Option<Vec<String>> {
        self.removals.get(name).cloned()
    }

    /// Names of all fields that have a value, including set system fields.
    ///
    /// Fields that only have remove values are not included.
    pub fn field_names(&self) -> FxHashSet<String> {
        let mut names: FxHashSet<String> = self.values.keys().cloned().collect();
        if self.object_id.is_some() {
            names.insert(ID_FIELD.to_string());
        }
        if self.table_name.is_some() {
            names.insert(TABLE_FIELD.to_string());
        }
        if self.deleted {
            names.insert(DELETED_FIELD.to_string());
        }
        names
    }

    /// Names of all fields with add and/or remove values.
    ///
    /// `_ID`, `_table`, and `_deleted` are never included; `_shard` is, when
    /// set, since it is stored with the add values.
    pub fn updated_field_names(&self) -> FxHashSet<String> {
        self.values
            .keys()
            .chain(self.removals.keys())
            .cloned()
            .collect()
    }

    /// Names of updated fields that the schema classifies as scalar.
    pub fn updated_scalar_field_names<S>(&self, schema: &S) -> FxHashSet<String>
    where
        S: FieldSchema + ?Sized,
    {
        self.values
            .keys()
            .chain(self.removals.keys())
            .filter(|name| schema.is_scalar_field(name))
            .cloned()
            .collect()
    }

    /// Raw add values of a field, `_shard` included.
    pub(crate) fn added(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Raw remove values of a field.
    pub(crate) fn removed(&self, name: &str) -> Option<&[String]> {
        self.removals.get(name).map(Vec::as_slice)
    }

    // =========================================================================
    // Tree conversion
    // =========================================================================

    /// Applies the updates of a `"doc"` tree to this record.
    ///
    /// Updates applied before an error is found are kept.
    pub fn parse(&mut self, doc: &UNode) -> Result<&mut Self, ValidationError> {
        self.parse_with_options(doc, ParseOptions::default())
    }

    /// Like [`Record::parse`], with explicit parse limits.
    pub fn parse_with_options(
        &mut self,
        doc: &UNode,
        options: ParseOptions,
    ) -> Result<&mut Self, ValidationError> {
        parse_doc_with_options(self, doc, options)?;
        Ok(self)
    }

    /// Serializes this record as a flat `"doc"` tree.
    pub fn to_doc(&self) -> UNode {
        to_doc(self)
    }

    /// Serializes this record as a `"doc"` tree that nests fields inside
    /// their group fields.
    pub fn to_grouped_doc<S>(&self, schema: &S) -> Result<UNode, ValidationError>
    where
        S: FieldSchema + ?Sized,
    {
        to_grouped_doc(self, schema)
    }

    // =========================================================================
    // System field adapter
    // =========================================================================

    fn system_field(&self, field: FieldName<'_>) -> Option<&str> {
        match field {
            FieldName::ObjectId => self.object_id(),
            FieldName::TableName => self.table_name(),
            FieldName::Deleted => self.deleted.then_some(DELETED_TRUE),
            FieldName::Shard => self.shard_name(),
            FieldName::User(_) => None,
        }
    }

    fn set_system_field(&mut self, field: FieldName<'_>, value: String) {
        match field {
            FieldName::ObjectId => self.set_object_id(value),
            FieldName::TableName => self.set_table_name(value),
            FieldName::Deleted => self.deleted = value.eq_ignore_ascii_case(DELETED_TRUE),
            FieldName::Shard => self.set_shard_name(value),
            FieldName::User(_) => {}
        }
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object: {}", self.object_id().unwrap_or("null"))
    }
}

fn require_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyFieldName);
    }
    Ok(())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}
