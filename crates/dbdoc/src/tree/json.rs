//! JSON rendering and parsing of [`UNode`] trees.
//!
//! A tree renders as a single-key object `{root_name: body}`:
//! - value nodes render as strings
//! - maps render as objects keyed by member name
//! - arrays render as JSON arrays; a member that is a value node named
//!   `"value"` renders as a bare string, any other member as `{name: body}`
//!
//! Parsing is the inverse, with JSON numbers and booleans read as their
//! string form and `null` read as the empty string.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::limits::{MAX_NESTING_DEPTH, VALUE};
use crate::tree::node::{NodeKind, UNode};

impl UNode {
    /// Renders this node as `{name: body}`.
    pub fn to_json(&self) -> Value {
        let mut object = Map::with_capacity(1);
        object.insert(self.name().to_string(), body_to_json(self));
        Value::Object(object)
    }

    /// Renders this node as a compact JSON string.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// Renders this node as an indented JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }

    /// Builds a tree from a parsed JSON document.
    ///
    /// The document must be an object with exactly one key, which names the
    /// root node.
    pub fn from_json(json: &Value) -> Result<UNode, ValidationError> {
        let (name, body) = single_entry(json).ok_or(ValidationError::MissingDocRoot)?;
        node_from_json(name, body, 0)
    }
}

/// Returns the only entry of a single-key object.
fn single_entry(json: &Value) -> Option<(&String, &Value)> {
    match json {
        Value::Object(object) if object.len() == 1 => object.iter().next(),
        _ => None,
    }
}

fn body_to_json(node: &UNode) -> Value {
    match node.kind() {
        NodeKind::Value(value) => Value::String(value.clone()),
        NodeKind::Map(members) => {
            let mut object = Map::with_capacity(members.len());
            for member in members {
                object.insert(member.name().to_string(), body_to_json(member));
            }
            Value::Object(object)
        }
        NodeKind::Array(members) => Value::Array(
            members
                .iter()
                .map(|member| match member.value() {
                    Some(value) if member.name() == VALUE => Value::String(value.to_string()),
                    _ => member.to_json(),
                })
                .collect(),
        ),
    }
}

fn node_from_json(name: &str, body: &Value, depth: usize) -> Result<UNode, ValidationError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(ValidationError::NestingTooDeep {
            depth,
            max: MAX_NESTING_DEPTH,
        });
    }
    let node = match body {
        Value::Null => UNode::create_value_node(name, ""),
        Value::Bool(b) => UNode::create_value_node(name, b.to_string()),
        Value::Number(n) => UNode::create_value_node(name, n.to_string()),
        Value::String(s) => UNode::create_value_node(name, s.as_str()),
        Value::Object(object) => {
            let mut node = UNode::create_map_node(name);
            for (key, child) in object {
                node.add_child(node_from_json(key, child, depth + 1)?);
            }
            node
        }
        Value::Array(items) => {
            let mut node = UNode::create_array_node(name);
            for item in items {
                let child = match single_entry(item) {
                    Some((key, body)) => node_from_json(key, body, depth + 1)?,
                    None => node_from_json(VALUE, item, depth + 1)?,
                };
                node.add_child(child);
            }
            node
        }
    };
    Ok(node)
}
