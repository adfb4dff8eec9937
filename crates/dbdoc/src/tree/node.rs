//! Generic named tree used as the wire-format independent document shape.
//!
//! A node is exactly one of: a scalar value, a map of uniquely named
//! children, or an array of children. Renderers (JSON here) turn a tree into
//! bytes; parsers build a tree from bytes.

use rustc_hash::FxHashMap;

/// Content of a [`UNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Scalar leaf.
    Value(String),
    /// Children with unique names, in insertion order.
    Map(Vec<UNode>),
    /// Children in order; names may repeat.
    Array(Vec<UNode>),
}

/// A named node of a generic document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UNode {
    name: String,
    tag: Option<String>,
    kind: NodeKind,
    /// Member name to position, maintained for map nodes only.
    index: FxHashMap<String, usize>,
}

impl UNode {
    /// Creates a root map node.
    pub fn create_map_node(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Map(Vec::new()))
    }

    /// Creates a root array node.
    pub fn create_array_node(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Array(Vec::new()))
    }

    /// Creates a detached value node.
    pub fn create_value_node(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Value(value.into()))
    }

    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            tag: None,
            kind,
            index: FxHashMap::default(),
        }
    }

    /// Sets the node's tag, returning the node.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Optional element tag, used by renderers that type their elements.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_value(&self) -> bool {
        matches!(self.kind, NodeKind::Value(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, NodeKind::Map(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, NodeKind::Array(_))
    }

    /// Returns true for maps and arrays.
    pub fn is_collection(&self) -> bool {
        !self.is_value()
    }

    /// Returns the scalar value of a value node.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the children of a map or array; empty for a value node.
    pub fn members(&self) -> &[UNode] {
        match &self.kind {
            NodeKind::Map(members) | NodeKind::Array(members) => members,
            NodeKind::Value(_) => &[],
        }
    }

    pub fn has_members(&self) -> bool {
        !self.members().is_empty()
    }

    /// Names of the children, in order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members().iter().map(UNode::name)
    }

    /// Returns the first child with the given name.
    pub fn member(&self, name: &str) -> Option<&UNode> {
        match &self.kind {
            NodeKind::Map(members) => self.index.get(name).map(|&pos| &members[pos]),
            NodeKind::Array(members) => members.iter().find(|member| member.name == name),
            NodeKind::Value(_) => None,
        }
    }

    /// Adds a value child and returns it.
    ///
    /// # Panics
    ///
    /// Panics if this node is a value node.
    pub fn add_value_node(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut UNode {
        self.add_child(UNode::create_value_node(name, value))
    }

    /// Adds a tagged value child and returns it.
    pub fn add_tagged_value_node(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        tag: impl Into<String>,
    ) -> &mut UNode {
        self.add_child(UNode::create_value_node(name, value).with_tag(tag))
    }

    /// Adds a map child and returns it.
    pub fn add_map_node(&mut self, name: impl Into<String>) -> &mut UNode {
        self.add_child(UNode::create_map_node(name))
    }

    /// Adds a tagged map child and returns it.
    pub fn add_tagged_map_node(&mut self, name: impl Into<String>, tag: impl Into<String>) -> &mut UNode {
        self.add_child(UNode::create_map_node(name).with_tag(tag))
    }

    /// Adds an array child and returns it.
    pub fn add_array_node(&mut self, name: impl Into<String>) -> &mut UNode {
        self.add_child(UNode::create_array_node(name))
    }

    /// Adds a child node and returns it.
    ///
    /// In a map, a child with the same name as an existing one replaces it
    /// in place.
    ///
    /// # Panics
    ///
    /// Panics if this node is a value node.
    pub fn add_child(&mut self, child: UNode) -> &mut UNode {
        match &mut self.kind {
            NodeKind::Map(members) => {
                let pos = match self.index.get(child.name.as_str()) {
                    Some(&pos) => {
                        members[pos] = child;
                        pos
                    }
                    None => {
                        let pos = members.len();
                        self.index.insert(child.name.clone(), pos);
                        members.push(child);
                        pos
                    }
                };
                &mut members[pos]
            }
            NodeKind::Array(members) => {
                members.push(child);
                let last = members.len() - 1;
                &mut members[last]
            }
            NodeKind::Value(_) => panic!("cannot add child {:?} to value node {:?}", child.name, self.name),
        }
    }
}

impl std::fmt::Display for UNode {
    /// Short diagnostic form used in error messages.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            NodeKind::Value(value) => write!(f, "{}={:?}", self.name, value),
            NodeKind::Map(members) => write!(f, "{} {{{} members}}", self.name, members.len()),
            NodeKind::Array(members) => write!(f, "{} [{} members]", self.name, members.len()),
        }
    }
}
