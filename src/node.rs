//! Document model shared by both conversion pipelines
//!
//! A node is decided to be a leaf (one content payload, no element children)
//! or a container (named children, no payload) once, when the markup is
//! parsed; everything downstream dispatches on the variant instead of
//! re-inspecting key presence.

use indexmap::map::{IntoIter, Iter};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar attribute value
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Scalar {
    /// Returns the string value if this is a string, None otherwise
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

/// Attribute map of a node (unordered semantics, unique keys)
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(IndexMap<String, Scalar>);

impl Attributes {
    /// Creates a new empty attribute map
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Returns the number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map holds no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a reference to the value for the given attribute
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.0.get(name)
    }

    /// Returns the string value for the given attribute, if it is a string
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Scalar::as_str)
    }

    /// Returns true if the map contains the given attribute
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Inserts an attribute, returning the previous value if present
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.0.insert(name.into(), value.into())
    }

    /// Returns an iterator over attribute name/value pairs
    pub fn iter(&self) -> Iter<'_, String, Scalar> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Scalar);
    type IntoIter = Iter<'a, String, Scalar>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Scalar)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, Scalar)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

/// One or many sibling nodes sharing a child key
///
/// Whether the source markup had one element of a name or several is recorded
/// structurally, but the distinction has no filesystem meaning, so equality
/// treats `One(x)` and `Many([x])` as the same shape.
#[derive(Clone, Debug)]
pub enum NodeSet {
    One(Node),
    Many(Vec<Node>),
}

impl NodeSet {
    /// Returns the number of nodes in the set
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(nodes) => nodes.len(),
        }
    }

    /// Returns true if the set holds no nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the nodes in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        match self {
            Self::One(node) => std::slice::from_ref(node).iter(),
            Self::Many(nodes) => nodes.iter(),
        }
    }

    /// Returns the node if the set holds exactly one, None otherwise
    pub fn single(&self) -> Option<&Node> {
        match self {
            Self::One(node) => Some(node),
            Self::Many(nodes) => match nodes.as_slice() {
                [only] => Some(only),
                _ => None,
            },
        }
    }

    /// Consumes the set into a vector of nodes
    pub fn into_vec(self) -> Vec<Node> {
        match self {
            Self::One(node) => vec![node],
            Self::Many(nodes) => nodes,
        }
    }
}

impl PartialEq for NodeSet {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::One(a), Self::One(b)) => a == b,
            (Self::Many(a), Self::Many(b)) => a == b,
            (Self::One(a), Self::Many(b)) | (Self::Many(b), Self::One(a)) => {
                matches!(b.as_slice(), [only] if only == a)
            }
        }
    }
}

/// Named children of a container node, in document order
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Children(IndexMap<String, NodeSet>);

impl Children {
    /// Creates a new empty child map
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Returns the number of child keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the map holds no children
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the node set under the given key
    pub fn get(&self, key: &str) -> Option<&NodeSet> {
        self.0.get(key)
    }

    /// Returns true if the map contains the given key
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Inserts a node set under a key, replacing any previous set
    pub fn insert(&mut self, key: impl Into<String>, set: NodeSet) -> Option<NodeSet> {
        self.0.insert(key.into(), set)
    }

    /// Appends a node under a key, folding repeated keys into `Many`
    /// without disturbing the key's position
    pub fn append(&mut self, key: impl Into<String>, node: Node) {
        let key = key.into();
        match self.0.get_mut(&key) {
            None => {
                self.0.insert(key, NodeSet::One(node));
            }
            Some(slot) => {
                let previous = std::mem::replace(slot, NodeSet::Many(Vec::new()));
                *slot = match previous {
                    NodeSet::One(first) => NodeSet::Many(vec![first, node]),
                    NodeSet::Many(mut nodes) => {
                        nodes.push(node);
                        NodeSet::Many(nodes)
                    }
                };
            }
        }
    }

    /// Removes and returns the node set under the given key
    pub fn remove(&mut self, key: &str) -> Option<NodeSet> {
        self.0.shift_remove(key)
    }

    /// Returns an iterator over key/set pairs in document order
    pub fn iter(&self) -> Iter<'_, String, NodeSet> {
        self.0.iter()
    }

    /// Returns an iterator over every child node in document order,
    /// flattening the one-vs-many distinction
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.0.values().flat_map(NodeSet::iter)
    }
}

impl<'a> IntoIterator for &'a Children {
    type Item = (&'a String, &'a NodeSet);
    type IntoIter = Iter<'a, String, NodeSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Children {
    type Item = (String, NodeSet);
    type IntoIter = IntoIter<String, NodeSet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// A leaf content node: one payload, no element children; maps to one file
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    pub attributes: Attributes,
    pub payload: String,
}

/// A container node: named children, no payload; maps to a directory or a
/// named substructure inside its parent
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    pub attributes: Attributes,
    pub children: Children,
}

/// A document-model node
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Leaf(Leaf),
    Container(Container),
}

impl Node {
    /// Creates a leaf node from attributes and a payload
    pub fn leaf(attributes: Attributes, payload: impl Into<String>) -> Self {
        Self::Leaf(Leaf {
            attributes,
            payload: payload.into(),
        })
    }

    /// Creates a container node from attributes and children
    pub fn container(attributes: Attributes, children: Children) -> Self {
        Self::Container(Container {
            attributes,
            children,
        })
    }

    /// Returns true if this node carries a content payload
    pub fn has_payload(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns the attribute map of this node; total for both variants
    pub fn attributes(&self) -> &Attributes {
        match self {
            Self::Leaf(leaf) => &leaf.attributes,
            Self::Container(container) => &container.attributes,
        }
    }

    /// Returns the payload if this is a leaf, None otherwise
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.payload),
            Self::Container(_) => None,
        }
    }

    /// Returns the leaf if this is a leaf node, None otherwise
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Container(_) => None,
        }
    }

    /// Returns the container if this is a container node, None otherwise
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Leaf(_) => None,
            Self::Container(container) => Some(container),
        }
    }

    /// Returns the node set under the given child key, None for leaves
    pub fn child(&self, key: &str) -> Option<&NodeSet> {
        self.as_container().and_then(|c| c.children.get(key))
    }
}
