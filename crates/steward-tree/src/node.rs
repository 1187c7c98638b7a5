//! Configuration tree nodes.

use crate::scalar::Scalar;

/// Path segment addressing a node's own value in dotted lookups.
///
/// Source documents mark a node's payload with a `[v]` entry. The tree stores
/// that payload in [`ConfigNode::value`] instead, so the segment is accepted
/// by [`ConfigNode::fetch`] and resolves to the node itself.
pub const VALUE_MARKER: &str = "[v]";

/// Classification of a node for serialization purposes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind<'a> {
    /// The node has child entries. Any value it carries is not rendered.
    Branch,
    /// The node has no children and carries a value.
    Leaf(&'a Scalar),
    /// The node has neither children nor a value.
    Empty,
}

/// One entry of the configuration tree.
///
/// Keys need not be unique among siblings and children keep insertion order,
/// which is also the order they are rendered in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigNode {
    key: String,
    value: Option<Scalar>,
    children: Vec<ConfigNode>,
}

impl ConfigNode {
    /// Creates an empty node.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Creates a node carrying a value.
    #[must_use]
    pub fn leaf(key: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    /// Appends a child and returns the node, for building trees inline.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the value and returns the node.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Scalar>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Appends a child.
    pub fn push(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Replaces the node's value.
    pub fn set_value(&mut self, value: Option<Scalar>) {
        self.value = value;
    }

    /// The node's key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// The node's own value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Scalar> {
        self.value.as_ref()
    }

    pub(crate) fn value_mut(&mut self) -> Option<&mut Scalar> {
        self.value.as_mut()
    }

    /// Child entries in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Self] {
        &mut self.children
    }

    /// Classifies the node. Children take precedence over a value.
    #[must_use]
    pub fn kind(&self) -> NodeKind<'_> {
        match (&self.value, self.children.is_empty()) {
            (_, false) => NodeKind::Branch,
            (Some(value), true) => NodeKind::Leaf(value),
            (None, true) => NodeKind::Empty,
        }
    }

    /// First direct child with the given key.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Self> {
        self.children.iter().find(|child| child.key == key)
    }

    /// Follows a dotted path of keys from this node.
    ///
    /// Each segment selects the first matching child. A [`VALUE_MARKER`]
    /// segment addresses the current node. An empty path returns `self`.
    #[must_use]
    pub fn fetch(&self, path: &str) -> Option<&Self> {
        path.split('.')
            .filter(|segment| !segment.is_empty() && *segment != VALUE_MARKER)
            .try_fold(self, |node, segment| node.find(segment))
    }

    /// Value of the node at `path`, if both exist.
    #[must_use]
    pub fn value_at(&self, path: &str) -> Option<&Scalar> {
        self.fetch(path).and_then(Self::value)
    }
}
