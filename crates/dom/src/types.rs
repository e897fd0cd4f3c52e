use std::sync::Arc;

/// Opaque identity of a node inside a [`DomArena`](crate::DomArena).
///
/// Keys are allocated monotonically and never reused for the lifetime of an
/// arena, so a stale key keeps pointing at nothing rather than at a stranger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl NodeKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: NodeKey = NodeKey(0);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Element,
    Text,
}

/// Owned copy of a live subtree, produced by
/// [`DomArena::materialize`](crate::DomArena::materialize).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element {
        key: NodeKey,
        name: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
        children: Vec<Node>,
    },
    Text {
        key: NodeKey,
        text: String,
    },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Element { key, .. } => *key,
            Node::Text { key, .. } => *key,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Element { .. } => NodeType::Element,
            Node::Text { .. } => NodeType::Text,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            Node::Text { .. } => None,
        }
    }
}
