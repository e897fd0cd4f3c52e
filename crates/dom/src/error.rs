use crate::types::NodeKey;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    /// `NodeKey::INVALID` was used where a real key is required.
    InvalidKey(NodeKey),
    /// The key was never allocated or its node has been dropped.
    MissingKey(NodeKey),
    /// A replayed create reused a key that was already allocated.
    DuplicateKey(NodeKey),
    WrongNodeKind(NodeKey),
    /// The parent cannot hold children, or the child is already attached.
    InvalidParent(NodeKey),
    NotAChild { parent: NodeKey, child: NodeKey },
    CycleDetected { parent: NodeKey, child: NodeKey },
    InvalidName(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::InvalidKey(key) => write!(f, "invalid node key {}", key.0),
            DomError::MissingKey(key) => write!(f, "no live node with key {}", key.0),
            DomError::DuplicateKey(key) => write!(f, "node key {} is already allocated", key.0),
            DomError::WrongNodeKind(key) => {
                write!(f, "node {} has the wrong kind for this operation", key.0)
            }
            DomError::InvalidParent(key) => {
                write!(f, "node {} cannot take part in this parent/child link", key.0)
            }
            DomError::NotAChild { parent, child } => {
                write!(f, "node {} is not a child of node {}", child.0, parent.0)
            }
            DomError::CycleDetected { parent, child } => write!(
                f,
                "attaching node {} under node {} would create a cycle",
                child.0, parent.0
            ),
            DomError::InvalidName(name) => write!(f, "invalid element or attribute name {name:?}"),
        }
    }
}

impl std::error::Error for DomError {}
