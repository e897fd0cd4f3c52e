use crate::types::NodeType;
use std::fmt;
use std::sync::Arc;

/// Primitive operations on a live presentation tree.
///
/// Implementors own the tree; callers only ever hold `Node` handles. Every
/// operation may fail, and failures are reported through the associated
/// `Error` without any recovery: a caller that stops halfway leaves the tree
/// in whatever intermediate state it reached.
///
/// Element tags compare case-insensitively. Text nodes have no tag, no
/// attributes and no children.
pub trait Document {
    type Node: Copy + Eq + fmt::Debug;
    type Error;

    fn child_count(&self, parent: Self::Node) -> Result<usize, Self::Error>;

    /// Returns `None` when `index` is past the last child.
    fn child_at(&self, parent: Self::Node, index: usize)
    -> Result<Option<Self::Node>, Self::Error>;

    /// `child` must be detached.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error>;

    /// Detaches `child` from `parent` and destroys its subtree.
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error>;

    /// Puts the detached `new_child` at `old_child`'s position and destroys
    /// `old_child` together with its subtree.
    fn replace_child(
        &mut self,
        parent: Self::Node,
        new_child: Self::Node,
        old_child: Self::Node,
    ) -> Result<(), Self::Error>;

    /// Creates a detached, empty element.
    fn create_element(&mut self, tag: &str) -> Result<Self::Node, Self::Error>;

    /// Creates a detached text node.
    fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    fn node_type(&self, node: Self::Node) -> Result<NodeType, Self::Error>;

    /// `None` for text nodes.
    fn tag_name(&self, node: Self::Node) -> Result<Option<&str>, Self::Error>;

    fn text(&self, node: Self::Node) -> Result<&str, Self::Error>;

    fn set_text(&mut self, node: Self::Node, text: &str) -> Result<(), Self::Error>;

    fn attribute(&self, node: Self::Node, name: &str) -> Result<Option<&str>, Self::Error>;

    fn set_attribute(
        &mut self,
        node: Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// Removing an attribute that is not set is a no-op.
    fn remove_attribute(&mut self, node: Self::Node, name: &str) -> Result<(), Self::Error>;

    fn attribute_names(&self, node: Self::Node) -> Result<Vec<Arc<str>>, Self::Error>;
}
