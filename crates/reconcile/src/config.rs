#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Traversal {
    /// Call-stack recursion; depth is bounded by the host thread's stack.
    #[default]
    Recursive,
    /// Explicit heap stack of pending containers, for arbitrarily deep trees.
    /// Converges to the same tree as `Recursive`; only the order of primitive
    /// calls differs.
    Worklist,
}

#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Read each attribute/text value before writing it and skip writes that
    /// would not change anything. The resulting tree is the same either way.
    pub skip_redundant_writes: bool,
    pub traversal: Traversal,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            skip_redundant_writes: true,
            traversal: Traversal::Recursive,
        }
    }
}
