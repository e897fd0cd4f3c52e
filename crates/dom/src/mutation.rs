//! Mutation journal vocabulary.
//!
//! Every primitive write a [`DomArena`](crate::DomArena) applies is recorded
//! as one [`Mutation`], in order. Reads are never journaled.
//!
//! Invariants:
//! - Mutations are applied in order.
//! - References must point to live keys at the time they are used (except
//!   the `key` in create operations, which must be fresh).
//! - Keys are never `NodeKey::INVALID`.
//! - Names are canonical ASCII-lowercase.
//! - A journal replays onto any arena that started from the same root and
//!   has seen the same earlier mutations.

use crate::types::NodeKey;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mutation {
    CreateElement {
        key: NodeKey,
        name: Arc<str>,
    },
    CreateText {
        key: NodeKey,
        text: String,
    },
    AppendChild {
        parent: NodeKey,
        child: NodeKey,
    },
    /// `old` and its subtree are destroyed.
    ReplaceChild {
        parent: NodeKey,
        new: NodeKey,
        old: NodeKey,
    },
    /// `child` and its subtree are destroyed.
    RemoveChild {
        parent: NodeKey,
        child: NodeKey,
    },
    SetAttribute {
        key: NodeKey,
        name: Arc<str>,
        value: String,
    },
    RemoveAttribute {
        key: NodeKey,
        name: Arc<str>,
    },
    SetText {
        key: NodeKey,
        text: String,
    },
}

/// Per-kind tally of a journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationCounts {
    pub elements_created: usize,
    pub texts_created: usize,
    pub appended: usize,
    pub replaced: usize,
    pub removed: usize,
    pub attributes_set: usize,
    pub attributes_removed: usize,
    pub texts_set: usize,
}

impl MutationCounts {
    pub fn from_mutations(mutations: &[Mutation]) -> Self {
        let mut counts = Self::default();
        for mutation in mutations {
            match mutation {
                Mutation::CreateElement { .. } => counts.elements_created += 1,
                Mutation::CreateText { .. } => counts.texts_created += 1,
                Mutation::AppendChild { .. } => counts.appended += 1,
                Mutation::ReplaceChild { .. } => counts.replaced += 1,
                Mutation::RemoveChild { .. } => counts.removed += 1,
                Mutation::SetAttribute { .. } => counts.attributes_set += 1,
                Mutation::RemoveAttribute { .. } => counts.attributes_removed += 1,
                Mutation::SetText { .. } => counts.texts_set += 1,
            }
        }
        counts
    }

    pub fn created(&self) -> usize {
        self.elements_created + self.texts_created
    }

    /// Structural churn: nodes created, replaced or removed.
    pub fn structural(&self) -> usize {
        self.created() + self.replaced + self.removed
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_tally_each_kind() {
        let mutations = vec![
            Mutation::CreateElement {
                key: NodeKey(2),
                name: Arc::from("p"),
            },
            Mutation::CreateText {
                key: NodeKey(3),
                text: "hi".to_string(),
            },
            Mutation::AppendChild {
                parent: NodeKey(1),
                child: NodeKey(2),
            },
            Mutation::AppendChild {
                parent: NodeKey(2),
                child: NodeKey(3),
            },
            Mutation::SetAttribute {
                key: NodeKey(2),
                name: Arc::from("class"),
                value: "x".to_string(),
            },
        ];
        let counts = MutationCounts::from_mutations(&mutations);
        assert_eq!(counts.elements_created, 1);
        assert_eq!(counts.texts_created, 1);
        assert_eq!(counts.appended, 2);
        assert_eq!(counts.attributes_set, 1);
        assert_eq!(counts.created(), 2);
        assert_eq!(counts.structural(), 2);
        assert!(!counts.is_empty());
        assert!(MutationCounts::from_mutations(&[]).is_empty());
    }
}
