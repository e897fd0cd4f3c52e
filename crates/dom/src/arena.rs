use crate::document::Document;
use crate::error::DomError;
use crate::mutation::Mutation;
use crate::types::{Node, NodeKey, NodeType};
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_ROOT_NAME: &str = "body";

/// In-memory live tree with a single root container element.
///
/// Dropping a subtree frees its record slots for reuse; keys are never
/// reused, `next_key` is their high-water mark. Every applied mutation is
/// appended to the journal unless journaling has been switched off, so
/// long-lived arenas should drain it with [`DomArena::take_mutations`].
#[derive(Debug)]
pub struct DomArena {
    nodes: Vec<Option<NodeRecord>>,
    free: Vec<usize>,
    live: HashMap<NodeKey, usize>,
    next_key: u32,
    root: NodeKey,
    journal: Vec<Mutation>,
    journaling: bool,
}

impl DomArena {
    pub fn new() -> Self {
        Self::with_root_name(Arc::from(DEFAULT_ROOT_NAME))
    }

    /// Creates an arena whose root container is an element named `name`.
    pub fn with_root(name: &str) -> Result<Self, DomError> {
        let name = canonical_name(name)?;
        Ok(Self::with_root_name(name))
    }

    fn with_root_name(name: Arc<str>) -> Self {
        let mut arena = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            live: HashMap::new(),
            next_key: 2,
            root: NodeKey(1),
            journal: Vec::new(),
            journaling: true,
        };
        // The root exists before any journal entry; replay targets must be
        // built the same way.
        arena.insert_record(
            arena.root,
            NodeData::Element {
                name,
                attributes: Vec::new(),
            },
        );
        arena
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.live.contains_key(&key)
    }

    /// Number of live nodes, root included.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of record slots held, free ones included.
    pub fn slot_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent(&self, key: NodeKey) -> Result<Option<NodeKey>, DomError> {
        Ok(self.record(key)?.parent)
    }

    pub fn set_journaling(&mut self, enabled: bool) {
        self.journaling = enabled;
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.journal
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.journal)
    }

    /// Applies a journal recorded by another arena built from the same root.
    ///
    /// Create operations keep their recorded keys, so the resulting tree is
    /// identical including identities. Stops at the first failing mutation.
    pub fn apply(&mut self, mutations: &[Mutation]) -> Result<(), DomError> {
        for mutation in mutations {
            log::trace!(target: "dom.arena", "replay {mutation:?}");
            self.apply_one(mutation)?;
        }
        Ok(())
    }

    fn apply_one(&mut self, mutation: &Mutation) -> Result<(), DomError> {
        match mutation {
            Mutation::CreateElement { key, name } => {
                let name = canonical_name(name)?;
                self.insert_node(
                    *key,
                    NodeData::Element {
                        name: Arc::clone(&name),
                        attributes: Vec::new(),
                    },
                )?;
                self.record_mutation(Mutation::CreateElement { key: *key, name });
            }
            Mutation::CreateText { key, text } => {
                self.insert_node(*key, NodeData::Text { text: text.clone() })?;
                self.record_mutation(Mutation::CreateText {
                    key: *key,
                    text: text.clone(),
                });
            }
            Mutation::AppendChild { parent, child } => self.append_child(*parent, *child)?,
            Mutation::ReplaceChild { parent, new, old } => self.replace_child(*parent, *new, *old)?,
            Mutation::RemoveChild { parent, child } => self.remove_child(*parent, *child)?,
            Mutation::SetAttribute { key, name, value } => self.set_attribute(*key, name, value)?,
            Mutation::RemoveAttribute { key, name } => self.remove_attribute(*key, name)?,
            Mutation::SetText { key, text } => self.set_text(*key, text)?,
        }
        Ok(())
    }

    /// Copies the live subtree under `key` into an owned [`Node`].
    pub fn materialize(&self, key: NodeKey) -> Result<Node, DomError> {
        let record = self.record(key)?;
        let node = match &record.data {
            NodeData::Element { name, attributes } => Node::Element {
                key,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children: record
                    .children
                    .iter()
                    .map(|child| self.materialize(*child))
                    .collect::<Result<Vec<_>, _>>()?,
            },
            NodeData::Text { text } => Node::Text {
                key,
                text: text.clone(),
            },
        };
        Ok(node)
    }

    fn allocate_key(&mut self) -> Result<NodeKey, DomError> {
        let key = NodeKey(self.next_key);
        self.next_key = self
            .next_key
            .checked_add(1)
            .ok_or(DomError::InvalidKey(key))?;
        Ok(key)
    }

    fn insert_record(&mut self, key: NodeKey, data: NodeData) {
        debug_assert!(!self.live.contains_key(&key), "node key allocated twice");
        let record = Some(NodeRecord {
            data,
            parent: None,
            children: Vec::new(),
        });
        let index = match self.free.pop() {
            Some(index) => {
                self.nodes[index] = record;
                index
            }
            None => {
                self.nodes.push(record);
                self.nodes.len() - 1
            }
        };
        self.live.insert(key, index);
    }

    fn insert_node(&mut self, key: NodeKey, data: NodeData) -> Result<(), DomError> {
        ensure_key(key)?;
        // Keys below the high-water mark have been handed out already.
        if key.0 < self.next_key {
            return Err(DomError::DuplicateKey(key));
        }
        let next_key = key.0.checked_add(1).ok_or(DomError::InvalidKey(key))?;
        self.insert_record(key, data);
        self.next_key = next_key;
        Ok(())
    }

    fn record_mutation(&mut self, mutation: Mutation) {
        if self.journaling {
            self.journal.push(mutation);
        }
    }

    fn index(&self, key: NodeKey) -> Result<usize, DomError> {
        ensure_key(key)?;
        self.live
            .get(&key)
            .copied()
            .ok_or(DomError::MissingKey(key))
    }

    fn record(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        self.nodes[self.index(key)?]
            .as_ref()
            .ok_or(DomError::MissingKey(key))
    }

    fn record_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        let index = self.index(key)?;
        self.nodes[index].as_mut().ok_or(DomError::MissingKey(key))
    }

    /// Validates that detached `child` may be linked under `parent`.
    fn check_link(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if !self.record(parent)?.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if self.record(child)?.parent.is_some() {
            return Err(DomError::InvalidParent(child));
        }
        if self.is_ancestor_or_self(child, parent)? {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    fn is_ancestor_or_self(&self, candidate: NodeKey, node: NodeKey) -> Result<bool, DomError> {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == candidate {
                return Ok(true);
            }
            current = self.record(key)?.parent;
        }
        Ok(false)
    }

    fn position_in_parent(&self, parent: NodeKey, child: NodeKey) -> Result<usize, DomError> {
        if self.record(child)?.parent != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        let position = self.record(parent)?.children.iter().position(|k| *k == child);
        if position.is_none() {
            debug_assert!(false, "parent link without matching child entry");
        }
        position.ok_or(DomError::NotAChild { parent, child })
    }

    /// Frees a detached subtree's records and unlinks its keys.
    fn drop_subtree(&mut self, key: NodeKey) {
        let mut pending = vec![key];
        while let Some(current) = pending.pop() {
            let Some(index) = self.live.remove(&current) else {
                continue;
            };
            if let Some(record) = self.nodes[index].take() {
                pending.extend(record.children);
            }
            self.free.push(index);
        }
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for DomArena {
    type Node = NodeKey;
    type Error = DomError;

    fn child_count(&self, parent: NodeKey) -> Result<usize, DomError> {
        Ok(self.record(parent)?.children.len())
    }

    fn child_at(&self, parent: NodeKey, index: usize) -> Result<Option<NodeKey>, DomError> {
        Ok(self.record(parent)?.children.get(index).copied())
    }

    fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.check_link(parent, child)?;
        self.record_mut(parent)?.children.push(child);
        self.record_mut(child)?.parent = Some(parent);
        self.record_mutation(Mutation::AppendChild { parent, child });
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        let position = self.position_in_parent(parent, child)?;
        self.record_mut(parent)?.children.remove(position);
        self.drop_subtree(child);
        self.record_mutation(Mutation::RemoveChild { parent, child });
        Ok(())
    }

    fn replace_child(
        &mut self,
        parent: NodeKey,
        new_child: NodeKey,
        old_child: NodeKey,
    ) -> Result<(), DomError> {
        let position = self.position_in_parent(parent, old_child)?;
        self.check_link(parent, new_child)?;
        self.record_mut(parent)?.children[position] = new_child;
        self.record_mut(new_child)?.parent = Some(parent);
        self.drop_subtree(old_child);
        self.record_mutation(Mutation::ReplaceChild {
            parent,
            new: new_child,
            old: old_child,
        });
        Ok(())
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeKey, DomError> {
        let name = canonical_name(tag)?;
        let key = self.allocate_key()?;
        self.insert_record(
            key,
            NodeData::Element {
                name: Arc::clone(&name),
                attributes: Vec::new(),
            },
        );
        self.record_mutation(Mutation::CreateElement { key, name });
        Ok(key)
    }

    fn create_text(&mut self, text: &str) -> Result<NodeKey, DomError> {
        let key = self.allocate_key()?;
        self.insert_record(
            key,
            NodeData::Text {
                text: text.to_string(),
            },
        );
        self.record_mutation(Mutation::CreateText {
            key,
            text: text.to_string(),
        });
        Ok(key)
    }

    fn node_type(&self, node: NodeKey) -> Result<NodeType, DomError> {
        Ok(match self.record(node)?.data {
            NodeData::Element { .. } => NodeType::Element,
            NodeData::Text { .. } => NodeType::Text,
        })
    }

    fn tag_name(&self, node: NodeKey) -> Result<Option<&str>, DomError> {
        Ok(match &self.record(node)?.data {
            NodeData::Element { name, .. } => Some(name.as_ref()),
            NodeData::Text { .. } => None,
        })
    }

    fn text(&self, node: NodeKey) -> Result<&str, DomError> {
        match &self.record(node)?.data {
            NodeData::Text { text } => Ok(text.as_str()),
            NodeData::Element { .. } => Err(DomError::WrongNodeKind(node)),
        }
    }

    fn set_text(&mut self, node: NodeKey, text: &str) -> Result<(), DomError> {
        match &mut self.record_mut(node)?.data {
            NodeData::Text { text: existing } => {
                existing.clear();
                existing.push_str(text);
            }
            NodeData::Element { .. } => return Err(DomError::WrongNodeKind(node)),
        }
        self.record_mutation(Mutation::SetText {
            key: node,
            text: text.to_string(),
        });
        Ok(())
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Result<Option<&str>, DomError> {
        match &self.record(node)?.data {
            NodeData::Element { attributes, .. } => Ok(attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())),
            NodeData::Text { .. } => Err(DomError::WrongNodeKind(node)),
        }
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        let name = canonical_name(name)?;
        match &mut self.record_mut(node)?.data {
            NodeData::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| *k == name) {
                    Some((_, existing)) => {
                        existing.clear();
                        existing.push_str(value);
                    }
                    None => attributes.push((Arc::clone(&name), value.to_string())),
                }
            }
            NodeData::Text { .. } => return Err(DomError::WrongNodeKind(node)),
        }
        self.record_mutation(Mutation::SetAttribute {
            key: node,
            name,
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeKey, name: &str) -> Result<(), DomError> {
        let removed = match &mut self.record_mut(node)?.data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .position(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|position| attributes.remove(position).0),
            NodeData::Text { .. } => return Err(DomError::WrongNodeKind(node)),
        };
        if let Some(name) = removed {
            self.record_mutation(Mutation::RemoveAttribute { key: node, name });
        }
        Ok(())
    }

    fn attribute_names(&self, node: NodeKey) -> Result<Vec<Arc<str>>, DomError> {
        match &self.record(node)?.data {
            NodeData::Element { attributes, .. } => {
                Ok(attributes.iter().map(|(k, _)| Arc::clone(k)).collect())
            }
            NodeData::Text { .. } => Err(DomError::WrongNodeKind(node)),
        }
    }
}

fn ensure_key(key: NodeKey) -> Result<(), DomError> {
    if key == NodeKey::INVALID {
        return Err(DomError::InvalidKey(key));
    }
    Ok(())
}

/// Lowercases a tag or attribute name, rejecting names no markup could spell.
fn canonical_name(name: &str) -> Result<Arc<str>, DomError> {
    let invalid = name.is_empty()
        || name.chars().any(|ch| {
            ch.is_whitespace()
                || ch.is_control()
                || matches!(ch, '/' | '<' | '>' | '=' | '"' | '\'')
        });
    if invalid {
        return Err(DomError::InvalidName(name.to_string()));
    }
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Ok(Arc::from(name.to_ascii_lowercase()))
    } else {
        Ok(Arc::from(name))
    }
}

#[derive(Debug)]
struct NodeRecord {
    data: NodeData,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.data, NodeData::Element { .. })
    }
}

#[derive(Debug)]
enum NodeData {
    Element {
        name: Arc<str>,
        attributes: Vec<(Arc<str>, String)>,
    },
    Text {
        text: String,
    },
}
