use crate::config::{RenderConfig, Traversal};
use crate::descriptor::{Descriptor, ElementDescriptor};
use dom::{Document, NodeType};

/// Reconciles `container`'s children against `descriptors` with the default
/// [`RenderConfig`].
///
/// Afterwards `container` has exactly `descriptors.len()` children and child
/// `i` reflects `descriptors[i]`, recursively. Errors come only from the
/// document's primitives and are returned as-is; the tree is then left in
/// whatever partially reconciled state it had reached.
pub fn render<D: Document>(
    doc: &mut D,
    container: D::Node,
    descriptors: &[Descriptor],
) -> Result<(), D::Error> {
    Reconciler::default().render(doc, container, descriptors)
}

#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    config: RenderConfig,
}

#[derive(Debug, Default)]
struct RenderStats {
    created: usize,
    replaced: usize,
    reused: usize,
    pruned: usize,
    writes: usize,
}

impl Reconciler {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn render<D: Document>(
        &self,
        doc: &mut D,
        container: D::Node,
        descriptors: &[Descriptor],
    ) -> Result<(), D::Error> {
        let mut stats = RenderStats::default();
        match self.config.traversal {
            Traversal::Recursive => {
                self.render_recursive(doc, container, descriptors, &mut stats)?
            }
            Traversal::Worklist => self.render_worklist(doc, container, descriptors, &mut stats)?,
        }
        log::debug!(
            target: "descdom.render",
            "render {container:?}: created={} replaced={} reused={} pruned={} writes={}",
            stats.created,
            stats.replaced,
            stats.reused,
            stats.pruned,
            stats.writes
        );
        Ok(())
    }

    fn render_recursive<D: Document>(
        &self,
        doc: &mut D,
        container: D::Node,
        descriptors: &[Descriptor],
        stats: &mut RenderStats,
    ) -> Result<(), D::Error> {
        prune(doc, container, descriptors.len(), stats)?;
        for (index, descriptor) in descriptors.iter().enumerate() {
            let node = self.reconcile_position(doc, container, index, descriptor, stats)?;
            if let Descriptor::Element(element) = descriptor {
                self.render_recursive(doc, node, element.children(), stats)?;
            }
        }
        Ok(())
    }

    fn render_worklist<'a, D: Document>(
        &self,
        doc: &mut D,
        container: D::Node,
        descriptors: &'a [Descriptor],
        stats: &mut RenderStats,
    ) -> Result<(), D::Error> {
        let mut pending: Vec<(D::Node, &'a [Descriptor])> = vec![(container, descriptors)];
        while let Some((parent, descriptors)) = pending.pop() {
            prune(doc, parent, descriptors.len(), stats)?;
            let first_child = pending.len();
            for (index, descriptor) in descriptors.iter().enumerate() {
                let node = self.reconcile_position(doc, parent, index, descriptor, stats)?;
                if let Descriptor::Element(element) = descriptor {
                    pending.push((node, element.children()));
                }
            }
            // Pop siblings in document order.
            pending[first_child..].reverse();
        }
        Ok(())
    }

    /// Ensures a node of the right kind sits at `index`, then updates it.
    fn reconcile_position<D: Document>(
        &self,
        doc: &mut D,
        container: D::Node,
        index: usize,
        descriptor: &Descriptor,
        stats: &mut RenderStats,
    ) -> Result<D::Node, D::Error> {
        let node = match doc.child_at(container, index)? {
            None => {
                let node = materialize(doc, descriptor)?;
                doc.append_child(container, node)?;
                log::trace!(target: "descdom.render", "append {node:?} at {container:?}[{index}]");
                stats.created += 1;
                node
            }
            Some(existing) => {
                if kind_matches(doc, existing, descriptor)? {
                    stats.reused += 1;
                    existing
                } else {
                    let node = materialize(doc, descriptor)?;
                    doc.replace_child(container, node, existing)?;
                    log::trace!(
                        target: "descdom.render",
                        "replace {existing:?} with {node:?} at {container:?}[{index}]"
                    );
                    stats.replaced += 1;
                    node
                }
            }
        };
        self.update(doc, node, descriptor, stats)?;
        Ok(node)
    }

    fn update<D: Document>(
        &self,
        doc: &mut D,
        node: D::Node,
        descriptor: &Descriptor,
        stats: &mut RenderStats,
    ) -> Result<(), D::Error> {
        match descriptor {
            Descriptor::Text(value) => {
                if !self.config.skip_redundant_writes || doc.text(node)? != value.as_str() {
                    doc.set_text(node, value)?;
                    stats.writes += 1;
                }
            }
            Descriptor::Element(element) => self.update_attributes(doc, node, element, stats)?,
        }
        Ok(())
    }

    fn update_attributes<D: Document>(
        &self,
        doc: &mut D,
        node: D::Node,
        element: &ElementDescriptor,
        stats: &mut RenderStats,
    ) -> Result<(), D::Error> {
        for (name, value) in element.attrs() {
            if !self.config.skip_redundant_writes
                || doc.attribute(node, name)? != Some(value.as_str())
            {
                doc.set_attribute(node, name, value)?;
                stats.writes += 1;
            }
        }
        for name in doc.attribute_names(node)? {
            if !element.has_attr(&name) {
                doc.remove_attribute(node, &name)?;
                stats.writes += 1;
            }
        }
        Ok(())
    }
}

/// Removes children from the tail until at most `keep` remain.
fn prune<D: Document>(
    doc: &mut D,
    container: D::Node,
    keep: usize,
    stats: &mut RenderStats,
) -> Result<(), D::Error> {
    let mut count = doc.child_count(container)?;
    while count > keep {
        let Some(last) = doc.child_at(container, count - 1)? else {
            break;
        };
        doc.remove_child(container, last)?;
        log::trace!(target: "descdom.render", "prune {last:?} from {container:?}");
        stats.pruned += 1;
        count -= 1;
    }
    Ok(())
}

/// Builds a detached node for `descriptor`. Elements start empty; text starts
/// with its final value.
fn materialize<D: Document>(doc: &mut D, descriptor: &Descriptor) -> Result<D::Node, D::Error> {
    match descriptor {
        Descriptor::Element(element) => doc.create_element(element.tag()),
        Descriptor::Text(value) => doc.create_text(value),
    }
}

fn kind_matches<D: Document>(
    doc: &D,
    node: D::Node,
    descriptor: &Descriptor,
) -> Result<bool, D::Error> {
    Ok(match (doc.node_type(node)?, descriptor) {
        (NodeType::Element, Descriptor::Element(element)) => doc
            .tag_name(node)?
            .is_some_and(|tag| tag.eq_ignore_ascii_case(element.tag())),
        (NodeType::Text, Descriptor::Text(_)) => true,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::snapshot::{DomSnapshot, DomSnapshotOptions};
    use dom::{DomArena, Mutation, MutationCounts, NodeKey};

    fn lines(arena: &DomArena) -> Vec<String> {
        let root = arena.materialize(arena.root()).unwrap();
        DomSnapshot::new(&root, DomSnapshotOptions::default()).into_lines()
    }

    fn paragraph(text: &str) -> Descriptor {
        Descriptor::element("p").child(text).into()
    }

    #[test]
    fn renders_into_an_empty_container() {
        let mut arena = DomArena::new();
        let root = arena.root();
        render(&mut arena, root, &[paragraph("hi"), Descriptor::from(42)]).unwrap();
        assert_eq!(lines(&arena), ["<body>", "  <p>", "    \"hi\"", "  \"42\""]);
    }

    #[test]
    fn empty_descriptor_list_clears_the_container() {
        let mut arena = DomArena::new();
        let root = arena.root();
        render(&mut arena, root, &[paragraph("a"), paragraph("b")]).unwrap();
        render(&mut arena, root, &[]).unwrap();
        assert_eq!(arena.child_count(root).unwrap(), 0);
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn tag_comparison_ignores_case() {
        let mut arena = DomArena::new();
        let root = arena.root();
        render(&mut arena, root, &[Descriptor::element("DIV").into()]).unwrap();
        let div = arena.child_at(root, 0).unwrap().unwrap();
        arena.take_mutations();
        render(&mut arena, root, &[Descriptor::element("div").into()]).unwrap();
        assert_eq!(arena.child_at(root, 0).unwrap(), Some(div));
        assert!(arena.mutations().is_empty());
    }

    #[test]
    fn text_never_matches_an_element() {
        let mut arena = DomArena::new();
        let root = arena.root();
        render(&mut arena, root, &[Descriptor::from("p")]).unwrap();
        arena.take_mutations();
        render(&mut arena, root, &[Descriptor::element("p").into()]).unwrap();
        let counts = MutationCounts::from_mutations(&arena.take_mutations());
        assert_eq!(counts.replaced, 1);
        render(&mut arena, root, &[Descriptor::from("p")]).unwrap();
        let counts = MutationCounts::from_mutations(&arena.take_mutations());
        assert_eq!(counts.replaced, 1);
        assert_eq!(lines(&arena), ["<body>", "  \"p\""]);
    }

    #[test]
    fn new_text_nodes_are_not_written_twice() {
        let mut arena = DomArena::new();
        let root = arena.root();
        render(&mut arena, root, &[Descriptor::from("hello")]).unwrap();
        let text = arena.child_at(root, 0).unwrap().unwrap();
        assert_eq!(
            arena.take_mutations(),
            vec![
                Mutation::CreateText {
                    key: text,
                    text: "hello".to_string()
                },
                Mutation::AppendChild {
                    parent: root,
                    child: text
                },
            ]
        );
    }

    #[test]
    fn disabled_write_skipping_still_converges() {
        let mut arena = DomArena::new();
        let root = arena.root();
        let tree = [Descriptor::from(
            Descriptor::element("a").attr("href", "/next").child("next"),
        )];
        let reconciler = Reconciler::new(RenderConfig {
            skip_redundant_writes: false,
            ..RenderConfig::default()
        });
        reconciler.render(&mut arena, root, &tree).unwrap();
        arena.take_mutations();
        reconciler.render(&mut arena, root, &tree).unwrap();
        let counts = MutationCounts::from_mutations(&arena.take_mutations());
        assert_eq!(counts.structural(), 0);
        assert_eq!(counts.attributes_set, 1);
        assert_eq!(counts.texts_set, 1);
        assert_eq!(lines(&arena), ["<body>", "  <a href=\"/next\">", "    \"next\""]);
    }

    #[test]
    fn worklist_matches_recursive_result() {
        let tree = [
            Descriptor::from(
                Descriptor::element("ul").with_children(
                    (0..3).map(|i| Descriptor::element("li").child(i).attr("data-i", i)),
                ),
            ),
            paragraph("after"),
        ];
        let mut recursive = DomArena::new();
        let mut worklist = DomArena::new();
        let (r_root, w_root) = (recursive.root(), worklist.root());
        render(&mut recursive, r_root, &tree).unwrap();
        Reconciler::new(RenderConfig {
            traversal: Traversal::Worklist,
            ..RenderConfig::default()
        })
        .render(&mut worklist, w_root, &tree)
        .unwrap();
        assert_eq!(lines(&recursive), lines(&worklist));
    }

    #[test]
    fn primitive_errors_propagate_and_leave_partial_state() {
        let mut arena = DomArena::new();
        let root = arena.root();
        let tree = [paragraph("kept"), Descriptor::element("not valid").into()];
        let err = render(&mut arena, root, &tree).unwrap_err();
        assert_eq!(err, dom::DomError::InvalidName("not valid".to_string()));
        assert_eq!(lines(&arena), ["<body>", "  <p>", "    \"kept\""]);
    }

    #[test]
    fn unknown_container_is_an_error() {
        let mut arena = DomArena::new();
        let err = render(&mut arena, NodeKey(99), &[paragraph("x")]).unwrap_err();
        assert_eq!(err, dom::DomError::MissingKey(NodeKey(99)));
    }
}
