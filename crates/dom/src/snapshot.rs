use crate::types::Node;
use std::fmt::{self, Write};
use std::sync::OnceLock;

/// Deterministic tree serialization and equality rules for tests and demos.
/// Not a stable format.
///
/// Equivalence rules:
/// - Node kinds must match.
/// - Element names must match.
/// - Attribute sets must match by name and value; order only matters when
///   `sort_attributes` is off.
/// - Text nodes must match exactly.
/// - Keys are compared only when `ignore_keys` is off.
#[derive(Clone, Copy, Debug)]
pub struct DomSnapshotOptions {
    pub ignore_keys: bool,
    pub sort_attributes: bool,
}

impl Default for DomSnapshotOptions {
    fn default() -> Self {
        Self {
            ignore_keys: true,
            sort_attributes: true,
        }
    }
}

#[derive(Debug)]
pub struct DomSnapshot {
    lines: Vec<String>,
}

impl DomSnapshot {
    pub fn new(root: &Node, options: DomSnapshotOptions) -> Self {
        let mut lines = Vec::new();
        walk_snapshot(root, &options, 0, &mut lines);
        Self { lines }
    }

    pub fn as_lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl fmt::Display for DomSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i != 0 {
                f.write_str("\n")?;
            }
            f.write_str(line)?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct DomMismatch<'a> {
    path: String,
    detail: String,
    expected: String,
    actual: String,
    expected_node: &'a Node,
    actual_node: &'a Node,
    options: DomSnapshotOptions,
    expected_subtree: OnceLock<String>,
    actual_subtree: OnceLock<String>,
}

impl DomMismatch<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for DomMismatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expected_subtree = self
            .expected_subtree
            .get_or_init(|| DomSnapshot::new(self.expected_node, self.options).render());
        let actual_subtree = self
            .actual_subtree
            .get_or_init(|| DomSnapshot::new(self.actual_node, self.options).render());
        writeln!(f, "DOM mismatch at {}: {}", self.path, self.detail)?;
        writeln!(f, "expected: {}", self.expected)?;
        writeln!(f, "actual:   {}", self.actual)?;
        writeln!(f, "expected subtree:\n{}", expected_subtree)?;
        writeln!(f, "actual subtree:\n{}", actual_subtree)?;
        Ok(())
    }
}

impl std::error::Error for DomMismatch<'_> {}

pub fn assert_dom_eq(expected: &Node, actual: &Node, options: DomSnapshotOptions) {
    if let Err(mismatch) = compare_dom(expected, actual, options) {
        panic!("{mismatch}");
    }
}

pub fn compare_dom<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: DomSnapshotOptions,
) -> Result<(), Box<DomMismatch<'a>>> {
    let mut path = vec![node_label(expected)];
    compare_nodes(expected, actual, &options, &mut path)
}

fn compare_nodes<'a>(
    expected: &'a Node,
    actual: &'a Node,
    options: &DomSnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<DomMismatch<'a>>> {
    if !options.ignore_keys && expected.key() != actual.key() {
        return Err(Box::new(mismatch(path, "key", expected, actual, options)));
    }
    match (expected, actual) {
        (
            Node::Element {
                name: expected_name,
                attributes: expected_attrs,
                children: expected_children,
                ..
            },
            Node::Element {
                name: actual_name,
                attributes: actual_attrs,
                children: actual_children,
                ..
            },
        ) => {
            if expected_name != actual_name {
                return Err(Box::new(mismatch(
                    path,
                    "element name",
                    expected,
                    actual,
                    options,
                )));
            }
            if expected_attrs.len() != actual_attrs.len() {
                return Err(Box::new(mismatch(
                    path,
                    "attribute count",
                    expected,
                    actual,
                    options,
                )));
            }
            let expected_attrs = ordered_attributes(expected_attrs, options);
            let actual_attrs = ordered_attributes(actual_attrs, options);
            for (i, (exp, act)) in expected_attrs.iter().zip(actual_attrs.iter()).enumerate() {
                if exp.0 != act.0 {
                    return Err(Box::new(mismatch(
                        path,
                        &format!("attribute name at index {i}"),
                        expected,
                        actual,
                        options,
                    )));
                }
                if exp.1 != act.1 {
                    return Err(Box::new(mismatch(
                        path,
                        &format!("attribute value of {}", exp.0),
                        expected,
                        actual,
                        options,
                    )));
                }
            }
            compare_children(
                expected,
                actual,
                expected_children,
                actual_children,
                options,
                path,
            )
        }
        (
            Node::Text {
                text: expected_text,
                ..
            },
            Node::Text {
                text: actual_text, ..
            },
        ) => {
            if expected_text != actual_text {
                return Err(Box::new(mismatch(path, "text", expected, actual, options)));
            }
            Ok(())
        }
        _ => Err(Box::new(mismatch(
            path,
            "node kind",
            expected,
            actual,
            options,
        ))),
    }
}

fn compare_children<'a>(
    expected_parent: &'a Node,
    actual_parent: &'a Node,
    expected: &'a [Node],
    actual: &'a [Node],
    options: &DomSnapshotOptions,
    path: &mut Vec<String>,
) -> Result<(), Box<DomMismatch<'a>>> {
    if expected.len() != actual.len() {
        return Err(Box::new(mismatch(
            path,
            &format!(
                "child count (expected {}, actual {})",
                expected.len(),
                actual.len()
            ),
            expected_parent,
            actual_parent,
            options,
        )));
    }
    for (idx, (exp, act)) in expected.iter().zip(actual.iter()).enumerate() {
        path.push(format!("{}[{}]", node_label(exp), idx));
        let result = compare_nodes(exp, act, options, path);
        path.pop();
        result?;
    }
    Ok(())
}

fn ordered_attributes<'a>(
    attributes: &'a [(std::sync::Arc<str>, String)],
    options: &DomSnapshotOptions,
) -> Vec<(&'a str, &'a str)> {
    let mut ordered: Vec<(&str, &str)> = attributes
        .iter()
        .map(|(k, v)| (k.as_ref(), v.as_str()))
        .collect();
    if options.sort_attributes {
        ordered.sort_by(|a, b| a.0.cmp(b.0));
    }
    ordered
}

fn mismatch<'a>(
    path: &[String],
    detail: &str,
    expected: &'a Node,
    actual: &'a Node,
    options: &DomSnapshotOptions,
) -> DomMismatch<'a> {
    let path = format!("/{}", path.join("/"));
    let expected_line = format_node_line(expected, options);
    let actual_line = format_node_line(actual, options);
    DomMismatch {
        path,
        detail: detail.to_string(),
        expected: truncate_line(expected_line, 160),
        actual: truncate_line(actual_line, 160),
        expected_node: expected,
        actual_node: actual,
        options: *options,
        expected_subtree: OnceLock::new(),
        actual_subtree: OnceLock::new(),
    }
}

fn node_label(node: &Node) -> String {
    match node {
        Node::Element { name, .. } => {
            let mut label = String::from(name.as_ref());
            if let Some(id_value) = node.attribute("id").filter(|value| !value.is_empty()) {
                label.push('#');
                write_escaped(&mut label, id_value);
            } else if let Some(class_value) =
                node.attribute("class").filter(|value| !value.is_empty())
            {
                label.push_str(".class=");
                write_escaped(&mut label, class_value);
            }
            label
        }
        Node::Text { .. } => "#text".to_string(),
    }
}

fn truncate_line(mut line: String, max_len: usize) -> String {
    if line.len() > max_len {
        let mut cut = max_len.saturating_sub(3);
        while !line.is_char_boundary(cut) {
            cut -= 1;
        }
        line.truncate(cut);
        line.push_str("...");
    }
    line
}

fn walk_snapshot(node: &Node, options: &DomSnapshotOptions, depth: usize, out: &mut Vec<String>) {
    const INDENT_STEP: usize = 2;
    let mut line = " ".repeat(depth.saturating_mul(INDENT_STEP));
    write_node_line(&mut line, node, options);
    out.push(line);
    for child in node.children() {
        walk_snapshot(child, options, depth + 1, out);
    }
}

fn format_node_line(node: &Node, options: &DomSnapshotOptions) -> String {
    let mut line = String::new();
    write_node_line(&mut line, node, options);
    line
}

fn write_node_line(out: &mut String, node: &Node, options: &DomSnapshotOptions) {
    match node {
        Node::Element {
            key,
            name,
            attributes,
            ..
        } => {
            out.push('<');
            out.push_str(name);
            for (attr, value) in ordered_attributes(attributes, options) {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                write_escaped(out, value);
                out.push('"');
            }
            if !options.ignore_keys {
                out.push_str(" data-node-key=\"");
                let _ = write!(out, "{}", key.0);
                out.push('"');
            }
            out.push('>');
        }
        Node::Text { key, text } => {
            out.push('"');
            write_escaped(out, text);
            out.push('"');
            if !options.ignore_keys {
                let _ = write!(out, " key={}", key.0);
            }
        }
    }
}

fn write_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ if ch.is_ascii() => out.push(ch),
            _ => {
                let _ = write!(out, "\\u{{{:X}}}", ch as u32);
            }
        }
    }
}
