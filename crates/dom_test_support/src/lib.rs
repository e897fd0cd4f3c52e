use dom::DomArena;
use dom::snapshot::{DomSnapshot, DomSnapshotOptions};

pub mod scenario;

/// Snapshot lines of `arena`'s whole tree, root included.
pub fn snapshot_lines(arena: &DomArena) -> Vec<String> {
    let root = arena
        .materialize(arena.root())
        .unwrap_or_else(|err| panic!("failed to materialize arena root: {err}"));
    DomSnapshot::new(&root, DomSnapshotOptions::default()).into_lines()
}

/// Like [`snapshot_lines`] but with node keys shown.
pub fn keyed_snapshot_lines(arena: &DomArena) -> Vec<String> {
    let root = arena
        .materialize(arena.root())
        .unwrap_or_else(|err| panic!("failed to materialize arena root: {err}"));
    let options = DomSnapshotOptions {
        ignore_keys: false,
        ..DomSnapshotOptions::default()
    };
    DomSnapshot::new(&root, options).into_lines()
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let max = expected.len().max(actual.len());
    let mut out = String::new();
    use std::fmt::Write;
    let mut mismatch = None;
    let missing = "<missing>";
    for i in 0..max {
        let left = expected.get(i).map(String::as_str).unwrap_or(missing);
        let right = actual.get(i).map(String::as_str).unwrap_or(missing);
        if left != right {
            mismatch = Some(i);
            break;
        }
    }
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line_idx in start..end {
            let left = expected
                .get(line_idx)
                .map(String::as_str)
                .unwrap_or(missing);
            let right = actual.get(line_idx).map(String::as_str).unwrap_or(missing);
            let marker = if line_idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line_idx + 1);
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line_idx + 1);
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}
