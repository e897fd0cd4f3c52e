#![no_main]

use dom::snapshot::{DomSnapshot, DomSnapshotOptions, compare_dom};
use dom::DomArena;
use libfuzzer_sys::fuzz_target;
use reconcile::{Descriptor, Reconciler, RenderConfig, Traversal};

const TAGS: &[&str] = &["div", "DIV", "p", "span", "ul", "li", "button"];
const ATTRS: &[&str] = &["class", "id", "Class", "data-x", "type"];
const MAX_DEPTH: usize = 8;
const MAX_CHILDREN: usize = 6;

/// Byte cursor that yields zero once the input runs out.
struct Bytes<'a> {
    data: &'a [u8],
}

impl Bytes<'_> {
    fn next(&mut self) -> u8 {
        match self.data.split_first() {
            Some((first, rest)) => {
                self.data = rest;
                *first
            }
            None => 0,
        }
    }

    fn pick<'s>(&mut self, choices: &[&'s str]) -> &'s str {
        choices[usize::from(self.next()) % choices.len()]
    }
}

fn decode_list(bytes: &mut Bytes<'_>, depth: usize) -> Vec<Descriptor> {
    let count = usize::from(bytes.next()) % (MAX_CHILDREN + 1);
    (0..count).map(|_| decode(bytes, depth)).collect()
}

fn decode(bytes: &mut Bytes<'_>, depth: usize) -> Descriptor {
    let op = bytes.next();
    if depth >= MAX_DEPTH || op % 3 == 0 {
        return match op % 4 {
            0 => Descriptor::text(bytes.pick(TAGS)),
            1 => Descriptor::from(i32::from(bytes.next()) - 128),
            2 => Descriptor::from(f64::from(bytes.next()) / 8.0),
            _ => Descriptor::from(bytes.next() % 2 == 0),
        };
    }
    let mut element = Descriptor::element(bytes.pick(TAGS));
    for _ in 0..usize::from(bytes.next() % 3) {
        let name = bytes.pick(ATTRS);
        element.set_attr(name, bytes.next() % 4);
    }
    element
        .with_children(decode_list(bytes, depth + 1))
        .into()
}

fn lines(arena: &DomArena) -> Vec<String> {
    let root = arena.materialize(arena.root()).expect("materialize root");
    DomSnapshot::new(&root, DomSnapshotOptions::default()).into_lines()
}

fuzz_target!(|data: &[u8]| {
    let mut bytes = Bytes { data };
    let first = decode_list(&mut bytes, 0);
    let second = decode_list(&mut bytes, 0);
    let traversal = if bytes.next() % 2 == 0 {
        Traversal::Recursive
    } else {
        Traversal::Worklist
    };
    let reconciler = Reconciler::new(RenderConfig {
        traversal,
        ..RenderConfig::default()
    });

    let mut arena = DomArena::new();
    let root = arena.root();
    reconciler.render(&mut arena, root, &first).expect("first render");
    reconciler.render(&mut arena, root, &second).expect("second render");

    let mut fresh = DomArena::new();
    let fresh_root = fresh.root();
    reconciler.render(&mut fresh, fresh_root, &second).expect("fresh render");
    assert_eq!(lines(&arena), lines(&fresh));

    arena.take_mutations();
    reconciler.render(&mut arena, root, &second).expect("idempotent render");
    assert!(arena.mutations().is_empty());

    let mut replica = DomArena::new();
    replica.apply(&fresh.take_mutations()).expect("replay");
    let expected = fresh.materialize(fresh_root).expect("materialize fresh");
    let actual = replica.materialize(replica.root()).expect("materialize replica");
    let keyed = DomSnapshotOptions {
        ignore_keys: false,
        ..DomSnapshotOptions::default()
    };
    if let Err(mismatch) = compare_dom(&expected, &actual, keyed) {
        panic!("replay diverged: {mismatch}");
    }
});
