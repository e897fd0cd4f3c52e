use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use dom::{Document, DomArena};
use reconcile::{Descriptor, Reconciler, RenderConfig, Traversal, render};

const WIDE_ROWS: usize = 2_000;
const DEEP_LEVELS: usize = 500;

/// `rows` list items, each `<li class=row data-i=N><span>label N</span>N</li>`.
fn make_wide(rows: usize, label: &str) -> Vec<Descriptor> {
    vec![
        Descriptor::element("ul")
            .attr("class", "rows")
            .with_children((0..rows).map(|i| {
                Descriptor::element("li")
                    .attr("class", "row")
                    .attr("data-i", i)
                    .child(Descriptor::element("span").child(format!("{label} {i}")))
                    .child(i)
            }))
            .into(),
    ]
}

fn make_deep(levels: usize) -> Vec<Descriptor> {
    let mut node = Descriptor::element("div").child("bottom");
    for depth in 1..levels {
        node = Descriptor::element("div").attr("data-depth", depth).child(node);
    }
    vec![node.into()]
}

fn rendered(tree: &[Descriptor]) -> DomArena {
    let mut arena = DomArena::new();
    arena.set_journaling(false);
    let root = arena.root();
    render(&mut arena, root, tree).expect("initial render");
    arena
}

fn bench_initial_render_wide(c: &mut Criterion) {
    let tree = make_wide(WIDE_ROWS, "row");
    c.bench_function("bench_initial_render_wide", |b| {
        b.iter_batched(
            || {
                let mut arena = DomArena::new();
                arena.set_journaling(false);
                arena
            },
            |mut arena| {
                let root = arena.root();
                render(&mut arena, root, black_box(&tree)).expect("render");
                black_box(arena.child_count(root).ok());
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_idempotent_rerender_wide(c: &mut Criterion) {
    let tree = make_wide(WIDE_ROWS, "row");
    let mut arena = rendered(&tree);
    let root = arena.root();
    c.bench_function("bench_idempotent_rerender_wide", |b| {
        b.iter(|| {
            render(&mut arena, root, black_box(&tree)).expect("render");
        });
    });
}

fn bench_screen_swap_wide(c: &mut Criterion) {
    let first = make_wide(WIDE_ROWS, "first");
    let second = make_wide(WIDE_ROWS / 2, "second");
    let mut arena = rendered(&first);
    let root = arena.root();
    let mut flip = false;
    c.bench_function("bench_screen_swap_wide", |b| {
        b.iter(|| {
            flip = !flip;
            let tree = if flip { &second } else { &first };
            render(&mut arena, root, black_box(tree)).expect("render");
        });
    });
}

fn bench_deep_traversals(c: &mut Criterion) {
    let tree = make_deep(DEEP_LEVELS);
    for (name, traversal) in [
        ("bench_deep_rerender_recursive", Traversal::Recursive),
        ("bench_deep_rerender_worklist", Traversal::Worklist),
    ] {
        let reconciler = Reconciler::new(RenderConfig {
            traversal,
            ..RenderConfig::default()
        });
        let mut arena = rendered(&tree);
        let root = arena.root();
        c.bench_function(name, |b| {
            b.iter(|| {
                reconciler
                    .render(&mut arena, root, black_box(&tree))
                    .expect("render");
            });
        });
    }
}

criterion_group!(
    benches,
    bench_initial_render_wide,
    bench_idempotent_rerender_wide,
    bench_screen_swap_wide,
    bench_deep_traversals
);
criterion_main!(benches);
