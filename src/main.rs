use dom::snapshot::{DomSnapshot, DomSnapshotOptions};
use dom::{Document, DomArena, MutationCounts, NodeKey};
use mimalloc::MiMalloc;
use reconcile::{Descriptor, render};
use std::env;
use std::error::Error;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const DEFAULT_CLICKS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Screen {
    StepOne,
    StepTwo,
}

impl Screen {
    fn action(self) -> &'static str {
        match self {
            Screen::StepOne => "step-one",
            Screen::StepTwo => "step-two",
        }
    }

    fn from_action(action: &str) -> Option<Self> {
        [Screen::StepOne, Screen::StepTwo]
            .into_iter()
            .find(|screen| screen.action() == action)
    }

    fn descriptors(self) -> Vec<Descriptor> {
        let (step, label, next) = match self {
            Screen::StepOne => ("first step", "render the next step", Screen::StepTwo),
            Screen::StepTwo => ("second step", "render the previous step", Screen::StepOne),
        };
        let mut tree = vec![
            Descriptor::element("h1").child("descdom test").into(),
            Descriptor::element("h2").child(step).into(),
            Descriptor::element("button")
                .attr("type", "button")
                .attr("data-action", next.action())
                .child(label)
                .into(),
        ];
        if self == Screen::StepTwo {
            tree.push(Descriptor::element("p").child("yay! we did it!").into());
        }
        tree
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .map_err(|err| format!("failed to install log subscriber: {err}"))?;

    let clicks = match env::args().nth(1) {
        Some(arg) => arg
            .parse::<usize>()
            .map_err(|err| format!("invalid click count '{arg}': {err}"))?,
        None => DEFAULT_CLICKS,
    };

    let mut arena = DomArena::new();
    let root = arena.root();
    show(&mut arena, root, Screen::StepOne, 0)?;

    for click in 1..=clicks {
        let button = find_button(&arena, root)?.ok_or("no button on screen")?;
        let action = arena
            .attribute(button, "data-action")?
            .ok_or("button has no data-action")?;
        let next = Screen::from_action(action)
            .ok_or_else(|| format!("unknown data-action '{action}'"))?;
        log::info!(target: "descdom.demo", "click {click}: {button:?} -> {next:?}");
        show(&mut arena, root, next, click)?;
    }
    Ok(())
}

fn show(
    arena: &mut DomArena,
    root: NodeKey,
    screen: Screen,
    step: usize,
) -> Result<(), Box<dyn Error>> {
    render(arena, root, &screen.descriptors())?;
    let counts = MutationCounts::from_mutations(&arena.take_mutations());
    log::info!(
        target: "descdom.demo",
        "step {step} ({screen:?}): created={} replaced={} removed={} attrs={}/{} texts={}",
        counts.created(),
        counts.replaced,
        counts.removed,
        counts.attributes_set,
        counts.attributes_removed,
        counts.texts_set
    );
    let tree = arena.materialize(root)?;
    println!("-- step {step} --");
    println!("{}", DomSnapshot::new(&tree, DomSnapshotOptions::default()));
    Ok(())
}

fn find_button(arena: &DomArena, root: NodeKey) -> Result<Option<NodeKey>, Box<dyn Error>> {
    for index in 0..arena.child_count(root)? {
        let Some(child) = arena.child_at(root, index)? else {
            break;
        };
        if arena.tag_name(child)? == Some("button") {
            return Ok(Some(child));
        }
    }
    Ok(None)
}
