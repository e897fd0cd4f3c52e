//! Data-driven render scenarios.
//!
//! A scenario file holds one or more `[[scenario]]` tables. Each scenario
//! renders its `steps` in order into one arena and checks the snapshot after
//! every step, plus the journal tally when `counts` is given:
//!
//! ```toml
//! [[scenario]]
//! id = "paragraph"
//!
//! [[scenario.steps]]
//! render = [{ tag = "p", children = ["hi"] }]
//! expect = ['<body>', '  <p>', '    "hi"']
//! counts = { created = 2 }
//! ```

use crate::{diff_lines, snapshot_lines};
use dom::{DomArena, MutationCounts};
use reconcile::{Descriptor, Reconciler, RenderConfig};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    #[default]
    Active,
    Xfail,
    Skip,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    scenario: Vec<Scenario>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub id: String,
    #[serde(default)]
    pub status: ScenarioStatus,
    pub reason: Option<String>,
    #[serde(default = "default_root")]
    pub root: String,
    pub steps: Vec<Step>,
    #[serde(skip)]
    pub source: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub render: Vec<Descriptor>,
    pub expect: Vec<String>,
    pub counts: Option<ExpectedCounts>,
}

/// Journal tally expected after a step. Omitted fields expect zero.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ExpectedCounts {
    pub created: usize,
    pub replaced: usize,
    pub removed: usize,
    pub attributes_set: usize,
    pub attributes_removed: usize,
    pub texts_set: usize,
}

impl From<MutationCounts> for ExpectedCounts {
    fn from(counts: MutationCounts) -> Self {
        Self {
            created: counts.created(),
            replaced: counts.replaced,
            removed: counts.removed,
            attributes_set: counts.attributes_set,
            attributes_removed: counts.attributes_removed,
            texts_set: counts.texts_set,
        }
    }
}

fn default_root() -> String {
    "body".to_string()
}

/// Loads every `*.toml` file in `dir`, in file name order.
pub fn load_scenarios(dir: &Path) -> Vec<Scenario> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("failed to read scenario dir {dir:?}: {err}"))
        .map(|entry| {
            entry
                .unwrap_or_else(|err| panic!("failed to read entry in {dir:?}: {err}"))
                .path()
        })
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "no scenario files in {dir:?}");

    let mut scenarios = Vec::new();
    let mut seen = HashSet::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read scenario file {path:?}: {err}"));
        for scenario in parse_scenarios(&content, &path) {
            if !seen.insert(scenario.id.clone()) {
                panic!("duplicate scenario id '{}' in {path:?}", scenario.id);
            }
            scenarios.push(scenario);
        }
    }
    scenarios
}

pub fn parse_scenarios(content: &str, source: &Path) -> Vec<Scenario> {
    let file: ScenarioFile = toml::from_str(content)
        .unwrap_or_else(|err| panic!("failed to parse scenario file {source:?}: {err}"));
    file.scenario
        .into_iter()
        .map(|mut scenario| {
            validate(&scenario, source);
            scenario.source = source.to_path_buf();
            scenario
        })
        .collect()
}

fn validate(scenario: &Scenario, source: &Path) {
    let id = &scenario.id;
    match scenario.status {
        ScenarioStatus::Active => {
            if scenario.reason.is_some() {
                panic!("scenario '{id}' has reason but is not xfail/skip in {source:?}");
            }
        }
        ScenarioStatus::Xfail | ScenarioStatus::Skip => {
            if scenario.reason.as_deref().unwrap_or("").is_empty() {
                panic!(
                    "scenario '{id}' with status '{:?}' missing reason in {source:?}",
                    scenario.status
                );
            }
        }
    }
    if scenario.steps.is_empty() {
        panic!("scenario '{id}' has no steps in {source:?}");
    }
}

/// Runs every step of `scenario` into a fresh arena.
///
/// Journal counts are only checked when redundant writes are skipped, since
/// they describe that policy.
pub fn run_scenario(scenario: &Scenario, config: &RenderConfig) -> Result<(), String> {
    let mut arena = DomArena::with_root(&scenario.root)
        .map_err(|err| format!("invalid root '{}': {err}", scenario.root))?;
    let root = arena.root();
    let reconciler = Reconciler::new(config.clone());
    for (index, step) in scenario.steps.iter().enumerate() {
        arena.take_mutations();
        reconciler
            .render(&mut arena, root, &step.render)
            .map_err(|err| format!("step {index}: render failed: {err}"))?;
        let actual = snapshot_lines(&arena);
        if actual != step.expect {
            return Err(format!(
                "step {index}: snapshot mismatch\n{}",
                diff_lines(&step.expect, &actual)
            ));
        }
        if let Some(expected) = step.counts {
            if reconciler.config().skip_redundant_writes {
                let actual = ExpectedCounts::from(MutationCounts::from_mutations(
                    arena.mutations(),
                ));
                if actual != expected {
                    return Err(format!(
                        "step {index}: journal counts mismatch\nexpected: {expected:?}\nactual:   {actual:?}"
                    ));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[scenario]]
id = "paragraph"

[[scenario.steps]]
render = [{ tag = "p", attrs = { class = "lead" }, children = ["hi", 42] }]
expect = ['<body>', '  <p class="lead">', '    "hi"', '    "42"']
counts = { created = 3, attributes_set = 1 }

[[scenario]]
id = "pending"
status = "skip"
reason = "kept as an example of a skipped case"
root = "main"

[[scenario.steps]]
render = []
expect = ['<main>']
"#;

    #[test]
    fn parses_steps_and_defaults() {
        let scenarios = parse_scenarios(SAMPLE, Path::new("sample.toml"));
        assert_eq!(scenarios.len(), 2);
        let first = &scenarios[0];
        assert_eq!(first.status, ScenarioStatus::Active);
        assert_eq!(first.root, "body");
        assert_eq!(first.steps[0].render.len(), 1);
        assert_eq!(
            first.steps[0].counts,
            Some(ExpectedCounts {
                created: 3,
                attributes_set: 1,
                ..ExpectedCounts::default()
            })
        );
        assert_eq!(scenarios[1].status, ScenarioStatus::Skip);
        assert_eq!(scenarios[1].root, "main");
        assert_eq!(scenarios[1].source, Path::new("sample.toml"));
    }

    #[test]
    fn runs_a_parsed_scenario() {
        let scenarios = parse_scenarios(SAMPLE, Path::new("sample.toml"));
        for scenario in &scenarios {
            run_scenario(scenario, &RenderConfig::default())
                .unwrap_or_else(|err| panic!("{}: {err}", scenario.id));
        }
    }

    #[test]
    fn reports_snapshot_mismatch() {
        let mut scenario = parse_scenarios(SAMPLE, Path::new("sample.toml")).remove(0);
        scenario.steps[0].expect[3] = "    \"43\"".to_string();
        let err = run_scenario(&scenario, &RenderConfig::default()).unwrap_err();
        assert!(err.starts_with("step 0: snapshot mismatch"), "{err}");
    }

    #[test]
    #[should_panic(expected = "missing reason")]
    fn xfail_without_reason_is_rejected() {
        let content = r#"
[[scenario]]
id = "x"
status = "xfail"

[[scenario.steps]]
render = []
expect = ['<body>']
"#;
        parse_scenarios(content, Path::new("bad.toml"));
    }
}
