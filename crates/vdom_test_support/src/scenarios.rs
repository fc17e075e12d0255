//! Reconciliation scenario manifests.
//!
//! Scenarios are kept in a TOML manifest and a JSON mirror under
//! `fixtures/`. Both are loaded and must agree case for case.

use crate::builders::{keyed_rows, plain_rows};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use vdom::{ReconcileStats, VChild};

pub const SCENARIOS_FORMAT_V1: &str = "grove-scenarios-v1";

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioMode {
    Keyed,
    NonKeyed,
}

/// Expected counters after the scenario's second pass. Absent fields are not
/// checked.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    pub mounts: Option<u64>,
    pub removals: Option<u64>,
    pub moves: Option<u64>,
    pub map_pass: Option<bool>,
    pub bulk_clear: Option<bool>,
}

impl Expectation {
    pub fn check(&self, stats: &ReconcileStats) -> Result<(), String> {
        let mut failures = Vec::new();
        let mut expect = |what: &str, expected: Option<u64>, actual: u64| {
            if let Some(expected) = expected
                && expected != actual
            {
                failures.push(format!("{what}: expected {expected}, got {actual}"));
            }
        };
        expect("mounts", self.mounts, stats.mounts);
        expect("removals", self.removals, stats.removals);
        expect("moves", self.moves, stats.moves);
        expect(
            "map passes",
            self.map_pass.map(u64::from),
            stats.keyed_map_passes.min(1),
        );
        expect(
            "bulk clears",
            self.bulk_clear.map(u64::from),
            stats.bulk_clears.min(1),
        );
        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    pub mode: ScenarioMode,
    pub prev: Vec<String>,
    pub next: Vec<String>,
    #[serde(default)]
    pub expect: Expectation,
}

impl Scenario {
    pub fn prev_children(&self) -> Vec<VChild> {
        self.children(&self.prev)
    }

    pub fn next_children(&self) -> Vec<VChild> {
        self.children(&self.next)
    }

    fn children(&self, labels: &[String]) -> Vec<VChild> {
        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        match self.mode {
            ScenarioMode::Keyed => keyed_rows(&labels),
            ScenarioMode::NonKeyed => plain_rows(&labels),
        }
    }

    /// Text content the parent must end up with.
    pub fn expected_text(&self) -> String {
        self.next.concat()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
struct ScenarioManifest {
    format: String,
    scenarios: Vec<Scenario>,
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Loads the bundled scenario manifests.
pub fn load_scenarios() -> Vec<Scenario> {
    load_scenarios_from(&fixtures_dir())
}

/// Loads `reconcile_scenarios.toml` and `reconcile_scenarios.json` from
/// `dir`, panicking if either is malformed or if they disagree.
pub fn load_scenarios_from(dir: &Path) -> Vec<Scenario> {
    let toml_path = dir.join("reconcile_scenarios.toml");
    let json_path = dir.join("reconcile_scenarios.json");

    let toml_manifest: ScenarioManifest = {
        let content = fs::read_to_string(&toml_path)
            .unwrap_or_else(|err| panic!("failed to read scenario TOML {toml_path:?}: {err}"));
        toml::from_str(&content)
            .unwrap_or_else(|err| panic!("failed to parse scenario TOML {toml_path:?}: {err}"))
    };
    let json_manifest: ScenarioManifest = {
        let content = fs::read_to_string(&json_path)
            .unwrap_or_else(|err| panic!("failed to read scenario JSON {json_path:?}: {err}"));
        serde_json::from_str(&content)
            .unwrap_or_else(|err| panic!("failed to parse scenario JSON {json_path:?}: {err}"))
    };

    validate_manifest(&toml_manifest, &toml_path);
    validate_manifest(&json_manifest, &json_path);

    let mut toml_sorted = toml_manifest.scenarios.clone();
    let mut json_sorted = json_manifest.scenarios;
    toml_sorted.sort_by(|a, b| a.name.cmp(&b.name));
    json_sorted.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(
        toml_sorted, json_sorted,
        "scenario manifests diverged: {toml_path:?} vs {json_path:?}"
    );
    toml_manifest.scenarios
}

fn validate_manifest(manifest: &ScenarioManifest, path: &Path) {
    assert_eq!(
        manifest.format, SCENARIOS_FORMAT_V1,
        "unsupported scenario manifest format in {path:?}"
    );
    let mut names = BTreeSet::new();
    for scenario in &manifest.scenarios {
        assert!(
            !scenario.name.trim().is_empty(),
            "scenario without a name in {path:?}"
        );
        assert!(
            names.insert(scenario.name.as_str()),
            "duplicate scenario name in {path:?}: {}",
            scenario.name
        );
        if scenario.mode == ScenarioMode::Keyed {
            let unique: BTreeSet<_> = scenario.next.iter().collect();
            assert_eq!(
                unique.len(),
                scenario.next.len(),
                "scenario '{}' in {path:?} repeats a key",
                scenario.name
            );
        }
    }
}
