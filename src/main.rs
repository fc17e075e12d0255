use mimalloc::MiMalloc;
use std::process::ExitCode;
use surface::{MutationCounts, SnapshotOptions, SurfaceSnapshot, SurfaceStore};
use vdom::{Context, ReconcileError, Reconciler};
use vdom_test_support::scenarios::{Scenario, ScenarioMode, load_scenarios};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

struct Outcome {
    snapshot: SurfaceSnapshot,
    counts: MutationCounts,
    failure: Option<String>,
}

/// Mounts the previous sequence, reconciles it into the next one and checks
/// the result against the scenario's expectations.
fn run(scenario: &Scenario) -> Result<Outcome, ReconcileError> {
    let mut store = SurfaceStore::new();
    let root = store.create_root("ul");
    let mut reconciler = Reconciler::new(store);
    let cx = Context::new();

    let mut prev = scenario.prev_children();
    reconciler.reconcile_children(Vec::new(), &mut prev, root, &cx)?;
    reconciler.take_stats();
    reconciler.surface_mut().take_journal();

    let mut next = scenario.next_children();
    match scenario.mode {
        ScenarioMode::Keyed => reconciler.reconcile_keyed(prev, &mut next, root, &cx)?,
        ScenarioMode::NonKeyed => reconciler.reconcile_non_keyed(prev, &mut next, root, &cx)?,
    }

    let store = reconciler.surface();
    let text = store.text_content(root);
    let failure = if text != scenario.expected_text() {
        Some(format!(
            "expected text {:?}, got {text:?}",
            scenario.expected_text()
        ))
    } else {
        scenario.expect.check(&reconciler.stats()).err()
    };
    Ok(Outcome {
        snapshot: SurfaceSnapshot::new(store, root, SnapshotOptions::default()),
        counts: store.counts(),
        failure,
    })
}

fn main() -> ExitCode {
    let filter = std::env::args().nth(1);
    let verbose = std::env::var("GROVE_VERBOSE").is_ok();
    let mut failed = 0usize;
    let mut ran = 0usize;

    for scenario in load_scenarios() {
        if let Some(filter) = &filter
            && !scenario.name.contains(filter.as_str())
        {
            continue;
        }
        ran += 1;
        match run(&scenario) {
            Ok(outcome) => {
                let status = if outcome.failure.is_some() { "FAIL" } else { "ok" };
                println!(
                    "{status:>4} {} ({} structural, {} created, {} released)",
                    scenario.name,
                    outcome.counts.structural(),
                    outcome.counts.creates,
                    outcome.counts.releases
                );
                if let Some(failure) = outcome.failure {
                    failed += 1;
                    println!("     {failure}");
                }
                if verbose {
                    for line in outcome.snapshot.as_lines() {
                        println!("     | {line}");
                    }
                }
            }
            Err(err) => {
                failed += 1;
                println!("FAIL {}: {err}", scenario.name);
            }
        }
    }

    println!("{ran} scenarios, {failed} failed");
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
