//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use goalgraph::domain::{GoalId, NewGoal};
use goalgraph::engine::{EngineConfig, MutationEngine};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path to the goalgraph binary built for this test run
pub fn goalgraph_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_goalgraph"))
}

/// Run the goalgraph binary in `dir` with colors off
pub fn run_goalgraph_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(goalgraph_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("GOALGRAPH_ACTOR", "tester")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute goalgraph binary")
}

/// Create a goal through the CLI and return its id
pub fn add_goal(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["--json", "add"];
    full.extend_from_slice(args);
    let output = run_goalgraph_in_dir(dir, &full);
    assert!(
        output.status.success(),
        "add failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("add --json should print JSON");
    json["id"].as_str().expect("goal id").to_string()
}

/// An engine holding one root goal per title, in order
pub fn engine_with(titles: &[&str]) -> (MutationEngine, Vec<GoalId>) {
    let mut engine = MutationEngine::new(EngineConfig::default());
    let ids = titles
        .iter()
        .map(|title| engine.create(NewGoal::titled(*title)).unwrap().id)
        .collect();
    (engine, ids)
}

/// Titles of `ids`, resolved through the engine
pub fn titles_of(engine: &MutationEngine, ids: &[GoalId]) -> Vec<String> {
    ids.iter()
        .map(|id| engine.store().get(id).unwrap().title.clone())
        .collect()
}
