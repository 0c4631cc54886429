//! Integration tests for the goalgraph CLI.
//!
//! Each test runs the real binary inside a fresh temporary workspace.

use rstest::{fixture, rstest};
use tempfile::TempDir;

mod common;
use common::{add_goal, run_goalgraph_in_dir};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Provides a temporary directory with an initialized workspace
#[fixture]
fn initialized_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let output = run_goalgraph_in_dir(temp.path(), &["init", "--prefix", "test", "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize goalgraph: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    temp
}

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ============================================================================
// Help and Init
// ============================================================================

#[rstest]
fn test_cli_help_lists_commands(temp_dir: TempDir) {
    let output = run_goalgraph_in_dir(temp_dir.path(), &["--help"]);
    assert!(output.status.success());

    let text = stdout(&output);
    for command in [
        "init", "add", "edit", "rm", "toggle", "mv", "link", "unlink", "show", "list", "tree",
        "search", "progress", "check",
    ] {
        assert!(text.contains(command), "help should list '{command}'");
    }
}

#[rstest]
fn test_init_creates_workspace(temp_dir: TempDir) {
    let output = run_goalgraph_in_dir(temp_dir.path(), &["init", "--prefix", "proj"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let dir = temp_dir.path().join(".goalgraph");
    assert!(dir.join("config.yaml").exists());
    assert!(dir.join("goals.jsonl").exists());
    assert!(stdout(&output).contains("Goal prefix: proj"));
}

#[rstest]
fn test_init_twice_fails(initialized_dir: TempDir) {
    let output = run_goalgraph_in_dir(initialized_dir.path(), &["init"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("already initialized"));
}

#[rstest]
fn test_commands_require_workspace(temp_dir: TempDir) {
    let output = run_goalgraph_in_dir(temp_dir.path(), &["list"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("goalgraph init"));
}

// ============================================================================
// Mutations
// ============================================================================

#[rstest]
fn test_add_and_show(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    let parent = add_goal(dir, &["Launch", "--assignee", "alice", "--deadline", "2030-01-15"]);
    let child = add_goal(dir, &["Write copy", "--parent", &parent]);
    assert!(parent.starts_with("test-"));

    let output = run_goalgraph_in_dir(dir, &["--json", "show", &child]);
    assert!(output.status.success(), "{}", stderr(&output));
    let shown = json(&output);
    assert_eq!(shown["goal"]["title"], "Write copy");
    assert_eq!(shown["parents"][0], parent.as_str());

    let output = run_goalgraph_in_dir(dir, &["show", &parent]);
    let text = stdout(&output);
    assert!(text.contains("Launch"));
    assert!(text.contains("Assignee: alice"));
    assert!(text.contains("Children (1):"));
}

#[rstest]
fn test_add_under_missing_parent_creates_nothing(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    let output = run_goalgraph_in_dir(dir, &["add", "Orphan", "--parent", "test-zzzz"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Goal not found"));

    let output = run_goalgraph_in_dir(dir, &["--json", "list"]);
    assert_eq!(json(&output).as_array().unwrap().len(), 0);
}

#[rstest]
fn test_edit_sets_and_clears_fields(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    let id = add_goal(dir, &["Draft", "--assignee", "bob"]);

    let output = run_goalgraph_in_dir(
        dir,
        &["--json", "edit", &id, "--title", "Final", "--no-assignee"],
    );
    assert!(output.status.success(), "{}", stderr(&output));
    let goal = json(&output);
    assert_eq!(goal["title"], "Final");
    assert!(goal.get("assignee").is_none());
}

#[rstest]
fn test_toggle_cascades_and_progress(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    let root = add_goal(dir, &["Root"]);
    let child = add_goal(dir, &["Child", "--parent", &root]);
    add_goal(dir, &["Other root"]);

    let output = run_goalgraph_in_dir(dir, &["--json", "toggle", &root]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(json(&output)["affected"].as_array().unwrap().len(), 2);

    let output = run_goalgraph_in_dir(dir, &["--json", "show", &child]);
    assert_eq!(json(&output)["goal"]["completed"], true);

    let output = run_goalgraph_in_dir(dir, &["--json", "progress"]);
    let stats = json(&output);
    assert_eq!(stats["progress"], 50);
    assert_eq!(stats["roots"], 2);
    assert_eq!(stats["completed"], 2);
}

#[rstest]
fn test_move_link_unlink_and_tree(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    let a = add_goal(dir, &["Alpha"]);
    let b = add_goal(dir, &["Beta"]);
    let c = add_goal(dir, &["Gamma"]);

    let output = run_goalgraph_in_dir(dir, &["--json", "mv", &c, "--under", &a]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(json(&output)["siblings"][0], c.as_str());

    let output = run_goalgraph_in_dir(dir, &["link", &b, &c]);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = run_goalgraph_in_dir(dir, &["--json", "tree"]);
    let tree = json(&output);
    assert_eq!(tree[0]["title"], "Alpha");
    assert_eq!(tree[0]["children"][0]["title"], "Gamma");
    assert_eq!(tree[1]["children"][0]["title"], "Gamma");

    let output = run_goalgraph_in_dir(dir, &["unlink", &a, &c]);
    assert!(stdout(&output).contains("Unlinked"));
    let output = run_goalgraph_in_dir(dir, &["unlink", &a, &c]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No relation"));

    // Gamma still sits under Beta
    let output = run_goalgraph_in_dir(dir, &["tree"]);
    let text = stdout(&output);
    assert!(text.contains("└── ○"), "unexpected tree:\n{text}");
}

#[rstest]
fn test_move_into_descendant_is_rejected(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    let parent = add_goal(dir, &["Parent"]);
    let child = add_goal(dir, &["Child", "--parent", &parent]);

    let output = run_goalgraph_in_dir(dir, &["mv", &parent, "--under", &child]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("cycle"));

    let output = run_goalgraph_in_dir(dir, &["check"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("consistent"));
}

#[rstest]
#[case::detach(&[] as &[&str], 2)]
#[case::cascade(&["--mode", "cascade"], 1)]
fn test_rm_modes(initialized_dir: TempDir, #[case] extra: &[&str], #[case] remaining: usize) {
    let dir = initialized_dir.path();
    let parent = add_goal(dir, &["Parent"]);
    add_goal(dir, &["Child", "--parent", &parent]);
    add_goal(dir, &["Keep"]);

    let mut args = vec!["rm", parent.as_str()];
    args.extend_from_slice(extra);
    let output = run_goalgraph_in_dir(dir, &args);
    assert!(output.status.success(), "{}", stderr(&output));

    let output = run_goalgraph_in_dir(dir, &["--json", "list"]);
    assert_eq!(json(&output).as_array().unwrap().len(), remaining);
}

// ============================================================================
// Views
// ============================================================================

#[rstest]
fn test_list_filter_sort_and_search(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    add_goal(dir, &["Later", "--deadline", "2031-01-01"]);
    let soon = add_goal(dir, &["Sooner plan", "--deadline", "2030-01-01"]);
    add_goal(dir, &["No date plan"]);
    run_goalgraph_in_dir(dir, &["toggle", &soon]);

    let output = run_goalgraph_in_dir(dir, &["--json", "list", "--sort", "deadline"]);
    let titles: Vec<String> = json(&output)
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Sooner plan", "Later", "No date plan"]);

    let output = run_goalgraph_in_dir(dir, &["--json", "list", "--filter", "active"]);
    assert_eq!(json(&output).as_array().unwrap().len(), 2);

    let output = run_goalgraph_in_dir(dir, &["--json", "search", "PLAN"]);
    assert_eq!(json(&output).as_array().unwrap().len(), 2);

    let output = run_goalgraph_in_dir(dir, &["search", "nothing"]);
    assert!(stdout(&output).contains("No goals found."));
}

#[rstest]
fn test_corrupt_line_is_reported_not_fatal(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    add_goal(dir, &["Survivor"]);

    let goals_file = dir.join(".goalgraph").join("goals.jsonl");
    let mut content = std::fs::read_to_string(&goals_file).unwrap();
    content.push_str("{ broken\n");
    std::fs::write(&goals_file, content).unwrap();

    let output = run_goalgraph_in_dir(dir, &["--json", "list"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(json(&output).as_array().unwrap().len(), 1);

    // Logged once, at warn level, naming the bad line
    let log = stderr(&output);
    assert!(log.contains("WARN"), "unexpected stderr:\n{log}");
    assert!(log.contains("line 4: skipped malformed record"));
    assert_eq!(log.matches("skipped malformed record").count(), 1);
}

#[rstest]
fn test_audit_log_records_actor(initialized_dir: TempDir) {
    let dir = initialized_dir.path();
    let config_path = dir.join(".goalgraph").join("config.yaml");
    let mut config = std::fs::read_to_string(&config_path).unwrap();
    config.push_str("audit-log: .goalgraph/audit.jsonl\n");
    std::fs::write(&config_path, config).unwrap();

    add_goal(dir, &["Audited"]);

    let audit = std::fs::read_to_string(dir.join(".goalgraph").join("audit.jsonl")).unwrap();
    let record: serde_json::Value = serde_json::from_str(audit.lines().next().unwrap()).unwrap();
    assert_eq!(record["op"], "created");
    assert_eq!(record["actor"], "tester");
}
