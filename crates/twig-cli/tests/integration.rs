//! Integration tests for the twig CLI.
//!
//! These tests drive the binary end to end in a fresh temp directory.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get twig command.
fn twig() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_twig"));
    cmd.env_remove("TWIG_LOG");
    cmd
}

/// Helper to run a twig command in `dir` and require success.
fn ok(dir: &TempDir, args: &[&str]) -> String {
    let out = twig()
        .args(args)
        .current_dir(dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).expect("stdout is utf-8")
}

/// Helper to create an initialized repository.
fn setup_repo() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp dir");
    ok(&temp, &["init"]);
    temp
}

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).expect("Failed to write file");
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).expect("Failed to read file")
}

fn commit_file(dir: &TempDir, name: &str, content: &str, message: &str) {
    write(dir, name, content);
    ok(dir, &["add", name]);
    ok(dir, &["commit", message]);
}

/// Commit ids printed by `log`, newest first.
fn log_ids(dir: &TempDir) -> Vec<String> {
    ok(dir, &["log"])
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(String::from)
        .collect()
}

// ============================================================================
// Basic CLI tests
// ============================================================================

#[test]
fn test_version_flag() {
    twig()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("twig"));
}

#[test]
fn test_help_lists_commands() {
    twig()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("global-log"))
        .stdout(predicate::str::contains("rm-branch"))
        .stdout(predicate::str::contains("merge"));
}

#[test]
fn test_no_subcommand_shows_usage() {
    twig()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_completions_bash() {
    twig()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("twig"));
}

// ============================================================================
// Init
// ============================================================================

#[test]
fn test_init_creates_control_directory() {
    let temp = setup_repo();

    assert!(temp.path().join(".twig/HEAD").exists());
    assert!(temp.path().join(".twig/objects").is_dir());
    assert!(temp.path().join(".twig/refs/heads/master").exists());
    assert!(temp.path().join(".twig/config.toml").exists());

    let log = ok(&temp, &["log"]);
    assert!(log.contains("initial commit"));
    assert!(log.contains("Date: "));
}

#[test]
fn test_init_twice_fails() {
    let temp = setup_repo();

    twig()
        .arg("init")
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_init_initial_branch() {
    let temp = TempDir::new().unwrap();
    ok(&temp, &["init", "--initial-branch", "trunk"]);

    let status = ok(&temp, &["status"]);
    assert!(status.contains("*trunk"));
}

#[test]
fn test_commands_require_repository() {
    let temp = TempDir::new().unwrap();

    for args in [vec!["status"], vec!["log"], vec!["add", "f.txt"], vec!["merge", "x"]] {
        twig()
            .args(&args)
            .current_dir(&temp)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not in an initialized Twig directory."));
    }
}

// ============================================================================
// Staging and committing
// ============================================================================

#[test]
fn test_add_missing_file() {
    let temp = setup_repo();

    twig()
        .args(["add", "nope.txt"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist."));
}

#[test]
fn test_commit_requires_staged_changes() {
    let temp = setup_repo();

    twig()
        .args(["commit", "nothing"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No changes added to the commit."));
}

#[test]
fn test_commit_requires_message() {
    let temp = setup_repo();
    write(&temp, "f.txt", "X");
    ok(&temp, &["add", "f.txt"]);

    twig()
        .args(["commit", ""])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a commit message."));
}

#[test]
fn test_rm_without_reason() {
    let temp = setup_repo();
    write(&temp, "f.txt", "X");

    twig()
        .args(["rm", "f.txt"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No reason to remove the file."));
}

#[test]
fn test_status_sections() {
    let temp = setup_repo();
    commit_file(&temp, "tracked.txt", "1", "base");
    commit_file(&temp, "doomed.txt", "1", "more");
    ok(&temp, &["branch", "other"]);

    write(&temp, "tracked.txt", "2");
    ok(&temp, &["rm", "doomed.txt"]);
    write(&temp, "new.txt", "n");
    ok(&temp, &["add", "new.txt"]);
    write(&temp, "stray.txt", "s");

    let status = ok(&temp, &["status"]);
    let expected = "\
=== Branches ===
*master
other

=== Staged Files ===
new.txt

=== Removed Files ===
doomed.txt

=== Modifications Not Staged For Commit ===
tracked.txt (modified)

=== Untracked Files ===
stray.txt

";
    assert_eq!(status, expected);
}

#[test]
fn test_status_json() {
    let temp = setup_repo();
    write(&temp, "stray.txt", "s");

    let out = ok(&temp, &["status", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["current_branch"], "master");
    assert_eq!(value["untracked"][0], "stray.txt");
}

// ============================================================================
// History
// ============================================================================

#[test]
fn test_global_log_and_find() {
    let temp = setup_repo();
    commit_file(&temp, "f.txt", "1", "shared message");
    ok(&temp, &["branch", "other"]);
    ok(&temp, &["checkout", "other"]);
    commit_file(&temp, "g.txt", "2", "shared message");

    let global = ok(&temp, &["global-log"]);
    assert_eq!(global.matches("===\ncommit ").count(), 3);

    let found = ok(&temp, &["find", "shared message"]);
    assert_eq!(found.lines().count(), 2);

    twig()
        .args(["find", "missing"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Found no commit with that message."));
}

// ============================================================================
// Scenario: commit then restore an older version of a file
// ============================================================================

#[test]
fn test_checkout_file_from_commit() {
    let temp = setup_repo();
    commit_file(&temp, "f.txt", "X", "c1");
    commit_file(&temp, "f.txt", "Y", "c2");

    let ids = log_ids(&temp);
    assert_eq!(ids.len(), 3);
    let c1 = &ids[1];

    ok(&temp, &["checkout", &c1[..6], "--", "f.txt"]);
    assert_eq!(read(&temp, "f.txt"), "X");

    ok(&temp, &["checkout", "--", "f.txt"]);
    assert_eq!(read(&temp, "f.txt"), "Y");

    twig()
        .args(["checkout", "--", "missing.txt"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("File does not exist in that commit."));

    twig()
        .args(["checkout", "ffffffffff", "--", "f.txt"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No commit with that id exists."));
}

// ============================================================================
// Scenario: untracked file blocks checkout
// ============================================================================

#[test]
fn test_checkout_blocked_by_untracked_file() {
    let temp = setup_repo();
    ok(&temp, &["branch", "other"]);
    ok(&temp, &["checkout", "other"]);
    commit_file(&temp, "f.txt", "theirs", "add on other");
    ok(&temp, &["checkout", "master"]);
    assert!(!temp.path().join("f.txt").exists());

    write(&temp, "f.txt", "mine");
    twig()
        .args(["checkout", "other"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("untracked file in the way"));
    assert_eq!(read(&temp, "f.txt"), "mine");
    assert!(ok(&temp, &["status"]).contains("*master"));
}

#[test]
fn test_checkout_replaces_staged_file() {
    let temp = setup_repo();
    ok(&temp, &["branch", "other"]);
    ok(&temp, &["checkout", "other"]);
    commit_file(&temp, "n.txt", "theirs", "add on other");
    ok(&temp, &["checkout", "master"]);

    write(&temp, "n.txt", "mine");
    ok(&temp, &["add", "n.txt"]);
    ok(&temp, &["checkout", "other"]);
    assert_eq!(read(&temp, "n.txt"), "theirs");
}

#[test]
fn test_add_rejects_paths_outside_tree() {
    let outer = TempDir::new().unwrap();
    let work = outer.path().join("work");
    fs::create_dir(&work).unwrap();
    fs::write(outer.path().join("secret.txt"), "outside").unwrap();
    twig().arg("init").current_dir(&work).assert().success();

    for name in ["../secret.txt", ".twig/HEAD", "sub/f.txt"] {
        twig()
            .args(["add", name])
            .current_dir(&work)
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid file name"));
    }

    twig()
        .args(["commit", "sneaky"])
        .current_dir(&work)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No changes added to the commit."));
}

#[test]
fn test_branch_errors() {
    let temp = setup_repo();
    ok(&temp, &["branch", "other"]);

    let cases: [(&[&str], &str); 4] = [
        (&["branch", "other"], "A branch with that name already exists."),
        (&["checkout", "nope"], "No such branch exists."),
        (&["checkout", "master"], "No need to checkout the current branch."),
        (&["rm-branch", "master"], "Cannot remove the current branch."),
    ];
    for (args, message) in cases {
        twig()
            .args(args)
            .current_dir(&temp)
            .assert()
            .failure()
            .stderr(predicate::str::contains(message));
    }

    ok(&temp, &["rm-branch", "other"]);
    twig()
        .args(["rm-branch", "other"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch with that name does not exist."));
}

#[test]
fn test_reset_moves_head() {
    let temp = setup_repo();
    commit_file(&temp, "f.txt", "X", "c1");
    commit_file(&temp, "g.txt", "G", "c2");
    let ids = log_ids(&temp);

    ok(&temp, &["reset", &ids[1]]);
    assert_eq!(log_ids(&temp), ids[1..].to_vec());
    assert!(!temp.path().join("g.txt").exists());
    assert_eq!(read(&temp, "f.txt"), "X");

    // the dropped commit is still in global history
    assert!(ok(&temp, &["global-log"]).contains(&ids[0]));
}

// ============================================================================
// Merge scenarios
// ============================================================================

#[test]
fn test_merge_conflict() {
    let temp = setup_repo();
    commit_file(&temp, "f.txt", "base\n", "c1");
    ok(&temp, &["branch", "other"]);
    commit_file(&temp, "f.txt", "A\n", "master edit");
    ok(&temp, &["checkout", "other"]);
    commit_file(&temp, "f.txt", "B\n", "other edit");
    ok(&temp, &["checkout", "master"]);

    twig()
        .args(["merge", "other"])
        .current_dir(&temp)
        .assert()
        .success()
        .stderr(predicate::str::contains("Encountered a merge conflict."));

    assert_eq!(read(&temp, "f.txt"), "<<<<<<< HEAD\nA\n=======\nB\n>>>>>>>\n");
    let log = ok(&temp, &["log"]);
    assert!(log.contains("Merge: "));
    assert!(log.contains("Encountered a merge conflict."));
}

#[test]
fn test_merge_ancestor() {
    let temp = setup_repo();
    commit_file(&temp, "f.txt", "X", "c1");
    ok(&temp, &["branch", "other"]);
    let before = log_ids(&temp);

    twig()
        .args(["merge", "other"])
        .current_dir(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Given branch is an ancestor of the current branch.",
        ));
    assert_eq!(log_ids(&temp), before);
}

#[test]
fn test_merge_fast_forward() {
    let temp = setup_repo();
    commit_file(&temp, "f.txt", "X", "c1");
    ok(&temp, &["branch", "other"]);
    ok(&temp, &["checkout", "other"]);
    commit_file(&temp, "g.txt", "G", "o1");
    let other_ids = log_ids(&temp);
    ok(&temp, &["checkout", "master"]);

    twig()
        .args(["merge", "other"])
        .current_dir(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Current branch fast-forwarded."));

    assert_eq!(log_ids(&temp), other_ids);
    assert_eq!(read(&temp, "g.txt"), "G");
    assert_eq!(read(&temp, "f.txt"), "X");
}

#[test]
fn test_merge_clean_json() {
    let temp = setup_repo();
    commit_file(&temp, "a.txt", "a", "base");
    ok(&temp, &["branch", "other"]);
    commit_file(&temp, "m.txt", "m", "master side");
    ok(&temp, &["checkout", "other"]);
    commit_file(&temp, "o.txt", "o", "other side");
    ok(&temp, &["checkout", "master"]);

    let out = ok(&temp, &["merge", "other", "--json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["outcome"], "merged");

    assert_eq!(read(&temp, "o.txt"), "o");
    assert!(ok(&temp, &["log"]).contains("Merged other into master."));
}

#[test]
fn test_merge_errors() {
    let temp = setup_repo();
    ok(&temp, &["branch", "other"]);

    twig()
        .args(["merge", "master"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot merge a branch with itself."));

    twig()
        .args(["merge", "nope"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch with that name does not exist."));

    write(&temp, "f.txt", "X");
    ok(&temp, &["add", "f.txt"]);
    twig()
        .args(["merge", "other"])
        .current_dir(&temp)
        .assert()
        .failure()
        .stderr(predicate::str::contains("You have uncommitted changes."));
}
