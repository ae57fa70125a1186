//! CLI integration tests using assert_cmd.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const NOW: &str = "2026-06-15T12:00:00Z";

fn wordwise(dir: &TempDir) -> Command {
    wordwise_at(dir, NOW)
}

/// A `wordwise` invocation against a database inside `dir` at a fixed
/// instant, isolated from the caller's environment.
fn wordwise_at(dir: &TempDir, now: &str) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("wordwise").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("WORDWISE_DB_PATH")
        .env_remove("WORDWISE_BUSY_TIMEOUT_MS")
        .env("WORDWISE_SEED", "7")
        .arg("--db")
        .arg(dir.path().join("test.db"))
        .arg("--now")
        .arg(now);
    cmd
}

fn add(dir: &TempDir, word: &str) {
    wordwise(dir).args(["add", word]).assert().success();
}

#[test]
fn help_lists_commands() {
    #[allow(deprecated)]
    Command::cargo_bin("wordwise")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("practice"))
        .stdout(predicate::str::contains("by-difficulty"));
}

#[test]
fn add_then_next_shows_new_word() {
    let dir = TempDir::new().unwrap();
    wordwise(&dir)
        .args(["add", "apple", "--meaning", "manzana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added apple"));

    wordwise(&dir)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("apple [new]"))
        .stdout(predicate::str::contains("manzana"));
}

#[test]
fn next_on_empty_catalog() {
    let dir = TempDir::new().unwrap();
    wordwise(&dir)
        .arg("next")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to study"));

    wordwise(&dir)
        .args(["next", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("null"));
}

#[test]
fn forgotten_word_is_due_tomorrow() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");

    wordwise(&dir)
        .args(["review", "apple", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reviewed apple (again)"))
        .stdout(predicate::str::contains("stability 0.40"))
        .stdout(predicate::str::contains("2026-06-16T12:00:00Z"));
}

#[test]
fn review_json_output() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");

    let output = wordwise(&dir)
        .args(["review", "apple", "good", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["rating"], "good");
    assert_eq!(outcome["state"]["item_key"], "apple");
    assert_eq!(outcome["state"]["review_count"], 1);
    assert!(outcome["interval_days"].as_f64().unwrap() >= 1.0);
}

#[test]
fn out_of_range_rating_fails() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");

    wordwise(&dir)
        .args(["review", "apple", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid rating"));

    wordwise(&dir)
        .args(["show", "apple"])
        .assert()
        .success()
        .stdout(predicate::str::contains("new"));
}

#[test]
fn review_of_unknown_word_fails() {
    let dir = TempDir::new().unwrap();
    wordwise(&dir)
        .args(["review", "banana", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Item not found"));
}

#[test]
fn reset_twice() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");
    wordwise(&dir).args(["review", "apple", "3"]).assert().success();

    wordwise(&dir)
        .args(["reset", "apple"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset apple"));

    wordwise(&dir)
        .args(["reset", "apple"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no review history"));
}

#[test]
fn word_becomes_due_as_time_passes() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");
    wordwise(&dir).args(["review", "apple", "1"]).assert().success();

    wordwise(&dir)
        .arg("due")
        .assert()
        .success()
        .stdout(predicate::str::contains("No words due"));

    wordwise_at(&dir, "2026-06-16T12:00:00Z")
        .arg("due")
        .assert()
        .success()
        .stdout(predicate::str::contains("apple"))
        .stdout(predicate::str::contains("1 of 1 due"));
}

#[test]
fn stats_json() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");
    add(&dir, "pear");
    wordwise(&dir).args(["review", "apple", "4"]).assert().success();

    let output = wordwise(&dir).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());

    let stats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_items"], 2);
    assert_eq!(stats["items_with_memory"], 1);
    assert_eq!(stats["reviewed_today"], 1);
    assert_eq!(stats["due_count"], 0);
}

#[test]
fn import_reports_bad_lines() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("words.jsonl");
    fs::write(
        &file,
        "{\"word\": \"apple\", \"meaning\": \"manzana\"}\n\
         not json\n\
         {\"word\": \"pear\", \"deck_name\": \"fruit\"}\n",
    )
    .unwrap();

    wordwise(&dir)
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 of 3 words"))
        .stderr(predicate::str::contains("line 2"));

    wordwise(&dir)
        .args(["show", "pear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fruit"));
}

#[test]
fn export_writes_one_line_per_word() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");
    add(&dir, "pear");
    wordwise(&dir).args(["review", "apple", "3"]).assert().success();

    let out = dir.path().join("backup.jsonl");
    wordwise(&dir)
        .arg("export")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 words (1 with review history)"));

    let content = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(content.contains("memory_state"));
}

#[test]
fn practice_grades_typed_answer() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");
    add(&dir, "pear");

    wordwise(&dir)
        .args(["practice", "apple", " Apple ", "--response-ms", "1000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct!"))
        .stdout(predicate::str::contains("(easy)"));

    wordwise(&dir)
        .args(["practice", "pear", "peach"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Incorrect"))
        .stdout(predicate::str::contains("(again)"));
}

#[test]
fn by_difficulty_filters_reviewed_words() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");
    add(&dir, "pear");
    add(&dir, "plum");
    wordwise(&dir).args(["review", "apple", "1"]).assert().success();
    wordwise(&dir).args(["review", "pear", "4"]).assert().success();

    let output = wordwise(&dir)
        .args(["by-difficulty", "--min", "6", "--max", "10", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["apple"]);
}

#[test]
fn invalid_now_is_rejected() {
    let dir = TempDir::new().unwrap();
    #[allow(deprecated)]
    Command::cargo_bin("wordwise")
        .unwrap()
        .current_dir(dir.path())
        .arg("--db")
        .arg(dir.path().join("test.db"))
        .args(["--now", "yesterday", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RFC 3339"));
}

#[test]
fn remove_deletes_word() {
    let dir = TempDir::new().unwrap();
    add(&dir, "apple");

    wordwise(&dir)
        .args(["remove", "apple"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed apple"));

    wordwise(&dir)
        .args(["show", "apple"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Item not found"));
}
