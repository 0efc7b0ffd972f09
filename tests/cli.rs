use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

/// A scratch data file for one test
struct TestEnv {
    _tmp: TempDir,
    data: std::path::PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let data = tmp.path().join("library.json");
        Self { _tmp: tmp, data }
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("library");
        cmd.env("NO_COLOR", "1")
            .env_remove("LIBRARY_DATA")
            .env_remove("RUST_LOG")
            .arg("--data")
            .arg(&self.data);
        cmd
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let out = self.cmd().arg("--json").args(args).assert().success().get_output().stdout.clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}

#[test]
fn add_borrow_return_cycle() {
    let env = TestEnv::new();
    env.cmd()
        .args(["add", "111", "Book A", "--copies", "1"])
        .assert()
        .success()
        .stdout(contains("successfully added"));

    env.cmd()
        .args(["--today", "2024-03-01", "borrow", "123456", "111"])
        .assert()
        .success()
        .stdout(contains("Due date: 2024-03-15"));

    env.cmd()
        .args(["borrow", "654321", "111"])
        .assert()
        .failure()
        .stderr(contains("not available"));

    env.cmd()
        .args(["--today", "2024-03-18", "return", "123456", "111"])
        .assert()
        .success()
        .stdout(contains("3 days late"))
        .stdout(contains("$1.50"));

    let books = env.run_json(&["catalog"]);
    assert_eq!(books[0]["available_copies"], 1);
}

#[test]
fn duplicate_isbn_fails() {
    let env = TestEnv::new();
    env.cmd().args(["add", "111", "Book A"]).assert().success();
    env.cmd()
        .args(["add", "111", "Book B"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn search_by_title_and_isbn() {
    let env = TestEnv::new();
    env.cmd().args(["add", "111", "Book A"]).assert().success();
    env.cmd().args(["add", "222", "Dune", "--author", "Frank Herbert"]).assert().success();

    let hits = env.run_json(&["search", "boo"]);
    assert_eq!(hits.as_array().map(Vec::len), Some(1));
    assert_eq!(hits[0]["title"], "Book A");

    let hits = env.run_json(&["search", "--by", "author", "herbert"]);
    assert_eq!(hits[0]["isbn"], "222");

    let none = env.run_json(&["search", "--by", "isbn", "999"]);
    assert_eq!(none.as_array().map(Vec::len), Some(0));
}

#[test]
fn fee_and_status_json() {
    let env = TestEnv::new();
    env.cmd().args(["add", "111", "Book A"]).assert().success();
    env.cmd().args(["--today", "2024-03-01", "borrow", "123456", "111"]).assert().success();

    let quote = env.run_json(&["--today", "2024-03-25", "fee", "123456", "111"]);
    assert_eq!(quote["patron_id"], "123456");
    assert_eq!(quote["overdue"], true);
    assert_eq!(quote["days_overdue"], 10);
    assert_eq!(quote["fee"], 5.0);

    let status = env.run_json(&["--today", "2024-03-25", "status", "123456"]);
    assert_eq!(status["borrowed_count"], 1);
    assert_eq!(status["total_late_fees"], 5.0);
}

#[test]
fn malformed_patron_id_is_rejected() {
    let env = TestEnv::new();
    env.cmd()
        .args(["status", "12345"])
        .assert()
        .failure()
        .stderr(contains("Must be exactly 6 digits"));
}

#[test]
fn config_file_sets_policy() {
    let env = TestEnv::new();
    let config = env.data.with_file_name("library.toml");
    std::fs::write(&config, "[policy]\nmax_open_loans = 1\n").expect("write config");

    env.cmd().args(["add", "111", "Book A", "--copies", "2"]).assert().success();
    let config_arg = config.to_str().expect("utf-8 path");
    env.cmd().args(["--config", config_arg, "borrow", "123456", "111"]).assert().success();
    env.cmd()
        .args(["--config", config_arg, "borrow", "123456", "111"])
        .assert()
        .failure()
        .stderr(contains("limit of 1"));
}

#[test]
fn activity_lists_events() {
    let env = TestEnv::new();
    env.cmd().args(["--today", "2024-03-01", "add", "111", "Book A"]).assert().success();
    env.cmd()
        .arg("activity")
        .assert()
        .success()
        .stdout(contains("| 1 | 2024-03-01 | Added \"Book A\" (111), 1 copies |"));
}
