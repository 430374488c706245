//! End-to-end tests for the `run` command.
//!
//! Every test runs in dry-run mode with an explicit OS manager, so no real
//! package manager is ever invoked.

mod common;

use common::prelude::*;

fn read_json(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn run_cmd(fixture: &TestFixture) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("aktualizator");
    cmd.arg("--color")
        .arg("never")
        .arg("run")
        .arg("--dry-run")
        .arg("--os-manager")
        .arg("pkg")
        .arg("--lock-file")
        .arg(fixture.path().join("run.lock"))
        .arg("--venv-dir")
        .arg(fixture.venv_root())
        .arg("--out-inventory")
        .arg(fixture.out("inventory.json"))
        .arg("--out-issues")
        .arg(fixture.out("issues.json"))
        .arg("--out-repair")
        .arg(fixture.out("repair.json"));
    cmd
}

#[test]
fn test_run_help() {
    let mut cmd = cargo_bin_cmd!("aktualizator");
    cmd.arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--mode"))
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--no-lock"))
        .stdout(predicate::str::contains("AKTUALIZATOR_VENV_DIR"));
}

#[test]
fn test_run_dry_run_mode_a() {
    let fixture = TestFixture::new();

    run_cmd(&fixture)
        .arg("--mode")
        .arg("A")
        .assert()
        .success()
        .stdout(predicate::str::contains("[DRY RUN] DRY RUN MODE"))
        .stdout(predicate::str::contains("[OK] No issues found"));

    let inventory = read_json(&fixture.out("inventory.json"));
    assert_eq!(inventory["mode"], "A");
    assert_eq!(inventory["dry_run"], true);
    assert_eq!(inventory["inventory"]["os_packages"], serde_json::json!([]));
    assert_eq!(
        inventory["inventory"]["system_language_packages"],
        serde_json::json!([])
    );
    assert_eq!(inventory["inventory"]["environments"], serde_json::json!({}));

    let issues = read_json(&fixture.out("issues.json"));
    assert_eq!(issues["issues"], serde_json::json!([]));
    assert!(!fixture.out("repair.json").exists());
}

#[test]
fn test_run_mode_from_environment() {
    let fixture = TestFixture::new();

    run_cmd(&fixture)
        .env("AKTUALIZATOR_MODE", "B")
        .assert()
        .success();

    let inventory = read_json(&fixture.out("inventory.json"));
    assert_eq!(inventory["mode"], "B");
}

#[test]
#[cfg(unix)]
fn test_run_dry_run_lists_environments_without_packages() {
    let fixture = TestFixture::new().with_environment("web");

    run_cmd(&fixture).arg("--mode").arg("C").assert().success();

    let inventory = read_json(&fixture.out("inventory.json"));
    let web = &inventory["inventory"]["environments"]["web"];
    assert_eq!(web["packages"], serde_json::json!([]));
    assert!(web["manager_path"]
        .as_str()
        .unwrap()
        .ends_with("web/bin/pip3"));
}

#[test]
fn test_run_with_repair_writes_all_documents() {
    let fixture = TestFixture::new().with_sources("deb https://bad.example.com/termux stable main\n");

    run_cmd(&fixture)
        .arg("--mode")
        .arg("A")
        .arg("--repair")
        .arg("--sources")
        .arg(fixture.sources_path())
        .arg("--temp-dir")
        .arg(fixture.path().join("tmp"))
        .arg("--entry-link")
        .arg(fixture.path().join("bin/aktualizator"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[REPAIR] Repair finished with 0 warning(s)"));

    let repair = read_json(&fixture.out("repair.json"));
    assert_eq!(repair["steps"][0], "update: simulated");
    assert!(fixture.out("inventory.json").exists());
    assert!(fixture.out("issues.json").exists());
    assert!(!fixture.path().join("bin/aktualizator").exists());
}

#[test]
fn test_run_no_lock_leaves_no_lock_file() {
    let fixture = TestFixture::new();

    cargo_bin_cmd!("aktualizator")
        .arg("run")
        .arg("-n")
        .arg("--no-lock")
        .arg("--mode")
        .arg("A")
        .arg("--os-manager")
        .arg("pkg")
        .arg("--out-inventory")
        .arg(fixture.out("inventory.json"))
        .arg("--out-issues")
        .arg(fixture.out("issues.json"))
        .assert()
        .success();

    assert!(!fixture.path().join("run.lock").exists());
    assert!(fixture.out("inventory.json").exists());
}
