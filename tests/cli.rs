//! Drives the built `rampart` binary as a subprocess and asserts the
//! exit-code contract documented at the top of `crates/core/main.rs`:
//! 0 clean, 1 violation found, 2 configuration/argument error, 3 internal
//! panic.

use std::fs;
use std::path::Path;
use std::process::Command;

fn rampart() -> Command {
    Command::new(env!("CARGO_BIN_EXE_rampart"))
}

fn write_file(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

#[test]
fn clean_project_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "x = 1\n");
    write_file(
        dir.path(),
        "rampart.toml",
        "source_roots = [\"src\"]\n\n[[modules]]\npath = \"a\"\n",
    );

    let output = rampart().arg("-C").arg(dir.path()).arg("check").output().unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("no violations found"));
}

#[test]
fn rule_violation_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "import b\n");
    write_file(dir.path(), "src/b/__init__.py", "x = 1\n");
    write_file(
        dir.path(),
        "rampart.toml",
        "source_roots = [\"src\"]\n\n[[modules]]\npath = \"a\"\ndepends_on = []\n\n[[modules]]\npath = \"b\"\n",
    );

    let output = rampart().arg("-C").arg(dir.path()).arg("check").output().unwrap();
    assert_eq!(output.status.code(), Some(1), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Cannot import 'b'"));
}

#[test]
fn unreadable_config_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "x = 1\n");
    // No rampart.toml written at all: load() fails to read the file.

    let output = rampart().arg("-C").arg(dir.path()).arg("check").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn malformed_config_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "x = 1\n");
    write_file(dir.path(), "rampart.toml", "this is not valid toml =====\n");

    let output = rampart().arg("-C").arg(dir.path()).arg("check").output().unwrap();
    assert_eq!(output.status.code(), Some(2), "stderr: {}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn internal_panic_exits_three() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/a/x.py", "x = 1\n");
    write_file(dir.path(), "rampart.toml", "source_roots = [\"src\"]\n\n[[modules]]\npath = \"a\"\n");

    let output = rampart()
        .arg("-C")
        .arg(dir.path())
        .arg("check")
        .env("RAMPART_TEST_PANIC", "1")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stderr).contains("internal error"));
}
