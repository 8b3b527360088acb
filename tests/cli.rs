//! Drives the sshelf binary for the non-interactive flags.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn sshelf(args: &[&str], config_dir: &TempDir, stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sshelf"))
        .args(args)
        .env("SSHELF_CONFIG_DIR", config_dir.path())
        .env_remove("SSH_TIMEOUT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start sshelf");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn version() {
    let dir = TempDir::new().unwrap();
    let output = sshelf(&["--version"], &dir, "");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("sshelf {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn set_timeout_reports_new_value() {
    let dir = TempDir::new().unwrap();
    let output = sshelf(&["--set-timeout"], &dir, "12\n");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout)
        .contains("Connect timeout set to 12 seconds for this session"));
    // nothing is persisted
    assert!(!dir.path().join("servers.json").exists());
}

#[test]
fn set_timeout_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let output = sshelf(&["--set-timeout"], &dir, "soon\n");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not a number"));
}

#[test]
fn corrupt_registry_is_fatal_and_untouched() {
    let dir = TempDir::new().unwrap();
    let registry = dir.path().join("servers.json");
    std::fs::write(&registry, "{ not json").unwrap();

    let output = sshelf(&[], &dir, "");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("is corrupt"));
    assert_eq!(std::fs::read_to_string(&registry).unwrap(), "{ not json");
}
