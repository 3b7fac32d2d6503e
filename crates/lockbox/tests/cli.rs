// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Runs the `lockbox` binary against an isolated data directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lockbox"));
        cmd.args(args)
            .current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("LOCKBOX_STORAGE_DATA_DIR", self.data_dir())
            .env_remove("LOCKBOX_PIN")
            .env_remove("RUST_LOG")
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    fn run_with_pin(&self, args: &[&str], pin: &str) -> Output {
        self.command(args).env("LOCKBOX_PIN", pin).output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn exit_code(output: &Output) -> i32 {
    output.status.code().unwrap()
}

fn flip_last_byte(path: &Path) {
    let mut bytes = fs::read(path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(path, bytes).unwrap();
}

#[test]
fn save_get_check_delete_flow() {
    let sandbox = Sandbox::new();
    assert_eq!(exit_code(&sandbox.run(&["init"])), 0);

    let saved = sandbox.run(&["save", "www.example.com", "alice", "--password", "hunter22"]);
    assert_eq!(exit_code(&saved), 0);

    let masked = sandbox.run(&["get", "example.com"]);
    assert_eq!(exit_code(&masked), 0);
    assert!(stdout(&masked).contains("alice"));
    assert!(!stdout(&masked).contains("hunter22"));

    let revealed = sandbox.run(&["get", "example", "--reveal"]);
    assert!(stdout(&revealed).contains("hunter22"));
    assert!(stdout(&revealed).contains("www.example.com"));

    let check = sandbox.run(&["check", "example.com"]);
    assert!(stdout(&check).contains("username: alice"));

    assert_eq!(exit_code(&sandbox.run(&["delete", "example.com"])), 0);
    let gone = sandbox.run(&["get", "example.com"]);
    assert_eq!(exit_code(&gone), 1);
}

#[test]
fn init_twice_reports_existing_vault() {
    let sandbox = Sandbox::new();
    sandbox.run(&["init"]);
    let second = sandbox.run(&["init"]);
    assert_eq!(exit_code(&second), 0);
    assert!(stdout(&second).contains("already initialized"));
}

#[test]
fn first_vault_command_creates_key_store() {
    let sandbox = Sandbox::new();

    let saved = sandbox.run(&["save", "example.com", "alice", "--password", "pw"]);
    assert_eq!(exit_code(&saved), 0);
    assert!(sandbox.data_dir().join("private.pem").exists());

    let revealed = sandbox.run(&["get", "example.com", "--reveal"]);
    assert_eq!(exit_code(&revealed), 0);
    assert!(stdout(&revealed).contains("Password: pw"));
}

#[test]
fn check_on_fresh_directory_is_not_corrupt() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["check", "example.com"]);
    assert_eq!(exit_code(&output), 0);
}

#[test]
fn generate_respects_length_and_exclusions() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["generate", "--length", "32", "--exclude", "ulp"]);
    assert_eq!(exit_code(&output), 0);

    let password = stdout(&output).trim().to_string();
    assert_eq!(password.len(), 32);
    assert!(password.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn invalid_policy_is_recoverable() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["generate", "--exclude", "ludp"]);
    assert_eq!(exit_code(&output), 1);
}

#[test]
fn tampered_vault_is_fatal() {
    let sandbox = Sandbox::new();
    sandbox.run(&["init"]);
    sandbox.run(&["save", "example.com", "alice", "--password", "pw"]);
    flip_last_byte(&sandbox.data_dir().join("vault.bin"));

    let output = sandbox.run(&["get", "example.com"]);
    assert_eq!(exit_code(&output), 2);
    assert!(String::from_utf8_lossy(&output.stderr).contains("decryption failed"));
}

#[test]
fn pin_gates_vault_reads() {
    let sandbox = Sandbox::new();
    sandbox.run(&["init"]);
    sandbox.run(&["save", "example.com", "alice", "--password", "pw"]);
    assert_eq!(exit_code(&sandbox.run_with_pin(&["pin", "set"], "2468")), 0);

    assert_eq!(
        exit_code(&sandbox.run_with_pin(&["get", "example.com"], "2468")),
        0
    );
    assert_eq!(
        exit_code(&sandbox.run_with_pin(&["get", "example.com"], "1111")),
        1
    );
    // No PIN and no terminal to prompt on.
    assert_eq!(exit_code(&sandbox.run(&["get", "example.com"])), 1);

    // Status needs no PIN.
    let status = sandbox.run(&["status", "--json"]);
    assert_eq!(exit_code(&status), 0);
    assert!(stdout(&status).contains("\"pin_configured\": true"));
}

#[test]
fn rotate_keys_keeps_credentials() {
    let sandbox = Sandbox::new();
    sandbox.run(&["init"]);
    sandbox.run(&["save", "example.com", "alice", "--password", "pw"]);
    let before = fs::read(sandbox.data_dir().join("private.pem")).unwrap();

    assert_eq!(exit_code(&sandbox.run(&["rotate-keys"])), 0);

    assert_ne!(fs::read(sandbox.data_dir().join("private.pem")).unwrap(), before);
    let revealed = sandbox.run(&["get", "example.com", "--reveal"]);
    assert!(stdout(&revealed).contains("Password: pw"));
}

#[test]
fn invalid_config_is_fatal() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.dir.path().join("lockbox.toml"), "[keys]\nrsa_bits = 100\n").unwrap();

    assert_eq!(exit_code(&sandbox.run(&["status"])), 2);
}
