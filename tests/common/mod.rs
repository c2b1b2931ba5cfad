#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

pub fn conch() -> Command {
    Command::new(env!("CARGO_BIN_EXE_conch"))
}

fn script_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("conch_test_{}.cn", name))
}

/// Write `source` to a temp script, run the interpreter on it, and clean
/// up. `name` must be unique per test since tests run in parallel.
pub fn run_script(name: &str, source: &str) -> Output {
    let path = script_path(name);
    fs::write(&path, source).expect("failed to write temp script");
    let output = conch()
        .arg(&path)
        .output()
        .expect("failed to execute conch");
    fs::remove_file(&path).ok();
    output
}

pub fn run_script_verbose(name: &str, source: &str) -> Output {
    let path = script_path(name);
    fs::write(&path, source).expect("failed to write temp script");
    let output = conch()
        .arg("--verbose")
        .arg(&path)
        .output()
        .expect("failed to execute conch");
    fs::remove_file(&path).ok();
    output
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Assert success and return stdout.
pub fn expect_stdout(name: &str, source: &str) -> String {
    let output = run_script(name, source);
    assert!(
        output.status.success(),
        "script failed\nstderr: {}",
        stderr_of(&output)
    );
    stdout_of(&output)
}

/// Assert a non-zero exit and return stderr.
pub fn expect_failure(name: &str, source: &str) -> String {
    let output = run_script(name, source);
    assert!(
        !output.status.success(),
        "script unexpectedly succeeded\nstdout: {}",
        stdout_of(&output)
    );
    stderr_of(&output)
}
