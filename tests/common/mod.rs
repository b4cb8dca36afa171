//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runfiles-related variables stripped so tests never see the host's Bazel.
const RUNFILES_VARS: [&str; 3] = ["RUNFILES_MANIFEST_FILE", "RUNFILES_DIR", "TEST_SRCDIR"];

/// Build a `ray-coverage` command with a clean logging/runfiles environment.
pub fn ray_coverage() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_ray-coverage"));
    command.env_remove("RUST_LOG");
    command.env_remove("RAY_COVERAGE_BAZEL");
    command.env_remove("RAY_COVERAGE_AWS");
    for var in RUNFILES_VARS {
        command.env_remove(var);
    }
    command
}

/// Repository root the binary falls back to when runfiles miss.
#[allow(dead_code)]
pub fn legacy_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .take(3)
        .last()
        .expect("manifest dir has ancestors")
        .to_path_buf()
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Directory of fake `bazel`/`coverage`/`aws` scripts placed first on PATH.
///
/// Each script appends its argv (one argument per line, then `--`) to
/// `<dir>/<name>.calls`.
#[cfg(unix)]
#[allow(dead_code)]
pub struct FakeTools {
    pub dir: TempDir,
}

#[cfg(unix)]
#[allow(dead_code)]
impl FakeTools {
    pub fn create() -> Self {
        let dir = tempfile::tempdir().expect("create fake tools dir");
        Self { dir }
    }

    /// Install a script named `name` that records its args then runs `body`.
    pub fn install(&self, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let log = self.calls_path(name);
        let script = format!(
            "#!/bin/sh\nfor arg in \"$@\"; do printf '%s\\n' \"$arg\" >> '{log}'; done\nprintf '%s\\n' '--' >> '{log}'\n{body}\n",
            log = log.display()
        );
        let path = self.dir.path().join(name);
        std::fs::write(&path, script).expect("write fake tool");
        let mut perms = std::fs::metadata(&path).expect("stat fake tool").permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("chmod fake tool");
    }

    pub fn calls_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(format!("{name}.calls"))
    }

    /// Recorded invocations, each as a list of arguments.
    pub fn calls(&self, name: &str) -> Vec<Vec<String>> {
        let Ok(text) = std::fs::read_to_string(self.calls_path(name)) else {
            return Vec::new();
        };
        let mut calls = Vec::new();
        let mut current = Vec::new();
        for line in text.lines() {
            if line == "--" {
                calls.push(std::mem::take(&mut current));
            } else {
                current.push(line.to_string());
            }
        }
        calls
    }

    /// PATH with the fake tools directory first.
    pub fn path_env(&self) -> std::ffi::OsString {
        let mut dirs = vec![self.dir.path().to_path_buf()];
        if let Some(existing) = std::env::var_os("PATH") {
            dirs.extend(std::env::split_paths(&existing));
        }
        std::env::join_paths(dirs).expect("join PATH")
    }
}
