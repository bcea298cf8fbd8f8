//! Shared integration-test harness for running the `keepsake` binary.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};

/// Default timeout for reading a single line from a streaming process.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A `keepsake` process, either run to completion or streamed.
pub struct KeepsakeProcess {
    child: Child,
    reader: BufReader<ChildStdout>,
}

impl KeepsakeProcess {
    /// Runs `keepsake <args>` to completion and returns its output.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        Self::spawn_command_with_env(args, &[])
    }

    /// Like [`spawn_command`](Self::spawn_command) with extra environment.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
        std::process::Command::new(env!("CARGO_BIN_EXE_keepsake"))
            .args(args)
            .envs(env.iter().copied())
            .env_remove("KEEPSAKE_CONFIG")
            .env_remove("KEEPSAKE_SHARE_ORIGIN")
            .env_remove("KEEPSAKE_METRICS_PORT")
            .stdin(Stdio::null())
            .output()
            .expect("failed to run keepsake")
    }

    /// Spawns a long-running `keepsake <args>` with stdout piped.
    ///
    /// The child is killed on drop.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_streaming(args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_keepsake"))
            .args(args)
            .env_remove("KEEPSAKE_CONFIG")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn keepsake");

        let stdout = child.stdout.take().expect("stdout not captured");
        Self {
            child,
            reader: BufReader::new(stdout),
        }
    }

    /// Reads the next non-empty stdout line as JSON, or `None` at EOF.
    #[allow(clippy::missing_panics_doc)]
    pub async fn read_json_line(&mut self) -> Option<Value> {
        let mut line = String::new();
        tokio::time::timeout(DEFAULT_TIMEOUT, async {
            loop {
                line.clear();
                let n = self
                    .reader
                    .read_line(&mut line)
                    .await
                    .expect("read_line I/O error");
                if n == 0 {
                    return None;
                }
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    return Some(
                        serde_json::from_str::<Value>(trimmed)
                            .unwrap_or_else(|e| panic!("invalid JSON: {e}\nline: {line}")),
                    );
                }
            }
        })
        .await
        .expect("timed out waiting for output")
    }

    /// Waits for the process to exit and returns its exit code.
    #[allow(clippy::missing_panics_doc)]
    pub async fn wait(mut self) -> Option<i32> {
        tokio::time::timeout(DEFAULT_TIMEOUT, self.child.wait())
            .await
            .expect("timed out waiting for exit")
            .expect("wait failed")
            .code()
    }

    /// Path of a file under `tests/fixtures`.
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }
}

/// Stdout of `output` as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of `output` as a string.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
