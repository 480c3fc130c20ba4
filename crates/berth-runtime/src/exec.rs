//! External process invocation.
//!
//! Everything berth asks of the container runtime goes through a
//! [`CommandRunner`], so the process primitive can be swapped out.

use std::collections::BTreeMap;
use std::process::Stdio;

use async_trait::async_trait;
use berth_common::error::{BerthError, Result};

/// Environment handed to a child process in full.
pub type EnvMap = BTreeMap<String, String>;

/// Output from a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code returned by the command, `-1` if killed by a signal.
    pub exit_code: i32,
}

impl ExecOutput {
    /// Whether the command exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Captured diagnostic text: stderr followed by stdout.
    #[must_use]
    pub fn diagnostics(&self) -> String {
        format!("{}{}", self.stderr, self.stdout)
    }
}

/// Runs external programs to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` and waits for it to exit.
    ///
    /// When `env` is given it replaces the child's environment entirely;
    /// otherwise the child inherits the current one.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned. A non-zero exit
    /// is not an error at this level.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        env: Option<&EnvMap>,
    ) -> Result<ExecOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        env: Option<&EnvMap>,
    ) -> Result<ExecOutput> {
        tracing::debug!(program, ?args, "running command");

        let mut command = tokio::process::Command::new(program);
        let _ = command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(env) = env {
            let _ = command.env_clear().envs(env);
        }

        let output = command.output().await.map_err(|e| BerthError::Io {
            path: program.into(),
            source: e,
        })?;

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_puts_stderr_first() {
        let out = ExecOutput {
            stdout: "out".into(),
            stderr: "err".into(),
            exit_code: 1,
        };
        assert_eq!(out.diagnostics(), "errout");
        assert!(!out.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_captures_output_and_exit_code() {
        let out = ProcessRunner
            .run("sh", &["-c".into(), "echo hi; echo oops >&2; exit 3".into()], None)
            .await
            .expect("spawn sh");
        assert_eq!(out.stdout, "hi\n");
        assert_eq!(out.stderr, "oops\n");
        assert_eq!(out.exit_code, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_replaces_environment() {
        let mut env = EnvMap::new();
        let _ = env.insert("PATH".into(), std::env::var("PATH").unwrap_or_default());
        let _ = env.insert("BERTH_PROBE".into(), "42".into());
        let out = ProcessRunner
            .run("sh", &["-c".into(), "echo ${BERTH_PROBE}-${HOME:-unset}".into()], Some(&env))
            .await
            .expect("spawn sh");
        assert_eq!(out.stdout.trim(), "42-unset");
    }

    #[tokio::test]
    async fn missing_program_is_io_error() {
        let err = ProcessRunner
            .run("berth-definitely-not-a-binary", &[], None)
            .await
            .unwrap_err();
        assert!(matches!(err, BerthError::Io { .. }));
    }
}
