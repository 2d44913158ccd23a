//! Subprocess execution contract and its tokio-backed implementation.
//!
//! The staging engine never spawns processes directly; it goes through
//! [`ProcessRunner`] so tests can substitute a scripted fake. The contract
//! is deliberately small: run a command, suspend until it exits, hand back
//! exit code and both output streams in full.

use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Everything needed to launch one subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable name or path
    pub program: String,
    /// Arguments, excluding the program itself
    pub args: Vec<String>,
    /// Working directory for the child
    pub cwd: PathBuf,
    /// Extra environment variables for the child
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// A git invocation rooted at `repo`.
    #[must_use]
    pub fn git(repo: &Path, args: &[&str]) -> Self {
        Self {
            program: "git".to_string(),
            args: args.iter().map(|a| (*a).to_string()).collect(),
            cwd: repo.to_path_buf(),
            env: Vec::new(),
        }
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code; -1 when the process was killed by a signal
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the process exited with code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout decoded leniently; git listings are UTF-8 in practice and a
    /// rare bad byte must not abort a whole fetch.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Stderr decoded leniently and trimmed, the shape surfaced in errors.
    #[must_use]
    pub fn stderr_trimmed(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Asynchronous "run a command, capture everything" primitive.
///
/// Implementations must drain stdout and stderr continuously while the
/// child runs; git can emit diffs larger than a pipe buffer, and a runner
/// that waits for exit before reading would deadlock. That requirement is
/// part of the contract, not an optimization.
pub trait ProcessRunner: Send + Sync {
    /// Launch the command and suspend until it exits.
    fn run(&self, spec: CommandSpec) -> impl Future<Output = io::Result<CommandOutput>> + Send;
}

/// [`ProcessRunner`] backed by [`tokio::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, spec: CommandSpec) -> io::Result<CommandOutput> {
        debug!(program = %spec.program, args = ?spec.args, cwd = %spec.cwd.display(), "spawning");

        // `output()` reads both pipes concurrently while awaiting exit, so
        // large diffs cannot fill a pipe buffer and stall the child.
        let output = tokio::process::Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.cwd)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .output()
            .await?;

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
