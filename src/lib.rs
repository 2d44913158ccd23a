//! Hunk-level git staging engine.
//!
//! This crate is the diff/patch core of a repository-management dashboard:
//! it parses the unified-diff text `git diff` emits into a structured hunk
//! model, synthesizes diffs for files git has no baseline for (untracked
//! and brand-new files), projects per-line old/new line numbers for
//! display, and rebuilds minimal single-hunk patches that are fed back to
//! `git apply` to stage, unstage, or discard one hunk at a time.
//!
//! Everything that mutates the repository goes through git itself; the
//! in-memory model is a read-only snapshot, and callers observe state
//! transitions by re-fetching status and diffs.

use std::path::{Path, PathBuf};

use error_set::error_set;
use tracing::debug;

pub mod diff;
pub mod patch;
pub mod process;
pub mod status;

pub use diff::{DiffHunk, DiffLine, FileDiff, LineKind, LineNumbers};
pub use patch::build_patch;
pub use process::{CommandOutput, CommandSpec, ProcessRunner, SystemProcessRunner};
pub use status::{FileChange, FileChangeStatus};

error_set! {
    /// Top-level error for staging operations.
    ///
    /// Parse-level problems (malformed status lines, unknown codes, broken
    /// hunk headers) never surface here; they degrade the parsed result
    /// instead. What does surface is git rejecting a command and direct
    /// filesystem access failing, as distinct kinds so callers can offer
    /// different recovery paths.
    StagingError := {
        #[display("git {operation} failed: {detail}")]
        CommandFailed { operation: String, detail: String },
    } || FilesystemError

    /// Errors from direct filesystem access: deleting an untracked file or
    /// reading content for a synthetic diff.
    FilesystemError := {
        #[display("filesystem operation on {path} failed: {detail}")]
        FilesystemFailed { path: String, detail: String },
    }
}

/// Staged and unstaged listings for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// Index-to-HEAD changes (`git diff --cached --name-status`)
    pub staged: Vec<FileChange>,
    /// Working-tree changes plus untracked files
    pub unstaged: Vec<FileChange>,
}

/// Orchestrator for fetching status/diffs and staging, unstaging, or
/// discarding changes, whole-file or one hunk at a time.
///
/// All subprocess work goes through the injected [`ProcessRunner`], so the
/// engine can be driven against a fake in tests. Read queries are safe to
/// issue concurrently; mutations must be issued one at a time per
/// repository by the caller, since concurrent writers race on git's index
/// at the git layer itself.
pub struct StagingEngine<R: ProcessRunner> {
    repo_path: PathBuf,
    runner: R,
}

impl StagingEngine<SystemProcessRunner> {
    /// Engine over a repository using the real system `git`.
    pub fn open(repo_path: impl Into<PathBuf>) -> Self {
        Self::with_runner(repo_path, SystemProcessRunner)
    }
}

impl<R: ProcessRunner> StagingEngine<R> {
    /// Engine over a repository with an explicit process runner.
    pub fn with_runner(repo_path: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            repo_path: repo_path.into(),
            runner,
        }
    }

    /// The repository this engine operates on.
    #[must_use]
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Fetch staged and unstaged listings.
    ///
    /// The two queries touch disjoint git state (index vs. working tree),
    /// so they are issued concurrently and awaited together; neither
    /// result depends on the other.
    pub async fn status(&self) -> Result<RepoStatus, StagingError> {
        let (staged, unstaged) = tokio::join!(self.staged_changes(), self.unstaged_changes());
        Ok(RepoStatus {
            staged: staged?,
            unstaged: unstaged?,
        })
    }

    /// Changes already in the index, sorted by path.
    pub async fn staged_changes(&self) -> Result<Vec<FileChange>, StagingError> {
        let output = self
            .git("diff --cached", &["diff", "--cached", "--name-status"])
            .await?;
        Ok(status::parse_name_status(&output.stdout_lossy()))
    }

    /// Working-tree changes plus untracked files, sorted by path.
    pub async fn unstaged_changes(&self) -> Result<Vec<FileChange>, StagingError> {
        let tracked = self.git("diff", &["diff", "--name-status"]).await?;
        let untracked = self
            .git(
                "ls-files",
                &["ls-files", "--others", "--exclude-standard"],
            )
            .await?;

        let mut changes = status::parse_name_status(&tracked.stdout_lossy());
        changes.extend(status::parse_untracked(&untracked.stdout_lossy()));
        changes.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(changes)
    }

    /// Fetch the diff for one file.
    ///
    /// Untracked files, and added files viewed on the staged side, have no
    /// baseline worth diffing against: their diff is synthesized from the
    /// file's current content instead of asking git. Content that is not
    /// valid UTF-8 is reported as binary. Every other status asks git,
    /// with `--cached` when viewing the staged side.
    pub async fn diff(&self, change: &FileChange, staged: bool) -> Result<FileDiff, StagingError> {
        let synthetic = change.status == FileChangeStatus::Untracked
            || (staged && change.status == FileChangeStatus::Added);
        if synthetic {
            return self.synthetic_diff(change).await;
        }

        // Force a plain textual diff; external diff tools and color codes
        // would corrupt the hunk parse.
        let mut args = vec!["diff", "--no-ext-diff", "--no-color"];
        if staged {
            args.push("--cached");
        }
        args.extend(["--", change.path.as_str()]);
        let output = self.git("diff", &args).await?;

        match String::from_utf8(output.stdout) {
            Ok(text) => Ok(FileDiff::parse(&text, change.clone())),
            Err(_) => Ok(FileDiff::binary(change.clone())),
        }
    }

    /// Stage whole files: `git add -- <paths>`.
    pub async fn stage_files(&self, paths: &[&str]) -> Result<(), StagingError> {
        let mut args = vec!["add", "--"];
        args.extend(paths);
        self.git("add", &args).await?;
        Ok(())
    }

    /// Unstage whole files: `git reset HEAD -- <paths>`.
    pub async fn unstage_files(&self, paths: &[&str]) -> Result<(), StagingError> {
        let mut args = vec!["reset", "HEAD", "--"];
        args.extend(paths);
        self.git("reset", &args).await?;
        Ok(())
    }

    /// Stage a single hunk: `git apply --cached <patch>`.
    pub async fn stage_hunk(
        &self,
        change: &FileChange,
        hunk: &DiffHunk,
    ) -> Result<(), StagingError> {
        self.apply_hunk("apply --cached", change, hunk, &["--cached"])
            .await
    }

    /// Unstage a single hunk: `git apply --cached --reverse <patch>`.
    pub async fn unstage_hunk(
        &self,
        change: &FileChange,
        hunk: &DiffHunk,
    ) -> Result<(), StagingError> {
        self.apply_hunk(
            "apply --cached --reverse",
            change,
            hunk,
            &["--cached", "--reverse"],
        )
        .await
    }

    /// Discard a single hunk from the working tree: `git apply -R <patch>`.
    pub async fn discard_hunk(
        &self,
        change: &FileChange,
        hunk: &DiffHunk,
    ) -> Result<(), StagingError> {
        self.apply_hunk("apply -R", change, hunk, &["-R"]).await
    }

    /// Discard a whole file's working-tree changes.
    ///
    /// Tracked files are restored from HEAD; untracked files are deleted,
    /// since there is nothing to restore them to.
    pub async fn discard_file(&self, change: &FileChange) -> Result<(), StagingError> {
        if change.status == FileChangeStatus::Untracked {
            return self.delete_untracked(&change.path).await;
        }
        self.git("checkout", &["checkout", "HEAD", "--", change.path.as_str()])
            .await?;
        Ok(())
    }

    /// Delete an untracked file from the working tree.
    pub async fn delete_untracked(&self, path: &str) -> Result<(), StagingError> {
        debug!(path, "deleting untracked file");
        tokio::fs::remove_file(self.repo_path.join(path))
            .await
            .map_err(|e| StagingError::FilesystemFailed {
                path: path.to_string(),
                detail: e.to_string(),
            })
    }

    async fn synthetic_diff(&self, change: &FileChange) -> Result<FileDiff, StagingError> {
        let absolute = self.repo_path.join(&change.path);
        let bytes =
            tokio::fs::read(&absolute)
                .await
                .map_err(|e| StagingError::FilesystemFailed {
                    path: change.path.clone(),
                    detail: e.to_string(),
                })?;

        Ok(match String::from_utf8(bytes) {
            Ok(content) => FileDiff::synthesize_added(&content, change.clone()),
            Err(_) => FileDiff::binary(change.clone()),
        })
    }

    /// Write the hunk's patch to a uniquely-named temp file and hand it to
    /// `git apply`.
    ///
    /// The temp file is owned by a guard that deletes it on every exit
    /// path, success or failure, so concurrent operations across
    /// repositories and retries never collide or leak.
    async fn apply_hunk(
        &self,
        operation: &str,
        change: &FileChange,
        hunk: &DiffHunk,
        flags: &[&str],
    ) -> Result<(), StagingError> {
        use std::io::Write;

        let patch = patch::build_patch(&change.path, hunk);
        debug!(path = %change.path, header = %hunk.header, operation, "applying hunk patch");

        let mut file = tempfile::Builder::new()
            .prefix("git-staging-")
            .suffix(".patch")
            .tempfile()
            .map_err(|e| StagingError::FilesystemFailed {
                path: change.path.clone(),
                detail: e.to_string(),
            })?;
        file.write_all(patch.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| StagingError::FilesystemFailed {
                path: change.path.clone(),
                detail: e.to_string(),
            })?;

        let patch_path = file.path().to_string_lossy().into_owned();
        let mut args = vec!["apply"];
        args.extend(flags);
        args.push(&patch_path);

        self.git(operation, &args).await?;
        Ok(())
    }

    /// Run git, mapping spawn failures and nonzero exits to
    /// [`StagingError::CommandFailed`] with the trimmed stderr as detail.
    async fn git(&self, operation: &str, args: &[&str]) -> Result<CommandOutput, StagingError> {
        let spec = CommandSpec::git(&self.repo_path, args);
        let output =
            self.runner
                .run(spec)
                .await
                .map_err(|e| StagingError::CommandFailed {
                    operation: operation.to_string(),
                    detail: e.to_string(),
                })?;

        if !output.success() {
            return Err(StagingError::CommandFailed {
                operation: operation.to_string(),
                detail: output.stderr_trimmed(),
            });
        }
        Ok(output)
    }
}
