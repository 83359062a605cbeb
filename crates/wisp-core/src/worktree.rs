//! Worktree resolution
//!
//! Given a requested name, exactly one of three paths applies: reuse an
//! existing worktree, attach an existing branch as a new worktree, or create
//! a brand-new branch and worktree. Git does the heavy lifting; this module
//! decides which git operation to issue and applies post-create semantics.

use std::path::{Path, PathBuf};

use crate::error::WispError;
use crate::process::{self, RunOptions};

/// Default worktrees location, relative to the git root
pub const DEFAULT_WORKTREES_DIR: &str = ".wisp/worktrees";

/// One launch's worth of worktree input, built from resolved configuration
/// plus CLI options and consumed once
#[derive(Debug, Clone)]
pub struct WorktreeRequest {
    pub name: String,
    /// Base ref for a brand-new branch; defaults to the repository HEAD
    pub base: Option<String>,
    /// Files copied from the root worktree after create/attach, deduplicated
    pub copy_files: Vec<String>,
    /// Commands run in the new worktree after create/attach; configuration
    /// only, never merged with CLI input
    pub post_create_commands: Vec<String>,
}

impl WorktreeRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: None,
            copy_files: Vec::new(),
            post_create_commands: Vec::new(),
        }
    }
}

/// Merge configured and CLI-supplied copy lists, preserving order and
/// dropping duplicates. A file named twice appears once.
pub fn merge_copy_files(config_files: &[String], cli_files: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for file in config_files.iter().chain(cli_files.iter()) {
        if !merged.contains(file) {
            merged.push(file.clone());
        }
    }
    merged
}

/// How the request was satisfied. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorktreeOutcome {
    /// A worktree with this name already existed; nothing was mutated
    Reused { path: PathBuf },
    /// The branch existed; a worktree was created and bound to it
    Attached { path: PathBuf, warnings: Vec<String> },
    /// Both branch and worktree are new
    Created { path: PathBuf, warnings: Vec<String> },
}

impl WorktreeOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WorktreeOutcome::Reused { path }
            | WorktreeOutcome::Attached { path, .. }
            | WorktreeOutcome::Created { path, .. } => path,
        }
    }

    /// Non-fatal issues collected along the way (file-copy failures)
    pub fn warnings(&self) -> &[String] {
        match self {
            WorktreeOutcome::Reused { .. } => &[],
            WorktreeOutcome::Attached { warnings, .. }
            | WorktreeOutcome::Created { warnings, .. } => warnings,
        }
    }
}

/// Resolve the worktrees directory from config, preference, or default
pub fn worktrees_directory(
    git_root: &Path,
    config_value: Option<&str>,
    preference_value: Option<&str>,
) -> PathBuf {
    let configured = config_value.or(preference_value);
    match configured {
        Some(value) => {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                path
            } else {
                git_root.join(path)
            }
        }
        None => git_root.join(DEFAULT_WORKTREES_DIR),
    }
}

/// Git CLI wrapper for repository and worktree operations
pub struct GitCli<'a> {
    repo_root: &'a Path,
}

impl<'a> GitCli<'a> {
    pub fn new(repo_root: &'a Path) -> Self {
        Self { repo_root }
    }

    /// Locate the repository root from the current directory
    pub fn find_root() -> Result<PathBuf, WispError> {
        let (output, status) = process::run_captured_checked(
            "git",
            &process::args(&["rev-parse", "--show-toplevel"]),
            &RunOptions::default(),
        )?;

        if status.is_err() {
            return Err(WispError::Git(trimmed_stderr(&output.stderr)));
        }
        Ok(PathBuf::from(output.stdout.trim()))
    }

    fn run_git(&self, args: &[&str]) -> Result<String, WispError> {
        let mut full_args = vec!["-C".to_string(), self.repo_root.display().to_string()];
        full_args.extend(process::args(args));

        let (output, status) =
            process::run_captured_checked("git", &full_args, &RunOptions::default())?;

        if status.is_err() {
            return Err(WispError::Git(trimmed_stderr(&output.stderr)));
        }
        Ok(output.stdout)
    }

    /// Whether a local branch exists
    pub fn branch_exists(&self, branch: &str) -> Result<bool, WispError> {
        let mut full_args = vec!["-C".to_string(), self.repo_root.display().to_string()];
        full_args.extend(process::args(&[
            "show-ref",
            "--verify",
            &format!("refs/heads/{}", branch),
        ]));

        let (_, status) =
            process::run_captured_checked("git", &full_args, &RunOptions::default())?;
        Ok(status.is_ok())
    }

    /// Add a worktree bound to an existing branch
    pub fn worktree_add(&self, path: &Path, branch: &str) -> Result<(), WispError> {
        self.run_git(&["worktree", "add", &path.display().to_string(), branch])?;
        Ok(())
    }

    /// Add a worktree on a brand-new branch created from `base`
    pub fn worktree_add_new_branch(
        &self,
        path: &Path,
        branch: &str,
        base: &str,
    ) -> Result<(), WispError> {
        self.run_git(&[
            "worktree",
            "add",
            "-b",
            branch,
            &path.display().to_string(),
            base,
        ])?;
        Ok(())
    }

    /// Read a global git config value
    pub fn config_get_global(key: &str) -> Result<Option<String>, WispError> {
        let (output, status) = process::run_captured_checked(
            "git",
            &process::args(&["config", "--global", "--get", key]),
            &RunOptions::default(),
        )?;

        // Exit code 1 means the key is unset
        match status {
            Ok(_) => Ok(Some(output.stdout.trim_end_matches('\n').to_string())),
            Err(WispError::ProcessExecution { code: 1, .. }) => Ok(None),
            Err(_) => Err(WispError::Git(trimmed_stderr(&output.stderr))),
        }
    }
}

fn trimmed_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "git command failed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Worktree resolution against one repository
pub struct Worktrees {
    git_root: PathBuf,
    worktrees_dir: PathBuf,
}

impl Worktrees {
    pub fn new(git_root: PathBuf, worktrees_dir: PathBuf) -> Self {
        Self {
            git_root,
            worktrees_dir,
        }
    }

    /// Conventional path for a named worktree
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.worktrees_dir.join(name)
    }

    /// Path of an existing worktree, or a not-found error naming it
    pub fn require_existing(&self, name: &str) -> Result<PathBuf, WispError> {
        let path = self.path_for(name);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(WispError::WorktreeNotFound {
                name: name.to_string(),
            })
        }
    }

    /// Decide and execute one of reuse / attach / create.
    ///
    /// Reuse performs no mutation at all. Attach and create copy files
    /// (non-fatal, collected as warnings) and then run post-create commands
    /// (fatal, underlying error surfaced verbatim).
    pub fn resolve(&self, request: &WorktreeRequest) -> Result<WorktreeOutcome, WispError> {
        let path = self.path_for(&request.name);

        // 1. Existing worktree wins; no further action
        if path.is_dir() {
            return Ok(WorktreeOutcome::Reused { path });
        }

        let git = GitCli::new(&self.git_root);

        // 2. Existing branch: attach
        if git.branch_exists(&request.name)? {
            git.worktree_add(&path, &request.name)?;
            let warnings = self.copy_files(&request.copy_files, &path);
            self.run_post_create(&request.post_create_commands, &path)?;
            return Ok(WorktreeOutcome::Attached { path, warnings });
        }

        // 3. Brand-new branch and worktree
        let base = request.base.as_deref().unwrap_or("HEAD");
        git.worktree_add_new_branch(&path, &request.name, base)?;
        let warnings = self.copy_files(&request.copy_files, &path);
        self.run_post_create(&request.post_create_commands, &path)?;
        Ok(WorktreeOutcome::Created { path, warnings })
    }

    fn copy_files(&self, files: &[String], worktree_path: &Path) -> Vec<String> {
        let mut warnings = Vec::new();
        for file in files {
            let source = self.git_root.join(file);
            let target = worktree_path.join(file);
            let result = (|| -> std::io::Result<()> {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(&source, &target)?;
                Ok(())
            })();
            if let Err(e) = result {
                warnings.push(format!("failed to copy {}: {}", file, e));
            }
        }
        warnings
    }

    fn run_post_create(&self, commands: &[String], worktree_path: &Path) -> Result<(), WispError> {
        for command in commands {
            let options = RunOptions {
                cwd: Some(worktree_path.to_path_buf()),
                env: Vec::new(),
                interactive: true,
            };
            let result = process::run("sh", &process::args(&["-c", command]), &options);
            // Name the failing command, not the shell wrapping it
            if let Err(WispError::ProcessExecution { code, .. }) = result {
                return Err(WispError::ProcessExecution {
                    command: command.clone(),
                    code,
                });
            }
            result?;
        }
        Ok(())
    }
}
