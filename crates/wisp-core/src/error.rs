//! Error types for wisp operations

use thiserror::Error;

/// Core error type for wisp operations
#[derive(Error, Debug)]
pub enum WispError {
    // === Validation errors ===
    /// Malformed or contradictory invocation
    #[error("{0}")]
    Validation(String),

    // === Not-found errors ===
    /// Named worktree does not exist
    #[error("worktree not found: {name}")]
    WorktreeNotFound { name: String },

    /// Named branch does not exist
    #[error("branch not found: {name}")]
    BranchNotFound { name: String },

    // === Process errors ===
    /// Executable could not be spawned (not found, permission denied)
    #[error("failed to spawn '{command}': {reason}")]
    ProcessSpawn { command: String, reason: String },

    /// Child process was terminated by a signal
    #[error("'{command}' terminated by signal {signal}")]
    ProcessSignal { command: String, signal: i32 },

    /// Child process exited with a nonzero code
    #[error("'{command}' exited with code {code}")]
    ProcessExecution { command: String, code: i32 },

    // === External tool errors ===
    /// Git command failed; message is the underlying stderr, verbatim
    #[error("git error: {0}")]
    Git(String),

    /// Terminal could not be detected or spawned
    #[error("{0}")]
    Terminal(String),

    // === Layout errors ===
    /// An authoritative layout source (CLI flag, project config) named a
    /// file that does not exist
    #[error("layout file not found: {path}{guidance}")]
    LayoutNotFound { path: String, guidance: String },

    // === Configuration errors ===
    /// Configuration file exists but could not be parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// Preferences could not be read or written
    #[error("preferences error: {0}")]
    Preferences(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WispError {
    /// Map this error to a process exit code.
    ///
    /// 2 = validation, 3 = not-found, 1 = everything else. Scripts wrapping
    /// wisp branch on these classes.
    pub fn exit_code(&self) -> i32 {
        match self {
            WispError::Validation(_) => 2,

            WispError::WorktreeNotFound { .. } | WispError::BranchNotFound { .. } => 3,

            WispError::ProcessSpawn { .. }
            | WispError::ProcessSignal { .. }
            | WispError::ProcessExecution { .. }
            | WispError::Git(_)
            | WispError::Terminal(_)
            | WispError::LayoutNotFound { .. }
            | WispError::Config(_)
            | WispError::Preferences(_)
            | WispError::Io(_) => 1,
        }
    }

    /// Exit code carried by the failed child, when there is one.
    ///
    /// Lets callers propagate the underlying command's exit code instead of
    /// the general-error class.
    pub fn child_exit_code(&self) -> Option<i32> {
        match self {
            WispError::ProcessExecution { code, .. } => Some(*code),
            _ => None,
        }
    }
}
