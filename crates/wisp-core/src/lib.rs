//! wisp-core: Core library for worktree and multiplexer session management
//!
//! This crate provides the foundational types and logic for the wisp CLI.

/// Core error types for wisp operations
pub mod error;

/// External process execution
pub mod process;

/// Process environment snapshot
pub mod environment;

/// Project and global configuration files
pub mod config;

/// Operator preferences in global git config
pub mod preferences;

/// Zellij session probing, creation, and pane placement
pub mod zellij;

/// Tmux window and pane placement
pub mod tmux;

/// Layout resolution and persisted layout authoring
pub mod layout;

/// Temporary layout generation
pub mod temp_layout;

/// Worktree resolution against a git repository
pub mod worktree;

/// Terminal emulator spawning for detached launches
pub mod terminal;

// Re-exports for convenience
pub use config::{load_global_config, load_project_config, GlobalConfig, ProjectConfig};
pub use environment::LaunchEnv;
pub use error::WispError;
pub use layout::{LayoutResolution, LayoutResolver, LayoutSource, SetupChoice, SetupPrompt};
pub use temp_layout::{LayoutHandle, TemporaryLayoutOptions};
pub use worktree::{GitCli, WorktreeOutcome, WorktreeRequest, Worktrees};
pub use zellij::{Placement, SessionAction, SessionStatus};
