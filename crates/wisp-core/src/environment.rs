//! Process environment snapshot
//!
//! The orchestrator's decisions (inline tab vs fresh session, detach rules,
//! which shell to run) depend on where the invocation is happening. Everything
//! is read once into a plain struct so the decision logic stays testable.

/// Where this invocation is running
#[derive(Debug, Clone, Default)]
pub struct LaunchEnv {
    /// Inside a zellij session (`ZELLIJ` is set)
    pub inside_zellij: bool,
    /// Inside a tmux session (`TMUX` is set)
    pub inside_tmux: bool,
    /// Over an SSH connection
    pub ssh: bool,
    /// The operator's shell, for pane/window commands
    pub shell: Option<String>,
}

impl LaunchEnv {
    pub fn from_environment() -> Self {
        Self {
            inside_zellij: std::env::var_os("ZELLIJ").is_some(),
            inside_tmux: std::env::var_os("TMUX").is_some(),
            ssh: std::env::var_os("SSH_CONNECTION").is_some()
                || std::env::var_os("SSH_CLIENT").is_some()
                || std::env::var_os("SSH_TTY").is_some(),
            shell: std::env::var("SHELL").ok(),
        }
    }

    /// Shell to run in new panes and windows, `/bin/sh` if unset
    pub fn shell_or_default(&self) -> &str {
        self.shell.as_deref().unwrap_or("/bin/sh")
    }
}
