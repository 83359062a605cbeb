//! CLI command implementations

pub mod agent;
pub mod attach;
pub mod launch;
pub mod preferences;
pub mod zellij;

pub use agent::run_agent;
pub use attach::run_attach;
pub use launch::run_launch;
pub use preferences::{run_preferences_get, run_preferences_remove, run_preferences_set};
pub use zellij::{run_zellij_init, run_zellij_list};

use std::path::PathBuf;

use wisp_core::config::{self, ProjectConfig, ZellijConfig};
use wisp_core::error::WispError;
use wisp_core::preferences::{self as core_preferences, Preferences};
use wisp_core::worktree::{self, GitCli, Worktrees};

/// Default agent when neither config nor preference names one
const DEFAULT_AGENT: &str = "claude";

/// Everything a command needs about the surrounding repository: git root,
/// project config, and operator preferences, loaded once.
pub struct ProjectContext {
    pub git_root: PathBuf,
    pub config: Option<ProjectConfig>,
    pub preferences: Preferences,
}

impl ProjectContext {
    pub fn load() -> Result<Self, WispError> {
        let git_root = GitCli::find_root()?;
        let config = config::load_project_config(&git_root)?;
        let preferences = core_preferences::load_preferences()?;
        Ok(Self {
            git_root,
            config,
            preferences,
        })
    }

    pub fn zellij_config(&self) -> Option<&ZellijConfig> {
        self.config.as_ref().and_then(|c| c.zellij.as_ref())
    }

    /// Worktree resolver rooted at this repository's worktrees directory
    pub fn worktrees(&self) -> Worktrees {
        let dir = worktree::worktrees_directory(
            &self.git_root,
            self.config
                .as_ref()
                .and_then(|c| c.worktrees_directory.as_deref()),
            self.preferences.worktrees_directory.as_deref(),
        );
        Worktrees::new(self.git_root.clone(), dir)
    }

    /// Copy list and post-create commands from the project config
    pub fn post_create(&self) -> (Vec<String>, Vec<String>) {
        let post_create = self.config.as_ref().and_then(|c| c.post_create.as_ref());
        (
            post_create
                .and_then(|p| p.copy_files.clone())
                .unwrap_or_default(),
            post_create
                .and_then(|p| p.commands.clone())
                .unwrap_or_default(),
        )
    }

    /// Agent command and args: project config first, then the `agent`
    /// preference (whitespace-split), then the default.
    pub fn agent_invocation(&self) -> (String, Vec<String>) {
        self.configured_agent()
            .unwrap_or_else(|_| (DEFAULT_AGENT.to_string(), Vec::new()))
    }

    /// Like [`agent_invocation`](Self::agent_invocation) but without the
    /// default: `wisp agent` requires an explicit configuration.
    pub fn configured_agent(&self) -> Result<(String, Vec<String>), WispError> {
        if let Some(agent) = self.zellij_config().and_then(|z| z.agent.as_ref()) {
            if let Some(command) = agent.command.as_deref() {
                return Ok((
                    command.to_string(),
                    agent.args.clone().unwrap_or_default(),
                ));
            }
        }

        if let Some(preference) = self.preferences.agent.as_deref() {
            let mut parts = preference.split_whitespace();
            if let Some(command) = parts.next() {
                return Ok((
                    command.to_string(),
                    parts.map(|s| s.to_string()).collect(),
                ));
            }
        }

        Err(WispError::Validation(
            "no agent is configured; run 'wisp preferences set agent <command>' first".to_string(),
        ))
    }

    /// Session name: `<project>-<worktree>` with slashes flattened
    pub fn session_name(&self, worktree_name: &str) -> String {
        let project = self
            .git_root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "wisp".to_string());
        format!("{}-{}", project, worktree_name.replace('/', "-"))
    }
}
