//! Project and global configuration
//!
//! The project config (`wisp.config.json` at the repository root) is
//! authoritative and versioned with the project; the global config
//! (`~/.config/wisp/config.json`) is advisory. Both are plain camelCase JSON.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::WispError;

/// Project configuration file name, looked up at the git root
pub const PROJECT_CONFIG_FILE: &str = "wisp.config.json";

/// Global configuration file name under [`global_config_dir`]
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Project configuration (`wisp.config.json`)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default)]
    pub post_create: Option<PostCreateConfig>,
    #[serde(default)]
    pub worktrees_directory: Option<String>,
    #[serde(default)]
    pub zellij: Option<ZellijConfig>,
}

/// Files to copy and commands to run after a worktree is created or attached
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostCreateConfig {
    #[serde(default)]
    pub copy_files: Option<Vec<String>>,
    #[serde(default)]
    pub commands: Option<Vec<String>>,
}

/// Zellij-specific project settings
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ZellijConfig {
    /// Layout path, or the reserved literals "builtin" / "global"
    #[serde(default)]
    pub layout: Option<String>,
    #[serde(default)]
    pub agent: Option<AgentConfig>,
}

/// AI agent command run in the generated layout's agent pane
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
}

/// Global configuration (`~/.config/wisp/config.json`)
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default)]
    pub zellij: Option<GlobalZellijConfig>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GlobalZellijConfig {
    #[serde(default)]
    pub layout: Option<String>,
}

/// Load the project config from the git root.
///
/// A missing file is `None`, which is meaningful downstream: the layout
/// resolver prompts for setup only when no project config exists at all.
/// An unparseable file is an error, never silently ignored.
pub fn load_project_config(git_root: &Path) -> Result<Option<ProjectConfig>, WispError> {
    let path = git_root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let config: ProjectConfig = serde_json::from_str(&content)
        .map_err(|e| WispError::Config(format!("invalid {}: {}", PROJECT_CONFIG_FILE, e)))?;
    Ok(Some(config))
}

/// Directory holding the global config, `~/.config/wisp`
pub fn global_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("wisp"))
}

/// Load the global config from an explicit directory.
///
/// Global config is advisory: missing or unreadable files yield `None`
/// rather than an error.
pub fn load_global_config_from(config_dir: &Path) -> Option<GlobalConfig> {
    let path = config_dir.join(GLOBAL_CONFIG_FILE);
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Load the global config from `~/.config/wisp/config.json`
pub fn load_global_config() -> Option<GlobalConfig> {
    load_global_config_from(&global_config_dir()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_load_project_config_missing_is_none() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = load_project_config(temp.path()).expect("load should succeed");
        assert!(config.is_none());
    }

    #[test]
    fn test_load_project_config_full() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join(PROJECT_CONFIG_FILE),
            r#"{
                "postCreate": {
                    "copyFiles": [".env", "config/local.json"],
                    "commands": ["pnpm install"]
                },
                "worktreesDirectory": ".worktrees",
                "zellij": {
                    "layout": ".zellij/dev.kdl",
                    "agent": { "command": "claude", "args": ["--model", "opus"] }
                }
            }"#,
        )
        .expect("write config");

        let config = load_project_config(temp.path())
            .expect("load should succeed")
            .expect("config should exist");

        let post_create = config.post_create.expect("postCreate");
        assert_eq!(
            post_create.copy_files.as_deref(),
            Some(&[".env".to_string(), "config/local.json".to_string()][..])
        );
        assert_eq!(
            post_create.commands.as_deref(),
            Some(&["pnpm install".to_string()][..])
        );
        assert_eq!(config.worktrees_directory.as_deref(), Some(".worktrees"));

        let zellij = config.zellij.expect("zellij");
        assert_eq!(zellij.layout.as_deref(), Some(".zellij/dev.kdl"));
        let agent = zellij.agent.expect("agent");
        assert_eq!(agent.command.as_deref(), Some("claude"));
        assert_eq!(
            agent.args.as_deref(),
            Some(&["--model".to_string(), "opus".to_string()][..])
        );
    }

    #[test]
    fn test_load_project_config_invalid_json_is_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(PROJECT_CONFIG_FILE), "{ not json")
            .expect("write config");

        let result = load_project_config(temp.path());
        assert!(matches!(result, Err(WispError::Config(_))));
    }

    #[test]
    fn test_load_project_config_empty_object() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(PROJECT_CONFIG_FILE), "{}").expect("write config");

        let config = load_project_config(temp.path())
            .expect("load should succeed")
            .expect("config should exist");
        assert!(config.post_create.is_none());
        assert!(config.zellij.is_none());
    }

    #[test]
    fn test_load_global_config_advisory() {
        let temp = tempfile::tempdir().expect("tempdir");

        // Missing file is None, not an error
        assert!(load_global_config_from(temp.path()).is_none());

        // Invalid JSON is also None: global config must never block
        fs::write(temp.path().join(GLOBAL_CONFIG_FILE), "not json").expect("write");
        assert!(load_global_config_from(temp.path()).is_none());

        fs::write(
            temp.path().join(GLOBAL_CONFIG_FILE),
            r#"{"zellij": {"layout": "~/layouts/mine.kdl"}}"#,
        )
        .expect("write");
        let config = load_global_config_from(temp.path()).expect("config should parse");
        assert_eq!(
            config.zellij.expect("zellij").layout.as_deref(),
            Some("~/layouts/mine.kdl")
        );
    }
}
