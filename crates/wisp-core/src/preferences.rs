//! Operator preferences stored in global git config
//!
//! Preferences live under the `wisp.*` namespace of `git config --global`,
//! so they follow the operator across machines the same way their git
//! identity does. Only a fixed set of keys is recognized.

use crate::error::WispError;
use crate::process::{self, RunOptions};
use crate::worktree::GitCli;

/// Recognized preference keys (the part after `wisp.`)
pub const SUPPORTED_KEYS: &[&str] = &["agent", "terminal", "editor", "worktreesDirectory"];

/// All `wisp.*` preferences read in one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub agent: Option<String>,
    pub terminal: Option<String>,
    pub editor: Option<String>,
    pub worktrees_directory: Option<String>,
}

/// Reject keys outside the supported set
pub fn validate_key(key: &str) -> Result<(), WispError> {
    if SUPPORTED_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(WispError::Validation(format!(
            "unknown preference key '{}' (supported: {})",
            key,
            SUPPORTED_KEYS.join(", ")
        )))
    }
}

/// Parse null-separated `git config --null --get-regexp` output.
///
/// Each entry is `wisp.<key>\n<value>` terminated by a NUL byte; values may
/// themselves contain newlines.
pub fn parse_preferences(raw: &str) -> Preferences {
    let mut prefs = Preferences::default();

    for entry in raw.split('\0') {
        let Some((key, value)) = entry.split_once('\n') else {
            continue;
        };
        let Some(name) = key.strip_prefix("wisp.") else {
            continue;
        };
        match name {
            "agent" => prefs.agent = Some(value.to_string()),
            "terminal" => prefs.terminal = Some(value.to_string()),
            "editor" => prefs.editor = Some(value.to_string()),
            "worktreesDirectory" => prefs.worktrees_directory = Some(value.to_string()),
            _ => {}
        }
    }

    prefs
}

/// Load all preferences. Absent keys are `None`; an absent namespace is the
/// default struct, not an error.
pub fn load_preferences() -> Result<Preferences, WispError> {
    let (output, status) = process::run_captured_checked(
        "git",
        &process::args(&[
            "config",
            "--global",
            "--null",
            "--get-regexp",
            r"^wisp\.",
        ]),
        &RunOptions::default(),
    )?;

    // Exit code 1 means no matching keys
    match status {
        Ok(_) => Ok(parse_preferences(&output.stdout)),
        Err(WispError::ProcessExecution { code: 1, .. }) => Ok(Preferences::default()),
        Err(e) => Err(e),
    }
}

/// Read a single preference
pub fn get_preference(key: &str) -> Result<Option<String>, WispError> {
    validate_key(key)?;
    GitCli::config_get_global(&format!("wisp.{}", key))
}

/// Set a single preference
pub fn set_preference(key: &str, value: &str) -> Result<(), WispError> {
    validate_key(key)?;
    let full_key = format!("wisp.{}", key);
    let (output, status) = process::run_captured_checked(
        "git",
        &process::args(&["config", "--global", &full_key, value]),
        &RunOptions::default(),
    )?;
    if status.is_err() {
        return Err(WispError::Preferences(format!(
            "failed to set {}: {}",
            full_key,
            output.stderr.trim()
        )));
    }
    Ok(())
}

/// Remove a single preference. Removing an unset key is a no-op.
pub fn remove_preference(key: &str) -> Result<(), WispError> {
    validate_key(key)?;
    let full_key = format!("wisp.{}", key);
    let (output, status) = process::run_captured_checked(
        "git",
        &process::args(&["config", "--global", "--unset", &full_key]),
        &RunOptions::default(),
    )?;
    match status {
        Ok(_) => Ok(()),
        // Exit code 5 means the key did not exist
        Err(WispError::ProcessExecution { code: 5, .. }) => Ok(()),
        Err(_) => Err(WispError::Preferences(format!(
            "failed to remove {}: {}",
            full_key,
            output.stderr.trim()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key_supported() {
        for key in SUPPORTED_KEYS {
            assert!(validate_key(key).is_ok());
        }
    }

    #[test]
    fn test_validate_key_rejects_unknown() {
        let err = validate_key("colour").unwrap_err();
        assert!(matches!(err, WispError::Validation(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_parse_preferences_full() {
        let raw = "wisp.agent\nclaude\0wisp.terminal\nghostty\0wisp.editor\nnvim\0wisp.worktreesDirectory\n/work/trees\0";
        let prefs = parse_preferences(raw);
        assert_eq!(prefs.agent.as_deref(), Some("claude"));
        assert_eq!(prefs.terminal.as_deref(), Some("ghostty"));
        assert_eq!(prefs.editor.as_deref(), Some("nvim"));
        assert_eq!(prefs.worktrees_directory.as_deref(), Some("/work/trees"));
    }

    #[test]
    fn test_parse_preferences_empty() {
        assert_eq!(parse_preferences(""), Preferences::default());
    }

    #[test]
    fn test_parse_preferences_value_with_newline() {
        let raw = "wisp.agent\nclaude --model\nopus\0";
        let prefs = parse_preferences(raw);
        assert_eq!(prefs.agent.as_deref(), Some("claude --model\nopus"));
    }

    #[test]
    fn test_parse_preferences_ignores_unrelated_keys() {
        let raw = "wisp.agent\nclaude\0wisp.unknownKey\nvalue\0other.agent\nnot-ours\0";
        let prefs = parse_preferences(raw);
        assert_eq!(prefs.agent.as_deref(), Some("claude"));
        assert!(prefs.terminal.is_none());
    }
}
