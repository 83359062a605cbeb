//! Zellij control: session probe, session lifecycle, and pane placement
//!
//! The multiplexer is driven entirely through its own CLI. Session status is
//! recomputed on every query and never cached; sessions can be created and
//! destroyed concurrently by the operator or other wisp invocations.

use std::path::{Path, PathBuf};

use crate::error::WispError;
use crate::process::{self, RunOptions};

/// Marker zellij prints on listing rows for sessions whose server died
const EXITED_MARKER: &str = "EXITED";

/// Status of a named zellij session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Session exists and is running
    Active,
    /// Session exists but its server has exited; must be deleted before the
    /// name can be reused
    Dead,
    /// No session with this name
    NotFound,
}

/// Where a spawned command lands relative to the current pane/window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// New top-level tab/window
    New,
    /// Split the current pane downward
    Vertical,
    /// Split the current pane rightward
    Horizontal,
}

/// Environment injected into every session/pane wisp creates
pub fn wisp_env(worktree_name: &str, worktree_path: &Path) -> Vec<(String, String)> {
    vec![
        ("WISP_NAME".to_string(), worktree_name.to_string()),
        (
            "WISP_PATH".to_string(),
            worktree_path.display().to_string(),
        ),
    ]
}

/// Strip ANSI escape sequences from zellij's listing output
fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if chars.peek() == Some(&'[') {
                chars.next();
                // Consume until the terminating letter of the CSI sequence
                for esc in chars.by_ref() {
                    if esc.is_ascii_alphabetic() {
                        break;
                    }
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Classify a session name against a raw `zellij list-sessions` listing.
///
/// Matching is exact on the first whitespace-delimited field of each row;
/// `foo` must not match `foo-bar` or vice versa.
fn classify_listing(listing: &str, session_name: &str) -> SessionStatus {
    for line in strip_ansi(listing).lines() {
        let mut fields = line.split_whitespace();
        let Some(first) = fields.next() else {
            continue;
        };
        if first != session_name {
            continue;
        }
        if line.contains(EXITED_MARKER) {
            return SessionStatus::Dead;
        }
        return SessionStatus::Active;
    }
    SessionStatus::NotFound
}

/// What to do about an existing session holding the target name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// A dead namesake holds the name; delete it, then create
    DeleteThenProceed,
    /// A live session owns the name; refuse without touching anything
    RefuseActive,
    /// Nothing in the way
    Proceed,
}

/// Decide how to treat an existing session with the target name.
///
/// Only a brand-new session contends with existing ones; adding a tab to the
/// current session never does, whatever the probe says.
pub fn session_action(status: SessionStatus, needs_fresh_session: bool) -> SessionAction {
    if !needs_fresh_session {
        return SessionAction::Proceed;
    }
    match status {
        SessionStatus::Dead => SessionAction::DeleteThenProceed,
        SessionStatus::Active => SessionAction::RefuseActive,
        SessionStatus::NotFound => SessionAction::Proceed,
    }
}

/// Probe the status of a named session.
///
/// Any failure to invoke the listing command (zellij not installed, no
/// sessions at all) degrades to `NotFound` so first-time use never blocks
/// before an actual session action is attempted.
pub fn session_status(session_name: &str) -> SessionStatus {
    let listing = process::run_captured_checked(
        "zellij",
        &process::args(&["list-sessions"]),
        &RunOptions::default(),
    );

    match listing {
        Ok((output, _)) => classify_listing(&output.stdout, session_name),
        Err(_) => SessionStatus::NotFound,
    }
}

/// Delete a session, typically a dead one found by the probe.
///
/// Deleting an already-gone session is not an error; only a failure to spawn
/// zellij itself is surfaced.
pub fn delete_session(session_name: &str) -> Result<(), WispError> {
    let result = process::run(
        "zellij",
        &process::args(&["delete-session", "--force", session_name]),
        &RunOptions::default(),
    );

    match result {
        Ok(_) | Err(WispError::ProcessExecution { .. }) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Options for creating a brand-new named session
#[derive(Debug)]
pub struct SessionOptions {
    pub session_name: String,
    pub layout: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

/// Create a new session, attaching the caller's terminal to it.
///
/// `--new-session-with-layout` is used rather than `--layout` because the
/// latter attaches and adds tabs when the session already exists.
pub fn create_session(options: &SessionOptions) -> Result<(), WispError> {
    let mut zellij_args = vec!["--session".to_string(), options.session_name.clone()];
    if let Some(layout) = &options.layout {
        zellij_args.push("--new-session-with-layout".to_string());
        zellij_args.push(layout.display().to_string());
    }

    let run_options = RunOptions {
        cwd: options.cwd.clone(),
        env: options.env.clone(),
        interactive: true,
    };

    process::run("zellij", &zellij_args, &run_options)?;
    Ok(())
}

/// Options for adding a tab to the current session
#[derive(Debug)]
pub struct TabOptions {
    pub layout: PathBuf,
    pub tab_name: Option<String>,
    pub cwd: Option<PathBuf>,
}

/// Add a new tab with a layout to the current session. Only valid from
/// inside a zellij session.
pub fn add_tab(options: &TabOptions) -> Result<(), WispError> {
    let mut zellij_args = vec![
        "action".to_string(),
        "new-tab".to_string(),
        "--layout".to_string(),
        options.layout.display().to_string(),
    ];
    if let Some(name) = &options.tab_name {
        zellij_args.push("--name".to_string());
        zellij_args.push(name.clone());
    }
    if let Some(cwd) = &options.cwd {
        zellij_args.push("--cwd".to_string());
        zellij_args.push(cwd.display().to_string());
    }

    process::run("zellij", &zellij_args, &RunOptions::interactive())?;
    Ok(())
}

/// Options for injecting a single command into the current session
#[derive(Debug)]
pub struct PaneOptions {
    pub placement: Placement,
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub tab_name: Option<String>,
}

/// Build the zellij argument vector for a pane/tab command injection.
///
/// Zellij inherits environment from the parent process; unlike tmux there is
/// no per-pane env flag.
fn pane_args(options: &PaneOptions) -> Vec<String> {
    let mut zellij_args: Vec<String> = Vec::new();

    match options.placement {
        Placement::New => {
            zellij_args.extend(process::args(&["action", "new-tab"]));
            if let Some(name) = &options.tab_name {
                zellij_args.push("--name".to_string());
                zellij_args.push(name.clone());
            }
        }
        Placement::Vertical => {
            zellij_args.extend(process::args(&["action", "new-pane", "--direction", "down"]));
        }
        Placement::Horizontal => {
            zellij_args.extend(process::args(&[
                "action", "new-pane", "--direction", "right",
            ]));
        }
    }

    if let Some(cwd) = &options.cwd {
        zellij_args.push("--cwd".to_string());
        zellij_args.push(cwd.display().to_string());
    }

    zellij_args.push("--".to_string());
    zellij_args.push(options.command.clone());
    zellij_args.extend(options.args.iter().cloned());

    zellij_args
}

/// Run a command in a new pane or tab of the current session
pub fn pane_command(options: &PaneOptions) -> Result<(), WispError> {
    process::run("zellij", &pane_args(options), &RunOptions::interactive())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
build [Created 2h ago]
build-2 [Created 5m ago] (EXITED - attach to resurrect)
proj-feature-x [Created 1m ago]";

    #[test]
    fn test_classify_active_session() {
        assert_eq!(classify_listing(LISTING, "build"), SessionStatus::Active);
        assert_eq!(
            classify_listing(LISTING, "proj-feature-x"),
            SessionStatus::Active
        );
    }

    #[test]
    fn test_classify_dead_session() {
        assert_eq!(classify_listing(LISTING, "build-2"), SessionStatus::Dead);
    }

    #[test]
    fn test_classify_missing_session() {
        assert_eq!(
            classify_listing(LISTING, "no-such-session"),
            SessionStatus::NotFound
        );
        assert_eq!(classify_listing("", "build"), SessionStatus::NotFound);
    }

    #[test]
    fn test_classify_does_not_prefix_match() {
        // `build` is a prefix of `build-2` and must not be conflated
        assert_eq!(classify_listing(LISTING, "build"), SessionStatus::Active);
        let without_build = "build-2 [Created 5m ago] (EXITED - attach to resurrect)";
        assert_eq!(
            classify_listing(without_build, "build"),
            SessionStatus::NotFound
        );
        assert_eq!(
            classify_listing("build [Created 2h ago]", "build-2"),
            SessionStatus::NotFound
        );
    }

    #[test]
    fn test_classify_is_idempotent() {
        let first = classify_listing(LISTING, "build-2");
        let second = classify_listing(LISTING, "build-2");
        assert_eq!(first, second);
    }

    #[test]
    fn test_classify_strips_ansi_codes() {
        let colored = "\x1b[32mbuild\x1b[0m [Created 2h ago]";
        assert_eq!(classify_listing(colored, "build"), SessionStatus::Active);
    }

    #[test]
    fn test_strip_ansi_passthrough() {
        assert_eq!(strip_ansi("plain text"), "plain text");
        assert_eq!(strip_ansi("\x1b[1;31mred\x1b[0m"), "red");
    }

    #[test]
    fn test_session_action_dead_deletes_before_create() {
        assert_eq!(
            session_action(SessionStatus::Dead, true),
            SessionAction::DeleteThenProceed
        );
    }

    #[test]
    fn test_session_action_active_refuses() {
        assert_eq!(
            session_action(SessionStatus::Active, true),
            SessionAction::RefuseActive
        );
    }

    #[test]
    fn test_session_action_not_found_proceeds() {
        assert_eq!(
            session_action(SessionStatus::NotFound, true),
            SessionAction::Proceed
        );
    }

    #[test]
    fn test_session_action_inline_ignores_existing_sessions() {
        // Adding a tab to the current session never contends with a
        // namesake, live or dead
        assert_eq!(
            session_action(SessionStatus::Active, false),
            SessionAction::Proceed
        );
        assert_eq!(
            session_action(SessionStatus::Dead, false),
            SessionAction::Proceed
        );
    }

    #[test]
    fn test_wisp_env() {
        let env = wisp_env("feature-x", Path::new("/tmp/wt/feature-x"));
        assert_eq!(
            env,
            vec![
                ("WISP_NAME".to_string(), "feature-x".to_string()),
                ("WISP_PATH".to_string(), "/tmp/wt/feature-x".to_string()),
            ]
        );
    }

    #[test]
    fn test_pane_args_new_tab() {
        let options = PaneOptions {
            placement: Placement::New,
            command: "zsh".to_string(),
            args: vec![],
            cwd: Some(PathBuf::from("/work")),
            tab_name: Some("feature-x".to_string()),
        };
        assert_eq!(
            pane_args(&options),
            process::args(&[
                "action", "new-tab", "--name", "feature-x", "--cwd", "/work", "--", "zsh"
            ])
        );
    }

    #[test]
    fn test_pane_args_splits() {
        let vertical = PaneOptions {
            placement: Placement::Vertical,
            command: "zsh".to_string(),
            args: vec![],
            cwd: None,
            tab_name: None,
        };
        assert_eq!(
            pane_args(&vertical),
            process::args(&["action", "new-pane", "--direction", "down", "--", "zsh"])
        );

        let horizontal = PaneOptions {
            placement: Placement::Horizontal,
            command: "claude".to_string(),
            args: process::args(&["--model", "opus"]),
            cwd: None,
            tab_name: None,
        };
        assert_eq!(
            pane_args(&horizontal),
            process::args(&[
                "action", "new-pane", "--direction", "right", "--", "claude", "--model", "opus"
            ])
        );
    }
}
