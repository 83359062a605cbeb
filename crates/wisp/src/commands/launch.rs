//! `wisp launch`: worktree resolution, layout resolution, session start

use wisp_core::environment::LaunchEnv;
use wisp_core::error::WispError;
use wisp_core::layout::{LayoutResolver, LayoutSource, SetupPrompt};
use wisp_core::process;
use wisp_core::temp_layout::{LayoutHandle, TemporaryLayoutOptions};
use wisp_core::terminal::{self, TerminalSpawnOptions};
use wisp_core::worktree::{merge_copy_files, WorktreeOutcome, WorktreeRequest};
use wisp_core::zellij::{self, SessionAction, SessionOptions, TabOptions};

use crate::commands::ProjectContext;
use crate::output;
use crate::prompt::CliSetupPrompt;

pub fn run_launch(
    name: String,
    base: Option<String>,
    layout: Option<String>,
    no_agent: bool,
    copy_file: Vec<String>,
    detach: bool,
) -> Result<(), WispError> {
    let env = LaunchEnv::from_environment();

    // A detached launch needs a local display to open a terminal window on
    if detach && env.ssh {
        return Err(WispError::Validation(
            "the --detach option cannot be used over SSH connections (no local display available)"
                .to_string(),
        ));
    }

    let context = ProjectContext::load()?;
    let (agent_command, agent_args) = context.agent_invocation();

    // Worktree: reuse, attach, or create
    let (config_copy_files, post_create_commands) = context.post_create();
    let request = WorktreeRequest {
        name: name.clone(),
        base,
        copy_files: merge_copy_files(&config_copy_files, &copy_file),
        post_create_commands,
    };
    let outcome = context.worktrees().resolve(&request)?;
    match &outcome {
        WorktreeOutcome::Reused { .. } => {
            output::log(&format!("Using existing worktree '{}'", name));
        }
        WorktreeOutcome::Attached { .. } => {
            output::log(&format!("Attached to existing branch '{}'", name));
        }
        WorktreeOutcome::Created { path, .. } => {
            output::log(&format!(
                "Created worktree '{}' at {}",
                name,
                path.display()
            ));
        }
    }
    for warning in outcome.warnings() {
        output::warn(warning);
    }
    let worktree_path = outcome.path().to_path_buf();

    // Layout: six-tier chain, prompting only when nothing is configured
    let resolver = LayoutResolver::from_environment();
    let mut resolution = resolver.resolve(
        layout.as_deref(),
        context.zellij_config(),
        &context.git_root,
    )?;
    if resolution.source == LayoutSource::PromptNeeded {
        let choice = CliSetupPrompt.choose()?;
        resolution = resolver.apply_setup_choice(choice, &context.git_root)?;
    }

    let handle = match resolution.path {
        Some(path) => LayoutHandle::persisted(path),
        None => LayoutHandle::generate(&TemporaryLayoutOptions {
            worktree_path: &worktree_path,
            worktree_name: &name,
            agent_command: &agent_command,
            agent_args: &agent_args,
            include_agent: !no_agent,
        })?,
    };

    let session_name = context.session_name(&name);

    // A fresh session is only needed in detach mode or outside zellij; only
    // then does a dead namesake block and get cleaned up
    let needs_fresh_session = detach || !env.inside_zellij;
    if needs_fresh_session {
        let status = zellij::session_status(&session_name);
        match zellij::session_action(status, needs_fresh_session) {
            SessionAction::DeleteThenProceed => {
                output::log(&format!(
                    "Cleaning up dead Zellij session '{}'...",
                    session_name
                ));
                zellij::delete_session(&session_name)?;
            }
            SessionAction::RefuseActive => {
                return Err(WispError::Validation(format!(
                    "Zellij session '{}' is already running; attach to it or choose a different name",
                    session_name
                )));
            }
            SessionAction::Proceed => {}
        }
    }

    let result = start_session(
        &context,
        &env,
        &handle,
        &session_name,
        &name,
        &worktree_path,
        detach,
    );

    // The handle also disposes on drop, covering the error paths above
    handle.dispose();
    result
}

fn start_session(
    context: &ProjectContext,
    env: &LaunchEnv,
    handle: &LayoutHandle,
    session_name: &str,
    worktree_name: &str,
    worktree_path: &std::path::Path,
    detach: bool,
) -> Result<(), WispError> {
    let session_env = zellij::wisp_env(worktree_name, worktree_path);
    let layout_path = handle.path().display().to_string();

    if detach {
        output::log(&format!(
            "Launching Zellij session '{}' in a new terminal window...",
            session_name
        ));
        let terminal = terminal::spawn_terminal_window(&TerminalSpawnOptions {
            command: "zellij".to_string(),
            args: process::args(&[
                "--session",
                session_name,
                "--new-session-with-layout",
                &layout_path,
            ]),
            cwd: Some(worktree_path.to_path_buf()),
            env: session_env,
            preference: context.preferences.terminal.clone(),
        })?;
        output::log(&format!("Opened in {}", terminal));
        return Ok(());
    }

    if env.inside_zellij {
        output::log(&format!("Adding Zellij tab '{}'...", session_name));
        return zellij::add_tab(&TabOptions {
            layout: handle.path().to_path_buf(),
            tab_name: Some(session_name.to_string()),
            cwd: Some(worktree_path.to_path_buf()),
        });
    }

    output::log(&format!("Launching Zellij session '{}'...", session_name));
    zellij::create_session(&SessionOptions {
        session_name: session_name.to_string(),
        layout: Some(handle.path().to_path_buf()),
        cwd: Some(worktree_path.to_path_buf()),
        env: session_env,
    })
}
