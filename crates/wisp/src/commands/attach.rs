//! `wisp attach`: bind an existing branch to a new worktree and enter it

use wisp_core::environment::LaunchEnv;
use wisp_core::error::WispError;
use wisp_core::process::{self, RunOptions};
use wisp_core::tmux::{self, WindowOptions};
use wisp_core::worktree::{merge_copy_files, GitCli, WorktreeRequest};
use wisp_core::zellij::{self, PaneOptions, Placement, SessionOptions};

use crate::cli::{PlacementArgs, PlacementTarget};
use crate::commands::ProjectContext;
use crate::output;

pub fn run_attach(
    branch: String,
    shell: bool,
    exec: Option<String>,
    copy_file: Vec<String>,
    placement: PlacementArgs,
) -> Result<(), WispError> {
    let target = placement.selection()?;

    let modes = [shell, exec.is_some(), target.is_some()]
        .iter()
        .filter(|selected| **selected)
        .count();
    if modes > 1 {
        return Err(WispError::Validation(
            "cannot use --shell, --exec, --tmux, and --zellij options together".to_string(),
        ));
    }

    let env = LaunchEnv::from_environment();
    if matches!(target, Some(PlacementTarget::Tmux(_))) && !env.inside_tmux {
        return Err(WispError::Validation(
            "the --tmux options can only be used inside a tmux session".to_string(),
        ));
    }

    let context = ProjectContext::load()?;
    let worktrees = context.worktrees();

    if worktrees.path_for(&branch).is_dir() {
        return Err(WispError::Validation(format!(
            "worktree '{}' already exists",
            branch
        )));
    }
    if !GitCli::new(&context.git_root).branch_exists(&branch)? {
        return Err(WispError::BranchNotFound {
            name: branch.clone(),
        });
    }

    let (config_copy_files, post_create_commands) = context.post_create();
    let request = WorktreeRequest {
        name: branch.clone(),
        base: None,
        copy_files: merge_copy_files(&config_copy_files, &copy_file),
        post_create_commands,
    };
    let outcome = worktrees.resolve(&request)?;
    for warning in outcome.warnings() {
        output::warn(warning);
    }
    output::log(&format!("Attached worktree '{}'", branch));

    let worktree_path = outcome.path().to_path_buf();
    let shell_command = env.shell_or_default().to_string();
    let session_env = zellij::wisp_env(&branch, &worktree_path);

    if shell {
        output::log(&format!("Entering worktree '{}'...", branch));
        let options = RunOptions {
            cwd: Some(worktree_path),
            env: session_env,
            interactive: true,
        };
        process::run(&shell_command, &[], &options)?;
        return Ok(());
    }

    if let Some(command) = exec {
        let options = RunOptions {
            cwd: Some(worktree_path),
            env: session_env,
            interactive: true,
        };
        process::run(&shell_command, &process::args(&["-c", &command]), &options)?;
        return Ok(());
    }

    match target {
        Some(PlacementTarget::Tmux(tmux_placement)) => {
            output::log(&format!(
                "Opening worktree '{}' in tmux {}...",
                branch,
                placement_noun(tmux_placement, "window")
            ));
            tmux::window_command(&WindowOptions {
                placement: tmux_placement,
                command: shell_command,
                args: Vec::new(),
                cwd: Some(worktree_path),
                env: session_env,
                window_name: (tmux_placement == Placement::New).then(|| branch.clone()),
            })
        }
        Some(PlacementTarget::Zellij(zellij_placement)) => {
            if env.inside_zellij {
                output::log(&format!(
                    "Opening worktree '{}' in Zellij {}...",
                    branch,
                    placement_noun(zellij_placement, "tab")
                ));
                return zellij::pane_command(&PaneOptions {
                    placement: zellij_placement,
                    command: shell_command,
                    args: Vec::new(),
                    cwd: Some(worktree_path),
                    tab_name: (zellij_placement == Placement::New).then(|| branch.clone()),
                });
            }
            // Splits only make sense inside a session
            if zellij_placement != Placement::New {
                return Err(WispError::Validation(
                    "the --zellij-vertical and --zellij-horizontal options can only be used \
                     inside a Zellij session; use --zellij to launch a new session"
                        .to_string(),
                ));
            }
            output::log(&format!("Launching Zellij session '{}'...", branch));
            zellij::create_session(&SessionOptions {
                session_name: branch.replace('/', "-"),
                layout: None,
                cwd: Some(worktree_path),
                env: session_env,
            })
        }
        None => Ok(()),
    }
}

fn placement_noun(placement: Placement, new_noun: &'static str) -> &'static str {
    match placement {
        Placement::New => new_noun,
        Placement::Vertical | Placement::Horizontal => "pane",
    }
}
