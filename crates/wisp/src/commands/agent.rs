//! `wisp agent`: run the configured AI agent in an existing worktree

use wisp_core::environment::LaunchEnv;
use wisp_core::error::WispError;
use wisp_core::process::RunOptions;
use wisp_core::temp_layout::{LayoutHandle, TemporaryLayoutOptions};
use wisp_core::tmux::{self, WindowOptions};
use wisp_core::zellij::{self, PaneOptions, Placement, SessionOptions};

use crate::cli::{PlacementArgs, PlacementTarget};
use crate::commands::ProjectContext;
use crate::output;

pub fn run_agent(name: String, placement: PlacementArgs) -> Result<(), WispError> {
    let target = placement.selection()?;
    let env = LaunchEnv::from_environment();

    if matches!(target, Some(PlacementTarget::Tmux(_))) && !env.inside_tmux {
        return Err(WispError::Validation(
            "the --tmux options can only be used inside a tmux session".to_string(),
        ));
    }

    let context = ProjectContext::load()?;
    let (agent_command, agent_args) = context.configured_agent()?;
    let worktree_path = context.worktrees().require_existing(&name)?;
    let session_env = zellij::wisp_env(&name, &worktree_path);

    match target {
        Some(PlacementTarget::Tmux(tmux_placement)) => {
            output::log(&format!(
                "Launching agent in worktree '{}' in tmux...",
                name
            ));
            tmux::window_command(&WindowOptions {
                placement: tmux_placement,
                command: agent_command,
                args: agent_args,
                cwd: Some(worktree_path),
                env: session_env,
                window_name: (tmux_placement == Placement::New).then(|| name.clone()),
            })
        }
        Some(PlacementTarget::Zellij(zellij_placement)) => {
            if env.inside_zellij {
                output::log(&format!(
                    "Launching agent in worktree '{}' in Zellij...",
                    name
                ));
                return zellij::pane_command(&PaneOptions {
                    placement: zellij_placement,
                    command: agent_command,
                    args: agent_args,
                    cwd: Some(worktree_path),
                    tab_name: (zellij_placement == Placement::New).then(|| name.clone()),
                });
            }
            if zellij_placement != Placement::New {
                return Err(WispError::Validation(
                    "the --zellij-vertical and --zellij-horizontal options can only be used \
                     inside a Zellij session; use --zellij to launch a new session"
                        .to_string(),
                ));
            }

            // Fresh session: configured layout if any, generated otherwise
            let resolver = wisp_core::layout::LayoutResolver::from_environment();
            let resolution =
                resolver.resolve(None, context.zellij_config(), &context.git_root)?;
            let handle = match resolution.path {
                Some(path) => LayoutHandle::persisted(path),
                None => LayoutHandle::generate(&TemporaryLayoutOptions {
                    worktree_path: &worktree_path,
                    worktree_name: &name,
                    agent_command: &agent_command,
                    agent_args: &agent_args,
                    include_agent: true,
                })?,
            };

            output::log(&format!(
                "Launching Zellij session '{}' with the agent...",
                name
            ));
            let result = zellij::create_session(&SessionOptions {
                session_name: name.replace('/', "-"),
                layout: Some(handle.path().to_path_buf()),
                cwd: Some(worktree_path),
                env: session_env,
            });
            handle.dispose();
            result
        }
        None => {
            output::log(&format!("Launching agent in worktree '{}'...", name));
            let options = RunOptions {
                cwd: Some(worktree_path),
                env: session_env,
                interactive: true,
            };
            wisp_core::process::run(&agent_command, &agent_args, &options)?;
            Ok(())
        }
    }
}
