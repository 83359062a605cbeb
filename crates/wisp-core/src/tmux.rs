//! Tmux pane placement
//!
//! The alternate multiplexer family. Only command injection into an existing
//! tmux session is supported; full session orchestration is zellij's job.

use std::path::PathBuf;

use crate::error::WispError;
use crate::process::{self, RunOptions};
use crate::zellij::Placement;

/// Options for running a command in a tmux window or pane
#[derive(Debug)]
pub struct WindowOptions {
    pub placement: Placement,
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub window_name: Option<String>,
}

fn window_args(options: &WindowOptions) -> Vec<String> {
    let mut tmux_args: Vec<String> = Vec::new();

    match options.placement {
        Placement::New => {
            tmux_args.push("new-window".to_string());
            if let Some(name) = &options.window_name {
                tmux_args.push("-n".to_string());
                tmux_args.push(name.clone());
            }
        }
        Placement::Vertical => {
            tmux_args.extend(process::args(&["split-window", "-v"]));
        }
        Placement::Horizontal => {
            tmux_args.extend(process::args(&["split-window", "-h"]));
        }
    }

    if let Some(cwd) = &options.cwd {
        tmux_args.push("-c".to_string());
        tmux_args.push(cwd.display().to_string());
    }

    // tmux supports per-window environment via -e, unlike zellij
    for (key, value) in &options.env {
        tmux_args.push("-e".to_string());
        tmux_args.push(format!("{}={}", key, value));
    }

    tmux_args.push(options.command.clone());
    tmux_args.extend(options.args.iter().cloned());

    tmux_args
}

/// Run a command in a new tmux window or pane. Only valid from inside tmux.
pub fn window_command(options: &WindowOptions) -> Result<(), WispError> {
    process::run("tmux", &window_args(options), &RunOptions::interactive())?;
    Ok(())
}
