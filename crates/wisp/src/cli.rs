//! CLI argument parsing with clap derive

use clap::{Args, Parser, Subcommand};
use wisp_core::error::WispError;
use wisp_core::zellij::Placement;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wisp - Disposable git worktrees opened in Zellij sessions
#[derive(Parser)]
#[command(name = "wisp")]
#[command(version = VERSION)]
#[command(about = "Disposable git worktrees opened in Zellij sessions alongside an AI coding agent")]
#[command(long_about = "Wisp manages disposable git worktrees and opens them in Zellij sessions.\n\nEach worktree gets its own branch and its own session, laid out with an AI coding agent pane next to shell panes. Layouts resolve from CLI flags, project config, and global config; when nothing is configured a layout is generated on the fly and cleaned up afterwards.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or reuse a worktree and open it in a Zellij session
    ///
    /// Resolves the name to an existing worktree, an existing branch, or a
    /// brand-new branch, then opens a session/tab with the resolved layout.
    #[command(long_about = "Create or reuse a worktree and open it in a Zellij session.\n\nResolution:\n  - worktree exists: reuse it\n  - branch exists: attach a worktree to it\n  - otherwise: create branch + worktree from --base (default HEAD)\n\nInside Zellij a tab is added to the current session; outside, a new session is created. --detach opens the session in a new terminal window.")]
    Launch {
        /// Worktree (and branch, and session) name
        name: String,

        /// Base ref for a newly created branch (defaults to HEAD)
        #[arg(long)]
        base: Option<String>,

        /// Layout file to use, overriding all configuration
        #[arg(short, long)]
        layout: Option<String>,

        /// Generate the layout without the AI agent pane
        #[arg(long)]
        no_agent: bool,

        /// Extra file to copy from the root worktree (repeatable)
        #[arg(long = "copy-file")]
        copy_file: Vec<String>,

        /// Open the session in a new terminal window
        #[arg(short, long)]
        detach: bool,
    },

    /// Attach an existing branch as a new worktree
    ///
    /// The branch must already exist; the worktree must not.
    #[command(long_about = "Attach an existing branch as a new worktree.\n\nOptionally enters the worktree (--shell), runs a command in it (--exec), or opens it in a multiplexer pane/tab/window. The mode options are mutually exclusive.")]
    Attach {
        /// Branch to attach
        branch: String,

        /// Open an interactive shell in the new worktree
        #[arg(short, long)]
        shell: bool,

        /// Run a command in the new worktree
        #[arg(short = 'x', long)]
        exec: Option<String>,

        /// Extra file to copy from the root worktree (repeatable)
        #[arg(long = "copy-file")]
        copy_file: Vec<String>,

        #[command(flatten)]
        placement: PlacementArgs,
    },

    /// Run the configured AI agent in an existing worktree
    ///
    /// Inline by default; placement flags open it in a pane, tab, window, or
    /// a fresh session with a generated layout.
    #[command(long_about = "Run the configured AI agent in an existing worktree.\n\nThe agent command comes from wisp.config.json (zellij.agent) or the 'agent' preference. Without placement flags the agent runs inline in the current terminal; --zellij outside a session creates a new session with a generated layout.")]
    Agent {
        /// Worktree to run the agent in
        name: String,

        #[command(flatten)]
        placement: PlacementArgs,
    },

    /// Zellij layout management
    #[command(subcommand)]
    Zellij(ZellijCommands),

    /// Operator preferences stored in global git config
    #[command(subcommand)]
    Preferences(PreferencesCommands),
}

#[derive(Subcommand)]
pub enum ZellijCommands {
    /// Create a layout file from the default template
    ///
    /// Writes .zellij/default.kdl in the project, or the global wisp layout
    /// with --global.
    Init {
        /// Write to ~/.config/zellij/layouts instead of the project
        #[arg(short, long)]
        global: bool,

        /// Layout file name (without .kdl)
        #[arg(short, long)]
        name: Option<String>,

        /// Overwrite an existing layout file
        #[arg(short, long)]
        force: bool,
    },

    /// List project and global layout files
    List,
}

#[derive(Subcommand)]
pub enum PreferencesCommands {
    /// Set a preference (agent, terminal, editor, worktreesDirectory)
    Set { key: String, value: String },

    /// Print a preference value
    Get { key: String },

    /// Remove a preference
    Remove { key: String },
}

/// Where a command should land: a zellij or tmux tab/window or split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementTarget {
    Zellij(Placement),
    Tmux(Placement),
}

/// Multiplexer placement flags shared by `attach` and `agent`
#[derive(Args, Debug, Default)]
pub struct PlacementArgs {
    /// Open in a new Zellij tab (or session, when outside Zellij)
    #[arg(short, long)]
    pub zellij: bool,

    /// Split the current Zellij pane downward
    #[arg(long)]
    pub zellij_vertical: bool,

    /// Split the current Zellij pane rightward
    #[arg(long)]
    pub zellij_horizontal: bool,

    /// Open in a new tmux window
    #[arg(short, long)]
    pub tmux: bool,

    /// Split the current tmux pane downward
    #[arg(long)]
    pub tmux_vertical: bool,

    /// Split the current tmux pane rightward
    #[arg(long)]
    pub tmux_horizontal: bool,
}

impl PlacementArgs {
    /// The single selected placement, or a validation error when flags from
    /// both multiplexers (or several placements) are combined.
    pub fn selection(&self) -> Result<Option<PlacementTarget>, WispError> {
        let selected: Vec<PlacementTarget> = [
            (self.zellij, PlacementTarget::Zellij(Placement::New)),
            (
                self.zellij_vertical,
                PlacementTarget::Zellij(Placement::Vertical),
            ),
            (
                self.zellij_horizontal,
                PlacementTarget::Zellij(Placement::Horizontal),
            ),
            (self.tmux, PlacementTarget::Tmux(Placement::New)),
            (self.tmux_vertical, PlacementTarget::Tmux(Placement::Vertical)),
            (
                self.tmux_horizontal,
                PlacementTarget::Tmux(Placement::Horizontal),
            ),
        ]
        .into_iter()
        .filter_map(|(flag, target)| flag.then_some(target))
        .collect();

        match selected.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            _ => Err(WispError::Validation(
                "cannot use --tmux and --zellij placement options together".to_string(),
            )),
        }
    }
}

/// Get the command args for use in the application
pub fn parse() -> Cli {
    Cli::parse()
}
