//! Terminal emulator spawning for detached launches
//!
//! A detached launch opens a fresh terminal window running the session
//! command. Each emulator family has its own way of being told "open a
//! window and run this"; unknown preferences fall back to the widespread
//! `-e bash -c` convention.

use std::path::PathBuf;

use crate::error::WispError;
use crate::process::{self, RunOptions};

/// Terminal emulators with dedicated spawn handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Iterm,
    TerminalApp,
    Ghostty,
    Wezterm,
    Alacritty,
    GnomeTerminal,
    Konsole,
}

impl TerminalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalKind::Iterm => "iterm",
            TerminalKind::TerminalApp => "terminal",
            TerminalKind::Ghostty => "ghostty",
            TerminalKind::Wezterm => "wezterm",
            TerminalKind::Alacritty => "alacritty",
            TerminalKind::GnomeTerminal => "gnome-terminal",
            TerminalKind::Konsole => "konsole",
        }
    }
}

/// Environment signals a terminal can be detected from
#[derive(Debug, Clone, Default)]
pub struct TerminalEnv {
    pub term_program: Option<String>,
    pub gnome_terminal_screen: bool,
    pub konsole_version: bool,
}

impl TerminalEnv {
    pub fn from_environment() -> Self {
        Self {
            term_program: std::env::var("TERM_PROGRAM").ok(),
            gnome_terminal_screen: std::env::var_os("GNOME_TERMINAL_SCREEN").is_some(),
            konsole_version: std::env::var_os("KONSOLE_VERSION").is_some(),
        }
    }
}

/// Detect the running terminal from the environment
pub fn detect_terminal(env: &TerminalEnv) -> Option<TerminalKind> {
    if let Some(term_program) = env.term_program.as_deref() {
        let known = match term_program {
            "iTerm.app" => Some(TerminalKind::Iterm),
            "Apple_Terminal" => Some(TerminalKind::TerminalApp),
            "ghostty" => Some(TerminalKind::Ghostty),
            "WezTerm" => Some(TerminalKind::Wezterm),
            "Alacritty" => Some(TerminalKind::Alacritty),
            _ => None,
        };
        if known.is_some() {
            return known;
        }
    }

    if env.gnome_terminal_screen {
        return Some(TerminalKind::GnomeTerminal);
    }
    if env.konsole_version {
        return Some(TerminalKind::Konsole);
    }

    None
}

/// Map an operator preference string onto a known terminal
pub fn parse_preference(preference: &str) -> Option<TerminalKind> {
    match preference.to_lowercase().trim() {
        "iterm" | "iterm2" | "iterm.app" => Some(TerminalKind::Iterm),
        "terminal" | "terminal.app" | "apple_terminal" => Some(TerminalKind::TerminalApp),
        "ghostty" => Some(TerminalKind::Ghostty),
        "wezterm" => Some(TerminalKind::Wezterm),
        "alacritty" => Some(TerminalKind::Alacritty),
        "gnome-terminal" | "gnome" => Some(TerminalKind::GnomeTerminal),
        "konsole" => Some(TerminalKind::Konsole),
        _ => None,
    }
}

/// A terminal we know how to drive, or a custom command treated generically
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTerminal {
    Known(TerminalKind),
    Custom(String),
}

impl ResolvedTerminal {
    pub fn name(&self) -> &str {
        match self {
            ResolvedTerminal::Known(kind) => kind.as_str(),
            ResolvedTerminal::Custom(command) => command,
        }
    }
}

/// Resolve the terminal to spawn: explicit preference first, then the
/// detected environment, then any `TERM_PROGRAM` value as a custom command.
pub fn resolve_terminal(
    preference: Option<&str>,
    env: &TerminalEnv,
) -> Result<ResolvedTerminal, WispError> {
    if let Some(preference) = preference {
        if let Some(kind) = parse_preference(preference) {
            return Ok(ResolvedTerminal::Known(kind));
        }
        // Unknown preference is an arbitrary terminal command
        return Ok(ResolvedTerminal::Custom(preference.to_string()));
    }

    if let Some(kind) = detect_terminal(env) {
        return Ok(ResolvedTerminal::Known(kind));
    }

    if let Some(term_program) = env.term_program.as_deref() {
        return Ok(ResolvedTerminal::Custom(term_program.to_lowercase()));
    }

    Err(WispError::Terminal(
        "could not detect terminal; set it with: wisp preferences set terminal <name>\n\
         known terminals: iterm, terminal, ghostty, wezterm, alacritty, gnome-terminal, konsole\n\
         or specify any terminal command directly (e.g. 'kitty', 'foot')"
            .to_string(),
    ))
}

/// Options for opening a command in a new terminal window
#[derive(Debug)]
pub struct TerminalSpawnOptions {
    pub command: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub preference: Option<String>,
}

/// Single-quote an argument for embedding in a shell command line
pub fn escape_shell_arg(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', "'\\''"))
}

/// Build the shell string that runs the command: env exports, cd, command
fn build_command_string(options: &TerminalSpawnOptions) -> String {
    let mut cmd = String::new();

    for (key, value) in &options.env {
        cmd.push_str(&format!("export {}={}; ", key, escape_shell_arg(value)));
    }

    if let Some(cwd) = &options.cwd {
        cmd.push_str(&format!(
            "cd {} && ",
            escape_shell_arg(&cwd.display().to_string())
        ));
    }

    cmd.push_str(&options.command);
    for arg in &options.args {
        cmd.push(' ');
        cmd.push_str(&escape_shell_arg(arg));
    }

    cmd
}

/// Open a new terminal window running the command.
///
/// Returns the name of the terminal that was spawned.
pub fn spawn_terminal_window(options: &TerminalSpawnOptions) -> Result<String, WispError> {
    let env = TerminalEnv::from_environment();
    let resolved = resolve_terminal(options.preference.as_deref(), &env)?;

    match &resolved {
        ResolvedTerminal::Known(TerminalKind::Iterm) => spawn_iterm(options)?,
        ResolvedTerminal::Known(TerminalKind::TerminalApp) => spawn_terminal_app(options)?,
        ResolvedTerminal::Known(TerminalKind::Ghostty) => spawn_ghostty(options)?,
        ResolvedTerminal::Known(TerminalKind::Wezterm) => spawn_wezterm(options)?,
        ResolvedTerminal::Known(TerminalKind::Alacritty) => spawn_alacritty(options)?,
        ResolvedTerminal::Known(TerminalKind::GnomeTerminal) => spawn_gnome_terminal(options)?,
        ResolvedTerminal::Known(TerminalKind::Konsole) => spawn_konsole(options)?,
        ResolvedTerminal::Custom(command) => spawn_generic(command, options)?,
    }

    Ok(resolved.name().to_string())
}

fn spawn_iterm(options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let command_string = build_command_string(options);
    let script = format!(
        "tell application \"iTerm\"\n\
         activate\n\
         create window with default profile\n\
         tell current session of current window\n\
         write text {}\n\
         end tell\n\
         end tell",
        applescript_quote(&command_string)
    );
    process::run(
        "osascript",
        &process::args(&["-e", &script]),
        &RunOptions::default(),
    )?;
    Ok(())
}

fn spawn_terminal_app(options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let command_string = build_command_string(options);
    let script = format!(
        "tell application \"Terminal\"\n\
         activate\n\
         do script {}\n\
         end tell",
        applescript_quote(&command_string)
    );
    process::run(
        "osascript",
        &process::args(&["-e", &script]),
        &RunOptions::default(),
    )?;
    Ok(())
}

fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

fn spawn_ghostty(options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let shell_command = build_command_string(options);
    process::run(
        "open",
        &process::args(&[
            "-na",
            "Ghostty",
            "--args",
            "-e",
            "bash",
            "-c",
            &shell_command,
        ]),
        &RunOptions::default(),
    )?;
    Ok(())
}

fn spawn_wezterm(options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let mut wezterm_args = process::args(&["cli", "spawn", "--new-window"]);
    if let Some(cwd) = &options.cwd {
        wezterm_args.push("--cwd".to_string());
        wezterm_args.push(cwd.display().to_string());
    }
    wezterm_args.push("--".to_string());
    wezterm_args.push(options.command.clone());
    wezterm_args.extend(options.args.iter().cloned());

    process::run(
        "wezterm",
        &wezterm_args,
        &RunOptions::default().with_env(options.env.clone()),
    )?;
    Ok(())
}

fn spawn_alacritty(options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let mut alacritty_args: Vec<String> = Vec::new();
    if let Some(cwd) = &options.cwd {
        alacritty_args.push("--working-directory".to_string());
        alacritty_args.push(cwd.display().to_string());
    }
    alacritty_args.push("-e".to_string());
    alacritty_args.push(options.command.clone());
    alacritty_args.extend(options.args.iter().cloned());

    process::spawn_detached(
        "alacritty",
        &alacritty_args,
        &RunOptions::default().with_env(options.env.clone()),
    )
}

fn spawn_gnome_terminal(options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let mut gt_args: Vec<String> = Vec::new();
    if let Some(cwd) = &options.cwd {
        gt_args.push("--working-directory".to_string());
        gt_args.push(cwd.display().to_string());
    }
    let full_command = full_command_line(options);
    gt_args.extend(process::args(&["--", "bash", "-c", &full_command]));

    process::run(
        "gnome-terminal",
        &gt_args,
        &RunOptions::default().with_env(options.env.clone()),
    )?;
    Ok(())
}

fn spawn_konsole(options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let mut konsole_args: Vec<String> = Vec::new();
    if let Some(cwd) = &options.cwd {
        konsole_args.push("--workdir".to_string());
        konsole_args.push(cwd.display().to_string());
    }
    konsole_args.push("-e".to_string());
    konsole_args.push(full_command_line(options));

    process::spawn_detached(
        "konsole",
        &konsole_args,
        &RunOptions::default().with_env(options.env.clone()),
    )
}

/// Common `-e bash -c` pattern that kitty, foot, xterm and friends accept
fn spawn_generic(terminal_command: &str, options: &TerminalSpawnOptions) -> Result<(), WispError> {
    let cwd_prefix = options
        .cwd
        .as_ref()
        .map(|cwd| format!("cd {} && ", escape_shell_arg(&cwd.display().to_string())))
        .unwrap_or_default();
    let shell_command = format!("{}{}", cwd_prefix, full_command_line(options));

    process::spawn_detached(
        terminal_command,
        &process::args(&["-e", "bash", "-c", &shell_command]),
        &RunOptions::default().with_env(options.env.clone()),
    )
}

fn full_command_line(options: &TerminalSpawnOptions) -> String {
    let mut line = options.command.clone();
    for arg in &options.args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
