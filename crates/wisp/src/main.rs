//! wisp CLI - Disposable git worktrees opened in Zellij sessions

mod cli;
mod commands;
mod output;
mod prompt;

use std::process::ExitCode;

use cli::{Commands, PreferencesCommands, ZellijCommands};

fn main() -> ExitCode {
    let cli = cli::parse();

    let result = match cli.command {
        Commands::Launch {
            name,
            base,
            layout,
            no_agent,
            copy_file,
            detach,
        } => commands::run_launch(name, base, layout, no_agent, copy_file, detach),
        Commands::Attach {
            branch,
            shell,
            exec,
            copy_file,
            placement,
        } => commands::run_attach(branch, shell, exec, copy_file, placement),
        Commands::Agent { name, placement } => commands::run_agent(name, placement),
        Commands::Zellij(zellij_cmd) => match zellij_cmd {
            ZellijCommands::Init {
                global,
                name,
                force,
            } => commands::run_zellij_init(global, name, force),
            ZellijCommands::List => commands::run_zellij_list(),
        },
        Commands::Preferences(preferences_cmd) => match preferences_cmd {
            PreferencesCommands::Set { key, value } => commands::run_preferences_set(key, value),
            PreferencesCommands::Get { key } => commands::run_preferences_get(key),
            PreferencesCommands::Remove { key } => commands::run_preferences_remove(key),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            // A failed child's own exit code is forwarded when it has one
            let code = e.child_exit_code().unwrap_or_else(|| e.exit_code());
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
