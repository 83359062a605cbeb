//! Interactive layout setup prompt using dialoguer

use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;

use wisp_core::error::WispError;
use wisp_core::layout::{SetupChoice, SetupPrompt};

/// Terminal implementation of the setup prompt, shown when a launch finds no
/// zellij configuration at all
pub struct CliSetupPrompt;

impl SetupPrompt for CliSetupPrompt {
    fn choose(&self) -> Result<SetupChoice, WispError> {
        println!(
            "{}",
            style("No Zellij layout is configured for this project.").bold()
        );

        let items = [
            "Use the built-in layout for this run",
            "Create a project layout (.zellij/default.kdl)",
            "Create a global layout (~/.config/zellij/layouts/wisp.kdl)",
            "Skip",
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("How should wisp proceed?")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| WispError::Validation(format!("layout setup cancelled: {}", e)))?;

        Ok(match selection {
            0 => SetupChoice::Builtin,
            1 => SetupChoice::CreateProject,
            2 => SetupChoice::CreateGlobal,
            _ => SetupChoice::Skip,
        })
    }
}
