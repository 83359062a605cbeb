//! `wisp zellij`: persisted layout authoring and listing

use wisp_core::error::WispError;
use wisp_core::layout::{InitLayoutOptions, LayoutResolver};
use wisp_core::worktree::GitCli;

use crate::output;

pub fn run_zellij_init(global: bool, name: Option<String>, force: bool) -> Result<(), WispError> {
    let git_root = GitCli::find_root()?;
    let resolver = LayoutResolver::from_environment();

    let result = resolver.init_layout(&InitLayoutOptions {
        git_root,
        global,
        name,
        force,
    })?;

    if result.already_exists {
        return Err(WispError::Validation(format!(
            "layout already exists at {}; use --force to overwrite",
            result.layout_path.display()
        )));
    }

    output::log(&format!(
        "Created layout at {}",
        result.layout_path.display()
    ));
    output::log("Edit it to customize panes, then run 'wisp launch <name>' to use it.");
    Ok(())
}

pub fn run_zellij_list() -> Result<(), WispError> {
    let git_root = GitCli::find_root()?;
    let resolver = LayoutResolver::from_environment();
    let listing = resolver.list_layouts(&git_root);

    output::log("Project layouts (.zellij/):");
    if listing.project.is_empty() {
        output::log("  (none)");
    }
    for layout in &listing.project {
        output::log(&format!("  {}", layout.name));
    }

    output::log(&format!(
        "Global layouts ({}):",
        resolver.global_layouts_dir.display()
    ));
    if listing.global.is_empty() {
        output::log("  (none)");
    }
    for layout in &listing.global {
        output::log(&format!("  {}", layout.name));
    }

    Ok(())
}
