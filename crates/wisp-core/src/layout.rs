//! Layout resolution and persisted layout authoring
//!
//! A layout is a declarative KDL template describing a zellij session's pane
//! geometry. Resolution walks a strict six-tier priority chain; the CLI and
//! project-config tiers are authoritative (a missing file is an authorship
//! error), the global tiers are advisory (a missing file falls through).

use std::path::{Path, PathBuf};

use crate::config::ZellijConfig;
use crate::error::WispError;

/// Directory holding per-project layouts, relative to the git root
pub const PROJECT_LAYOUT_DIR: &str = ".zellij";

/// Auto-detected project default layout inside [`PROJECT_LAYOUT_DIR`]
pub const PROJECT_DEFAULT_LAYOUT: &str = "default.kdl";

/// Wisp's global default layout inside the zellij layouts directory
pub const GLOBAL_DEFAULT_LAYOUT: &str = "wisp.kdl";

/// Reserved config value: use the built-in generated layout
pub const LAYOUT_VALUE_BUILTIN: &str = "builtin";

/// Reserved config value: use the global default layout
pub const LAYOUT_VALUE_GLOBAL: &str = "global";

/// Which tier of the priority chain produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    Cli,
    ProjectConfig,
    ProjectDefault,
    GlobalConfig,
    GlobalDefault,
    /// No persisted layout; synthesize one at runtime
    Builtin,
    /// No configuration exists at all; ask the operator how to proceed
    PromptNeeded,
}

/// Outcome of layout resolution.
///
/// `path` is `None` exactly when `source` is `Builtin` or `PromptNeeded`;
/// every `Some` path existed at resolution time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutResolution {
    pub path: Option<PathBuf>,
    pub source: LayoutSource,
}

impl LayoutResolution {
    pub fn builtin() -> Self {
        Self {
            path: None,
            source: LayoutSource::Builtin,
        }
    }
}

/// Operator's answer when no layout configuration exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupChoice {
    /// Use the built-in layout for this run
    Builtin,
    /// Create `.zellij/default.kdl` and use it
    CreateProject,
    /// Create the global default layout and use it
    CreateGlobal,
    /// Use the built-in layout, don't set anything up
    Skip,
}

/// Capability for asking the operator a setup question.
///
/// Injected rather than read inline so resolution stays testable with a
/// scripted choice.
pub trait SetupPrompt {
    fn choose(&self) -> Result<SetupChoice, WispError>;
}

/// Filesystem context for layout resolution.
///
/// Global locations are fields rather than ambient lookups so tests can point
/// the resolver at a temp directory.
#[derive(Debug, Clone)]
pub struct LayoutResolver {
    /// `~/.config/zellij/layouts`
    pub global_layouts_dir: PathBuf,
    /// `~/.config/wisp`, base for relative global-config layout paths
    pub global_config_dir: PathBuf,
    /// `zellij.layout` from the global config, if any
    pub global_config_layout: Option<String>,
    /// Base for resolving a relative CLI-supplied path
    pub cwd: PathBuf,
    /// Home directory for `~/` expansion
    pub home_dir: PathBuf,
}

impl LayoutResolver {
    /// Build a resolver from the real environment and global config
    pub fn from_environment() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/"));
        let global_config_dir = home.join(".config").join("wisp");
        let global_config_layout = crate::config::load_global_config()
            .and_then(|c| c.zellij)
            .and_then(|z| z.layout);

        Self {
            global_layouts_dir: home.join(".config").join("zellij").join("layouts"),
            global_config_dir,
            global_config_layout,
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            home_dir: home,
        }
    }

    fn expand_tilde(&self, value: &str) -> PathBuf {
        match value.strip_prefix("~/") {
            Some(rest) => self.home_dir.join(rest),
            None => PathBuf::from(value),
        }
    }

    fn global_default_path(&self) -> PathBuf {
        self.global_layouts_dir.join(GLOBAL_DEFAULT_LAYOUT)
    }

    /// Resolve the layout to use.
    ///
    /// Priority order, first match wins:
    /// 1. CLI flag — must exist, otherwise fatal.
    /// 2. Project config `zellij.layout` — reserved literals `builtin` /
    ///    `global`; otherwise must exist, fatal with guidance if not.
    /// 3. Project default `.zellij/default.kdl` — skipped if absent.
    /// 4. Global config layout — reserved literal `builtin`; missing file
    ///    falls through (advisory, never fatal).
    /// 5. Global default `~/.config/zellij/layouts/wisp.kdl` — skipped if
    ///    absent.
    /// 6. No zellij config at all → prompt the operator; config present but
    ///    without a layout → built-in, no re-prompting.
    pub fn resolve(
        &self,
        cli_path: Option<&str>,
        project_config: Option<&ZellijConfig>,
        git_root: &Path,
    ) -> Result<LayoutResolution, WispError> {
        // 1. CLI flag
        if let Some(cli_path) = cli_path {
            let candidate = self.expand_tilde(cli_path);
            let resolved = if candidate.is_absolute() {
                candidate
            } else {
                self.cwd.join(candidate)
            };
            if !resolved.is_file() {
                return Err(WispError::LayoutNotFound {
                    path: cli_path.to_string(),
                    guidance: String::new(),
                });
            }
            return Ok(LayoutResolution {
                path: Some(resolved),
                source: LayoutSource::Cli,
            });
        }

        // 2. Project config
        if let Some(layout_value) = project_config.and_then(|c| c.layout.as_deref()) {
            if layout_value == LAYOUT_VALUE_BUILTIN {
                return Ok(LayoutResolution::builtin());
            }
            if layout_value == LAYOUT_VALUE_GLOBAL {
                let global_default = self.global_default_path();
                if global_default.is_file() {
                    return Ok(LayoutResolution {
                        path: Some(global_default),
                        source: LayoutSource::GlobalDefault,
                    });
                }
                return Ok(LayoutResolution::builtin());
            }

            let candidate = self.expand_tilde(layout_value);
            let resolved = if candidate.is_absolute() {
                candidate
            } else {
                git_root.join(candidate)
            };
            if !resolved.is_file() {
                return Err(WispError::LayoutNotFound {
                    path: layout_value.to_string(),
                    guidance: format!(
                        "\nRun 'wisp zellij init' to create a layout, or remove the layout \
                         setting from {}.",
                        crate::config::PROJECT_CONFIG_FILE
                    ),
                });
            }
            return Ok(LayoutResolution {
                path: Some(resolved),
                source: LayoutSource::ProjectConfig,
            });
        }

        // 3. Project default
        let project_default = git_root.join(PROJECT_LAYOUT_DIR).join(PROJECT_DEFAULT_LAYOUT);
        if project_default.is_file() {
            return Ok(LayoutResolution {
                path: Some(project_default),
                source: LayoutSource::ProjectDefault,
            });
        }

        // 4. Global config (advisory: a dangling path falls through)
        if let Some(layout_value) = self.global_config_layout.as_deref() {
            if layout_value == LAYOUT_VALUE_BUILTIN {
                return Ok(LayoutResolution::builtin());
            }
            let candidate = self.expand_tilde(layout_value);
            let resolved = if candidate.is_absolute() {
                candidate
            } else {
                self.global_config_dir.join(candidate)
            };
            if resolved.is_file() {
                return Ok(LayoutResolution {
                    path: Some(resolved),
                    source: LayoutSource::GlobalConfig,
                });
            }
        }

        // 5. Global default
        let global_default = self.global_default_path();
        if global_default.is_file() {
            return Ok(LayoutResolution {
                path: Some(global_default),
                source: LayoutSource::GlobalDefault,
            });
        }

        // 6. Nothing found
        if project_config.is_none() {
            return Ok(LayoutResolution {
                path: None,
                source: LayoutSource::PromptNeeded,
            });
        }
        Ok(LayoutResolution::builtin())
    }

    /// Turn the operator's setup choice into a concrete resolution,
    /// creating layout files where the choice asks for them.
    pub fn apply_setup_choice(
        &self,
        choice: SetupChoice,
        git_root: &Path,
    ) -> Result<LayoutResolution, WispError> {
        match choice {
            SetupChoice::Builtin | SetupChoice::Skip => Ok(LayoutResolution::builtin()),
            SetupChoice::CreateProject => {
                let result = self.init_layout(&InitLayoutOptions {
                    git_root: git_root.to_path_buf(),
                    global: false,
                    name: None,
                    force: false,
                })?;
                Ok(LayoutResolution {
                    path: Some(result.layout_path),
                    source: LayoutSource::ProjectDefault,
                })
            }
            SetupChoice::CreateGlobal => {
                let result = self.init_layout(&InitLayoutOptions {
                    git_root: git_root.to_path_buf(),
                    global: true,
                    name: None,
                    force: false,
                })?;
                Ok(LayoutResolution {
                    path: Some(result.layout_path),
                    source: LayoutSource::GlobalDefault,
                })
            }
        }
    }

    /// Write a layout template to the project or global location
    pub fn init_layout(&self, options: &InitLayoutOptions) -> Result<InitLayoutResult, WispError> {
        let default_name = if options.global { "wisp" } else { "default" };
        let name = options.name.as_deref().unwrap_or(default_name);
        let file_name = if name.ends_with(".kdl") {
            name.to_string()
        } else {
            format!("{}.kdl", name)
        };

        let layout_dir = if options.global {
            self.global_layouts_dir.clone()
        } else {
            options.git_root.join(PROJECT_LAYOUT_DIR)
        };
        let layout_path = layout_dir.join(file_name);

        if layout_path.exists() && !options.force {
            return Ok(InitLayoutResult {
                layout_path,
                created: false,
                already_exists: true,
            });
        }

        std::fs::create_dir_all(&layout_dir)?;
        std::fs::write(&layout_path, DEFAULT_LAYOUT_TEMPLATE)?;

        Ok(InitLayoutResult {
            layout_path,
            created: true,
            already_exists: false,
        })
    }

    /// Enumerate `.kdl` layouts in the project and global directories
    pub fn list_layouts(&self, git_root: &Path) -> LayoutListing {
        LayoutListing {
            project: list_kdl_files(&git_root.join(PROJECT_LAYOUT_DIR)),
            global: list_kdl_files(&self.global_layouts_dir),
        }
    }
}

/// Options for creating a persisted layout file
#[derive(Debug)]
pub struct InitLayoutOptions {
    pub git_root: PathBuf,
    pub global: bool,
    pub name: Option<String>,
    pub force: bool,
}

/// Result of persisted layout creation
#[derive(Debug)]
pub struct InitLayoutResult {
    pub layout_path: PathBuf,
    pub created: bool,
    pub already_exists: bool,
}

/// Layouts discovered in the project and global directories
#[derive(Debug)]
pub struct LayoutListing {
    pub project: Vec<LayoutInfo>,
    pub global: Vec<LayoutInfo>,
}

#[derive(Debug)]
pub struct LayoutInfo {
    pub name: String,
    pub path: PathBuf,
}

fn list_kdl_files(dir: &Path) -> Vec<LayoutInfo> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut layouts: Vec<LayoutInfo> = entries
        .flatten()
        .filter(|entry| {
            entry.path().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "kdl")
        })
        .map(|entry| LayoutInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        })
        .collect();
    layouts.sort_by(|a, b| a.name.cmp(&b.name));
    layouts
}

/// Template written by `wisp zellij init`: agent pane on the left, two
/// stacked shell panes on the right, tab/status bars around them.
pub const DEFAULT_LAYOUT_TEMPLATE: &str = r#"// Wisp zellij layout.
// Customize this file to match your workflow; the full layout reference is
// at https://zellij.dev/documentation/layouts
layout {
    // When launched via 'wisp launch', the working directory is the
    // worktree path. Uncomment to pin a different one:
    // cwd "/path/to/your/project"

    pane size=1 borderless=true {
        plugin location="tab-bar"
    }

    pane split_direction="vertical" {
        // AI agent pane, focused by default. Swap the command to use a
        // different assistant.
        pane size="50%" focus=true {
            name "agent"
            command "claude"
            // args "--model" "opus"
        }

        pane size="50%" split_direction="horizontal" {
            pane {
                name "shell"
            }
            pane {
                name "shell2"
            }
        }
    }

    pane size=2 borderless=true {
        plugin location="status-bar"
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZellijConfig;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _home: TempDir,
        _project: TempDir,
        resolver: LayoutResolver,
        git_root: PathBuf,
    }

    fn fixture() -> Fixture {
        let home = tempfile::tempdir().expect("tempdir");
        let project = tempfile::tempdir().expect("tempdir");
        let git_root = project.path().to_path_buf();
        let resolver = LayoutResolver {
            global_layouts_dir: home.path().join(".config/zellij/layouts"),
            global_config_dir: home.path().join(".config/wisp"),
            global_config_layout: None,
            cwd: git_root.clone(),
            home_dir: home.path().to_path_buf(),
        };
        Fixture {
            _home: home,
            _project: project,
            resolver,
            git_root,
        }
    }

    fn zellij_config(layout: Option<&str>) -> ZellijConfig {
        ZellijConfig {
            layout: layout.map(|s| s.to_string()),
            agent: None,
        }
    }

    #[test]
    fn test_cli_path_wins_and_must_exist() {
        let f = fixture();
        let layout = f.git_root.join("custom.kdl");
        fs::write(&layout, "layout {}").expect("write");

        // Even with a project default present, the CLI flag wins
        fs::create_dir_all(f.git_root.join(PROJECT_LAYOUT_DIR)).expect("mkdir");
        fs::write(
            f.git_root.join(PROJECT_LAYOUT_DIR).join(PROJECT_DEFAULT_LAYOUT),
            "layout {}",
        )
        .expect("write");

        let resolution = f
            .resolver
            .resolve(Some("custom.kdl"), None, &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::Cli);
        assert_eq!(resolution.path.as_deref(), Some(layout.as_path()));
    }

    #[test]
    fn test_cli_path_missing_is_fatal_no_fallback() {
        let f = fixture();
        // A perfectly good project default exists, but the CLI tier must not
        // fall through to it
        fs::create_dir_all(f.git_root.join(PROJECT_LAYOUT_DIR)).expect("mkdir");
        fs::write(
            f.git_root.join(PROJECT_LAYOUT_DIR).join(PROJECT_DEFAULT_LAYOUT),
            "layout {}",
        )
        .expect("write");

        let result = f.resolver.resolve(Some("missing.kdl"), None, &f.git_root);
        assert!(matches!(result, Err(WispError::LayoutNotFound { .. })));
    }

    #[test]
    fn test_project_config_layout() {
        let f = fixture();
        fs::create_dir_all(f.git_root.join("layouts")).expect("mkdir");
        fs::write(f.git_root.join("layouts/dev.kdl"), "layout {}").expect("write");

        let config = zellij_config(Some("layouts/dev.kdl"));
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::ProjectConfig);
        assert_eq!(
            resolution.path.as_deref(),
            Some(f.git_root.join("layouts/dev.kdl").as_path())
        );
    }

    #[test]
    fn test_project_config_missing_layout_is_fatal_with_guidance() {
        let f = fixture();
        let config = zellij_config(Some("layouts/gone.kdl"));
        let result = f.resolver.resolve(None, Some(&config), &f.git_root);
        match result {
            Err(WispError::LayoutNotFound { path, guidance }) => {
                assert_eq!(path, "layouts/gone.kdl");
                assert!(guidance.contains("wisp zellij init"));
            }
            other => panic!("expected LayoutNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_project_config_builtin_literal() {
        let f = fixture();
        let config = zellij_config(Some(LAYOUT_VALUE_BUILTIN));
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::Builtin);
        assert!(resolution.path.is_none());
    }

    #[test]
    fn test_project_config_global_literal() {
        let f = fixture();
        let config = zellij_config(Some(LAYOUT_VALUE_GLOBAL));

        // Global default absent: falls to builtin
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::Builtin);

        // Global default present: used
        fs::create_dir_all(&f.resolver.global_layouts_dir).expect("mkdir");
        fs::write(
            f.resolver.global_layouts_dir.join(GLOBAL_DEFAULT_LAYOUT),
            "layout {}",
        )
        .expect("write");
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::GlobalDefault);
    }

    #[test]
    fn test_project_default_detected() {
        let f = fixture();
        fs::create_dir_all(f.git_root.join(PROJECT_LAYOUT_DIR)).expect("mkdir");
        let default = f.git_root.join(PROJECT_LAYOUT_DIR).join(PROJECT_DEFAULT_LAYOUT);
        fs::write(&default, "layout {}").expect("write");

        let config = zellij_config(None);
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::ProjectDefault);
        assert_eq!(resolution.path.as_deref(), Some(default.as_path()));
    }

    #[test]
    fn test_global_config_missing_file_falls_through() {
        let mut f = fixture();
        // Global config names a layout that does not exist: advisory, so
        // resolution continues instead of failing
        f.resolver.global_config_layout = Some("stale.kdl".to_string());

        fs::create_dir_all(&f.resolver.global_layouts_dir).expect("mkdir");
        fs::write(
            f.resolver.global_layouts_dir.join(GLOBAL_DEFAULT_LAYOUT),
            "layout {}",
        )
        .expect("write");

        let config = zellij_config(None);
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::GlobalDefault);
    }

    #[test]
    fn test_global_config_layout_used_when_present() {
        let mut f = fixture();
        fs::create_dir_all(&f.resolver.global_config_dir).expect("mkdir");
        fs::write(f.resolver.global_config_dir.join("mine.kdl"), "layout {}").expect("write");
        f.resolver.global_config_layout = Some("mine.kdl".to_string());

        let config = zellij_config(None);
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::GlobalConfig);
    }

    #[test]
    fn test_global_config_tilde_expansion() {
        let mut f = fixture();
        fs::create_dir_all(f.resolver.home_dir.join("layouts")).expect("mkdir");
        fs::write(f.resolver.home_dir.join("layouts/home.kdl"), "layout {}").expect("write");
        f.resolver.global_config_layout = Some("~/layouts/home.kdl".to_string());

        let resolution = f
            .resolver
            .resolve(None, Some(&zellij_config(None)), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::GlobalConfig);
        assert_eq!(
            resolution.path.as_deref(),
            Some(f.resolver.home_dir.join("layouts/home.kdl").as_path())
        );
    }

    #[test]
    fn test_no_config_at_all_prompts() {
        let f = fixture();
        let resolution = f.resolver.resolve(None, None, &f.git_root).expect("resolve");
        assert_eq!(resolution.source, LayoutSource::PromptNeeded);
        assert!(resolution.path.is_none());
    }

    #[test]
    fn test_config_without_layout_is_builtin_not_prompt() {
        let f = fixture();
        let config = zellij_config(None);
        let resolution = f
            .resolver
            .resolve(None, Some(&config), &f.git_root)
            .expect("resolve");
        assert_eq!(resolution.source, LayoutSource::Builtin);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let f = fixture();
        let first = f.resolver.resolve(None, None, &f.git_root).expect("resolve");
        let second = f.resolver.resolve(None, None, &f.git_root).expect("resolve");
        assert_eq!(first, second);
    }

    #[test]
    fn test_init_layout_project_and_global() {
        let f = fixture();

        let result = f
            .resolver
            .init_layout(&InitLayoutOptions {
                git_root: f.git_root.clone(),
                global: false,
                name: None,
                force: false,
            })
            .expect("init");
        assert!(result.created);
        assert_eq!(
            result.layout_path,
            f.git_root.join(PROJECT_LAYOUT_DIR).join(PROJECT_DEFAULT_LAYOUT)
        );
        assert!(result.layout_path.is_file());

        let result = f
            .resolver
            .init_layout(&InitLayoutOptions {
                git_root: f.git_root.clone(),
                global: true,
                name: None,
                force: false,
            })
            .expect("init");
        assert!(result.created);
        assert_eq!(
            result.layout_path,
            f.resolver.global_layouts_dir.join(GLOBAL_DEFAULT_LAYOUT)
        );
    }

    #[test]
    fn test_init_layout_refuses_overwrite_without_force() {
        let f = fixture();
        let options = InitLayoutOptions {
            git_root: f.git_root.clone(),
            global: false,
            name: Some("dev".to_string()),
            force: false,
        };

        let first = f.resolver.init_layout(&options).expect("init");
        assert!(first.created);

        let second = f.resolver.init_layout(&options).expect("init");
        assert!(!second.created);
        assert!(second.already_exists);

        let forced = f
            .resolver
            .init_layout(&InitLayoutOptions {
                git_root: f.git_root.clone(),
                global: false,
                name: Some("dev".to_string()),
                force: true,
            })
            .expect("init");
        assert!(forced.created);
    }

    #[test]
    fn test_list_layouts() {
        let f = fixture();
        fs::create_dir_all(f.git_root.join(PROJECT_LAYOUT_DIR)).expect("mkdir");
        fs::write(
            f.git_root.join(PROJECT_LAYOUT_DIR).join("default.kdl"),
            "layout {}",
        )
        .expect("write");
        fs::write(
            f.git_root.join(PROJECT_LAYOUT_DIR).join("notes.txt"),
            "not a layout",
        )
        .expect("write");

        let listing = f.resolver.list_layouts(&f.git_root);
        assert_eq!(listing.project.len(), 1);
        assert_eq!(listing.project[0].name, "default.kdl");
        assert!(listing.global.is_empty());
    }

    struct Scripted(SetupChoice);
    impl SetupPrompt for Scripted {
        fn choose(&self) -> Result<SetupChoice, WispError> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_apply_setup_choice() {
        let f = fixture();

        let prompt = Scripted(SetupChoice::Skip);
        let choice = prompt.choose().expect("choose");
        let resolution = f
            .resolver
            .apply_setup_choice(choice, &f.git_root)
            .expect("apply");
        assert_eq!(resolution.source, LayoutSource::Builtin);

        let resolution = f
            .resolver
            .apply_setup_choice(SetupChoice::CreateProject, &f.git_root)
            .expect("apply");
        assert_eq!(resolution.source, LayoutSource::ProjectDefault);
        assert!(resolution.path.expect("path").is_file());

        let resolution = f
            .resolver
            .apply_setup_choice(SetupChoice::CreateGlobal, &f.git_root)
            .expect("apply");
        assert_eq!(resolution.source, LayoutSource::GlobalDefault);
        assert!(resolution.path.expect("path").is_file());
    }
}
