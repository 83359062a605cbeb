//! Temporary layout generation
//!
//! When no persisted layout resolves, a session definition is synthesized on
//! the fly: agent pane on the left, two shell panes stacked on the right,
//! everything rooted at the worktree. The file lives in the OS temp
//! directory and is released on every exit path of the invocation.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::WispError;

/// Inputs for synthesizing a layout
#[derive(Debug)]
pub struct TemporaryLayoutOptions<'a> {
    pub worktree_path: &'a Path,
    pub worktree_name: &'a str,
    pub agent_command: &'a str,
    pub agent_args: &'a [String],
    /// When false the agent slot becomes a plain shell pane with identical
    /// geometry, so toggling never changes the session's visual structure
    pub include_agent: bool,
}

/// A resolved layout file, either persisted or generated.
///
/// Temporary handles delete their file on [`dispose`](Self::dispose) and on
/// drop; persisted handles never delete anything.
#[derive(Debug)]
pub struct LayoutHandle {
    path: PathBuf,
    is_temporary: bool,
}

impl LayoutHandle {
    /// Wrap an operator-authored layout; disposal is a no-op
    pub fn persisted(path: PathBuf) -> Self {
        Self {
            path,
            is_temporary: false,
        }
    }

    /// Synthesize a layout and write it to the temp directory.
    ///
    /// The file name carries the worktree name plus a uniqueness token so
    /// concurrent invocations for different worktrees never collide.
    pub fn generate(options: &TemporaryLayoutOptions<'_>) -> Result<Self, WispError> {
        let content = render_layout(options);

        let sanitized = options.worktree_name.replace('/', "-");
        let token = Uuid::new_v4().simple();
        let path = std::env::temp_dir().join(format!("wisp-{}-{}.kdl", sanitized, token));

        std::fs::write(&path, content)?;

        Ok(Self {
            path,
            is_temporary: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    /// Delete the generated file.
    ///
    /// Only paths under the temp root are ever unlinked, so this can never
    /// be pointed at a persisted layout. An already-absent file is fine;
    /// cleanup failures never mask the primary outcome of the command.
    pub fn dispose(&self) {
        if !self.is_temporary {
            return;
        }
        if !self.path.starts_with(std::env::temp_dir()) {
            return;
        }
        let _ = std::fs::remove_file(&self.path);
    }
}

impl Drop for LayoutHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn render_layout(options: &TemporaryLayoutOptions<'_>) -> String {
    let top_pane = if options.include_agent {
        let args_line = if options.agent_args.is_empty() {
            String::new()
        } else {
            let quoted: Vec<String> = options
                .agent_args
                .iter()
                .map(|a| format!("\"{}\"", a))
                .collect();
            format!("\n            args {}", quoted.join(" "))
        };
        format!(
            "        pane size=\"50%\" focus=true {{\n            name \"agent\"\n            command \"{}\"{}\n        }}",
            options.agent_command, args_line
        )
    } else {
        // Same slot, same geometry, just a shell
        "        pane size=\"50%\" focus=true {\n            name \"shell\"\n        }".to_string()
    };

    format!(
        r#"// Wisp generated layout for {name}
layout {{
    cwd "{cwd}"

    pane size=1 borderless=true {{
        plugin location="tab-bar"
    }}

    pane split_direction="vertical" {{
{top_pane}
        pane size="50%" split_direction="horizontal" {{
            pane {{
                name "shell"
            }}
            pane {{
                name "shell2"
            }}
        }}
    }}

    pane size=2 borderless=true {{
        plugin location="status-bar"
    }}
}}
"#,
        name = options.worktree_name,
        cwd = options.worktree_path.display(),
        top_pane = top_pane,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options<'a>(include_agent: bool, args: &'a [String]) -> TemporaryLayoutOptions<'a> {
        TemporaryLayoutOptions {
            worktree_path: Path::new("/work/feature-x"),
            worktree_name: "feature-x",
            agent_command: "claude",
            agent_args: args,
            include_agent,
        }
    }

    #[test]
    fn test_generate_writes_under_temp_root() {
        let handle = LayoutHandle::generate(&options(true, &[])).expect("generate");
        assert!(handle.is_temporary());
        assert!(handle.path().starts_with(std::env::temp_dir()));
        assert!(handle.path().is_file());
        let name = handle.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("wisp-feature-x-"));
        assert!(name.ends_with(".kdl"));
    }

    #[test]
    fn test_dispose_round_trip_and_double_dispose() {
        let handle = LayoutHandle::generate(&options(true, &[])).expect("generate");
        let path = handle.path().to_path_buf();
        assert!(path.is_file());

        handle.dispose();
        assert!(!path.exists());

        // Second dispose on the same handle must not raise
        handle.dispose();
        drop(handle);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_disposes() {
        let path = {
            let handle = LayoutHandle::generate(&options(false, &[])).expect("generate");
            handle.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_persisted_is_never_deleted() {
        let temp = tempfile::tempdir().expect("tempdir");
        let layout = temp.path().join("default.kdl");
        std::fs::write(&layout, "layout {}").expect("write");

        let handle = LayoutHandle::persisted(layout.clone());
        assert!(!handle.is_temporary());
        handle.dispose();
        drop(handle);
        assert!(layout.is_file());
    }

    #[test]
    fn test_agent_pane_content() {
        let args = vec!["--model".to_string(), "opus".to_string()];
        let rendered = render_layout(&options(true, &args));
        assert!(rendered.contains("command \"claude\""));
        assert!(rendered.contains("args \"--model\" \"opus\""));
        assert!(rendered.contains("cwd \"/work/feature-x\""));
    }

    #[test]
    fn test_no_agent_keeps_geometry() {
        let with_agent = render_layout(&options(true, &[]));
        let without_agent = render_layout(&options(false, &[]));

        assert!(!without_agent.contains("command \"claude\""));
        assert!(without_agent.contains("name \"shell\""));
        // Identical pane structure either way
        for fragment in [
            "pane size=\"50%\" focus=true",
            "pane size=\"50%\" split_direction=\"horizontal\"",
            "plugin location=\"tab-bar\"",
            "plugin location=\"status-bar\"",
        ] {
            assert!(with_agent.contains(fragment));
            assert!(without_agent.contains(fragment));
        }
        assert_eq!(
            with_agent.matches("pane").count(),
            without_agent.matches("pane").count()
        );
    }

    #[test]
    fn test_unique_names_across_invocations() {
        let first = LayoutHandle::generate(&options(true, &[])).expect("generate");
        let second = LayoutHandle::generate(&options(true, &[])).expect("generate");
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_slash_in_name_sanitized() {
        let opts = TemporaryLayoutOptions {
            worktree_path: Path::new("/work/wt"),
            worktree_name: "feature/nested",
            agent_command: "claude",
            agent_args: &[],
            include_agent: true,
        };
        let handle = LayoutHandle::generate(&opts).expect("generate");
        let name = handle.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("wisp-feature-nested-"));
    }
}
