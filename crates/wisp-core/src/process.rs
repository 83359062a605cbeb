//! External process execution
//!
//! Foundation for everything that shells out: git, zellij, tmux, terminal
//! emulators. Classifies child termination into spawn failure, signal
//! termination, and nonzero exit; zero is the only success. Never exits the
//! calling process itself.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::WispError;

/// Options for running an external command
#[derive(Debug, Default)]
pub struct RunOptions {
    /// Working directory for the child
    pub cwd: Option<std::path::PathBuf>,
    /// Extra environment variables, layered over the inherited environment
    pub env: Vec<(String, String)>,
    /// Inherit the caller's stdin/stdout/stderr. Required for shells,
    /// editors, and agents that need a real TTY.
    pub interactive: bool,
}

impl RunOptions {
    pub fn interactive() -> Self {
        Self {
            interactive: true,
            ..Self::default()
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self {
            cwd: Some(dir.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

/// Successful completion of a child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSuccess {
    /// Always zero; kept so callers can propagate it explicitly
    pub exit_code: i32,
}

/// Captured output of a non-interactive command
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

fn classify_status(command: &str, status: std::process::ExitStatus) -> Result<RunSuccess, WispError> {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(WispError::ProcessSignal {
                command: command.to_string(),
                signal,
            });
        }
    }

    match status.code() {
        Some(0) => Ok(RunSuccess { exit_code: 0 }),
        Some(code) => Err(WispError::ProcessExecution {
            command: command.to_string(),
            code,
        }),
        // No code and no signal should not happen; treat as failure
        None => Err(WispError::ProcessExecution {
            command: command.to_string(),
            code: -1,
        }),
    }
}

fn build_command(command: &str, args: &[String], options: &RunOptions) -> Command {
    let mut cmd = Command::new(command);
    cmd.args(args);
    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }
    for (key, value) in &options.env {
        cmd.env(key, value);
    }
    cmd
}

/// Run a command to completion.
///
/// Interactive commands inherit the caller's stdio; otherwise stdout/stderr
/// are discarded. Blocks until the child exits.
pub fn run(command: &str, args: &[String], options: &RunOptions) -> Result<RunSuccess, WispError> {
    let mut cmd = build_command(command, args, options);
    if options.interactive {
        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
    } else {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
    }

    let status = cmd.status().map_err(|e| WispError::ProcessSpawn {
        command: command.to_string(),
        reason: e.to_string(),
    })?;

    classify_status(command, status)
}

/// Run a command and capture its stdout/stderr.
///
/// Nonzero exit still returns the captured output inside the error path via
/// [`run_captured_checked`]; this variant errors like [`run`] but keeps the
/// streams for the caller.
pub fn run_captured(
    command: &str,
    args: &[String],
    options: &RunOptions,
) -> Result<CapturedOutput, WispError> {
    let (output, _) = run_captured_checked(command, args, options)?;
    Ok(output)
}

/// Run a command, capture output, and report whether it exited zero.
///
/// Spawn failures and signal terminations are still errors; a nonzero exit
/// is returned as data so probes can fail open on it.
pub fn run_captured_checked(
    command: &str,
    args: &[String],
    options: &RunOptions,
) -> Result<(CapturedOutput, Result<RunSuccess, WispError>), WispError> {
    let mut cmd = build_command(command, args, options);
    cmd.stdin(Stdio::null());

    let output = cmd.output().map_err(|e| WispError::ProcessSpawn {
        command: command.to_string(),
        reason: e.to_string(),
    })?;

    let captured = CapturedOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    let status = classify_status(command, output.status);

    match status {
        Ok(success) => Ok((captured, Ok(success))),
        Err(e @ WispError::ProcessExecution { .. }) => Ok((captured, Err(e))),
        Err(e) => Err(e),
    }
}

/// Spawn a command and return without waiting for it.
///
/// Used for terminal emulators that take over their own window; the child
/// outlives this invocation.
pub fn spawn_detached(
    command: &str,
    args: &[String],
    options: &RunOptions,
) -> Result<(), WispError> {
    let mut cmd = build_command(command, args, options);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    cmd.spawn().map_err(|e| WispError::ProcessSpawn {
        command: command.to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Convenience for building owned argument vectors
pub fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}
