// runner.rs - Process execution seam
// Purpose: Build argument lists, spawn external tools with an explicit
//          search path, and turn non-zero exits into errors.

use crate::error::{Error, Result};
use crate::search_path::SearchPath;
use async_trait::async_trait;
use colored::*;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;

/// A program plus its arguments. Built by the pipeline and the installers,
/// executed by a [`ProcessRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Value following `flag`, e.g. the `-o` target.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// How a child process ended. `code` is `None` when killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub code: Option<i32>,
}

impl Exit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub exit: Exit,
    pub stdout: String,
}

/// Spawns external commands. `Err` means the process could not be started
/// at all; a started process that fails is reported through [`Exit`].
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run with inherited stdio and wait for exit.
    async fn status(&self, cmd: &CommandSpec, path: &SearchPath) -> std::io::Result<Exit>;

    /// Run quietly, collecting stdout.
    async fn capture(&self, cmd: &CommandSpec, path: &SearchPath) -> std::io::Result<Captured>;
}

/// Echo the command, run it, and fail on spawn errors or non-zero exit.
pub async fn run_checked(
    runner: &dyn ProcessRunner,
    cmd: &CommandSpec,
    path: &SearchPath,
) -> Result<()> {
    println!("{}", format!("[+] Running: {}", cmd).cyan());

    let exit = runner.status(cmd, path).await.map_err(|source| Error::Spawn {
        command: cmd.to_string(),
        source,
    })?;

    if exit.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            command: cmd.to_string(),
            code: exit.code,
        })
    }
}

/// Quiet probe: `true` only if the command starts and exits 0.
pub async fn probe(runner: &dyn ProcessRunner, cmd: &CommandSpec, path: &SearchPath) -> bool {
    matches!(runner.capture(cmd, path).await, Ok(c) if c.exit.success())
}

// ═══════════════════════════════════════════════════════════════════════════
// PRODUCTION RUNNER
// ═══════════════════════════════════════════════════════════════════════════

/// Runs real processes through `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(cmd: &CommandSpec, path: &SearchPath) -> Command {
        // Resolve against the explicit path so lookup never depends on the
        // parent's own PATH.
        let program = path
            .resolve(&cmd.program)
            .map(|p| p.into_os_string())
            .unwrap_or_else(|| cmd.program.clone().into());

        let mut command = Command::new(program);
        command.args(&cmd.args).env("PATH", path.to_env_value());
        command
    }
}

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn status(&self, cmd: &CommandSpec, path: &SearchPath) -> std::io::Result<Exit> {
        let status = Self::command(cmd, path).status().await?;
        Ok(Exit { code: status.code() })
    }

    async fn capture(&self, cmd: &CommandSpec, path: &SearchPath) -> std::io::Result<Captured> {
        let output = Self::command(cmd, path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await?;

        Ok(Captured {
            exit: Exit {
                code: output.status.code(),
            },
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// TEST DOUBLE
// ═══════════════════════════════════════════════════════════════════════════
