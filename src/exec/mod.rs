//! Subprocess execution used by strategies and the override path
//!
//! [`CommandExecutor`] is the seam between the orchestrator and the
//! operating system. [`ShellExecutor`] is the real implementation; tests swap
//! in recording executors.

mod shell;

pub use shell::ShellExecutor;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn { command: String, source: io::Error },

    #[error("Command '{command}' {}", exit_label(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Script file not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("Failed to prepare working directory {path}: {source}")]
    WorkingDir { path: PathBuf, source: io::Error },

    #[error("Failed to collect output of '{command}': {source}")]
    Output { command: String, source: io::Error },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A program invocation with explicit arguments, no shell involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: BTreeMap<String, String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Human readable command line, for logs and errors
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs commands on behalf of the orchestrator and the strategies.
///
/// Implementations must not return before the process has exited. A non-zero
/// exit is an error, never an `Ok` with a failing code.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Runs an inline shell command in `working_dir`.
    async fn exec(
        &self,
        command: &str,
        working_dir: &Path,
        verbose: bool,
    ) -> Result<ExecOutput, ExecError>;

    /// Runs a script file in `working_dir`. Relative paths resolve against `working_dir`.
    async fn exec_file(
        &self,
        script: &Path,
        working_dir: &Path,
        verbose: bool,
    ) -> Result<ExecOutput, ExecError>;

    /// Runs a program with explicit arguments.
    async fn run(&self, spec: &CommandSpec, verbose: bool) -> Result<ExecOutput, ExecError>;
}
