//! Process execution through the system shell, with streamed output.

use super::{CommandExecutor, CommandSpec, ExecError, ExecOutput};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

/// Executor backed by `tokio::process`.
///
/// Output lines are forwarded to `tracing` as they arrive (`info` when the
/// build is verbose, `debug` otherwise) and collected into [`ExecOutput`].
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    shell: Option<String>,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `shell` instead of the platform default for inline commands and scripts.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: Some(shell.into()),
        }
    }

    fn shell_program(&self) -> String {
        match &self.shell {
            Some(shell) => shell.clone(),
            None if cfg!(windows) => "cmd.exe".to_string(),
            None => "/bin/sh".to_string(),
        }
    }

    /// Flag that makes the shell treat its next argument as a command string.
    fn inline_args(shell: &str) -> Vec<&'static str> {
        if shell.contains("powershell") || shell.contains("pwsh") {
            vec!["-NoProfile", "-Command"]
        } else if shell.contains("cmd") {
            vec!["/C"]
        } else {
            vec!["-c"]
        }
    }

    /// Flags that make the shell run its next argument as a script file.
    fn script_args(shell: &str) -> Vec<&'static str> {
        if shell.contains("powershell") || shell.contains("pwsh") {
            vec!["-NoProfile", "-File"]
        } else if shell.contains("cmd") {
            vec!["/C"]
        } else {
            vec![]
        }
    }

    async fn spawn(
        &self,
        mut command: Command,
        command_line: String,
        verbose: bool,
    ) -> Result<ExecOutput, ExecError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if verbose {
            info!(command = %command_line, "Running");
        } else {
            debug!(command = %command_line, "Running");
        }

        let mut child = command.spawn().map_err(|source| ExecError::Spawn {
            command: command_line.clone(),
            source,
        })?;

        let (stdout, stderr) = tokio::join!(
            forward_lines(child.stdout.take(), "stdout", verbose),
            forward_lines(child.stderr.take(), "stderr", verbose),
        );

        let status = child.wait().await.map_err(|source| ExecError::Output {
            command: command_line.clone(),
            source,
        })?;

        let output = ExecOutput {
            code: status.code(),
            stdout: stdout.map_err(|source| ExecError::Output {
                command: command_line.clone(),
                source,
            })?,
            stderr: stderr.map_err(|source| ExecError::Output {
                command: command_line.clone(),
                source,
            })?,
        };

        if !status.success() {
            return Err(ExecError::NonZeroExit {
                command: command_line,
                code: output.code,
                stderr: output.stderr,
            });
        }

        Ok(output)
    }
}

async fn forward_lines<R>(
    reader: Option<R>,
    stream: &'static str,
    verbose: bool,
) -> std::io::Result<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Ok(String::new());
    };

    let mut reader = BufReader::new(reader);
    let mut collected = String::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\r', '\n']);
        if verbose {
            info!(stream, "{}", line);
        } else {
            debug!(stream, "{}", line);
        }
        collected.push_str(line);
        collected.push('\n');
    }

    Ok(collected)
}

#[async_trait]
impl CommandExecutor for ShellExecutor {
    async fn exec(
        &self,
        command: &str,
        working_dir: &Path,
        verbose: bool,
    ) -> Result<ExecOutput, ExecError> {
        let shell = self.shell_program();
        let mut cmd = Command::new(&shell);
        cmd.args(Self::inline_args(&shell))
            .arg(command)
            .current_dir(working_dir);

        self.spawn(cmd, command.to_string(), verbose).await
    }

    async fn exec_file(
        &self,
        script: &Path,
        working_dir: &Path,
        verbose: bool,
    ) -> Result<ExecOutput, ExecError> {
        let script = if script.is_absolute() {
            script.to_path_buf()
        } else {
            working_dir.join(script)
        };

        if !tokio::fs::try_exists(&script).await.unwrap_or(false) {
            return Err(ExecError::ScriptNotFound(script));
        }

        let shell = self.shell_program();
        let mut cmd = Command::new(&shell);
        cmd.args(Self::script_args(&shell))
            .arg(&script)
            .current_dir(working_dir);

        self.spawn(cmd, script.display().to_string(), verbose).await
    }

    async fn run(&self, spec: &CommandSpec, verbose: bool) -> Result<ExecOutput, ExecError> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).current_dir(&spec.cwd).envs(&spec.env);

        self.spawn(cmd, spec.display(), verbose).await
    }
}
