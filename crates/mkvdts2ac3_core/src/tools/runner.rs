//! Gated execution of external commands.

use std::io::{self, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::logging::JobLog;

/// How external invocations are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Run every command normally.
    #[default]
    Execute,
    /// Print commands without executing anything that changes state.
    DryRun,
    /// Print each command and wait for operator acknowledgment first.
    StepConfirm,
}

/// Error from starting or waiting on an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be started.
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// I/O error while talking to a running tool.
    #[error("I/O error while running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool exited with a non-zero status.
    #[error("{tool} failed with exit code {exit_code}{message}")]
    Failed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The tool exceeded the configured timeout and was killed.
    #[error("{tool} timed out after {secs}s and was killed")]
    TimedOut { tool: String, secs: u64 },

    /// A pipe between two tools could not be set up.
    #[error("failed to connect {tool} output stream")]
    Pipe { tool: String },
}

impl ToolError {
    fn spawn(tool: &str, source: io::Error) -> Self {
        Self::Spawn {
            tool: tool.to_string(),
            source,
        }
    }

    fn io(tool: &str, source: io::Error) -> Self {
        Self::Io {
            tool: tool.to_string(),
            source,
        }
    }

    fn failed(tool: &str, exit_code: i32, stderr: &str) -> Self {
        let tail = stderr_tail(stderr);
        let message = if tail.is_empty() {
            String::new()
        } else {
            format!(": {}", tail)
        };
        Self::Failed {
            tool: tool.to_string(),
            exit_code,
            message,
        }
    }
}

/// Result type for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Whether a gated command actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The command executed and succeeded.
    Executed,
    /// Dry-run mode: the command was only printed.
    DryRun,
}

impl RunStatus {
    /// True when the command actually executed.
    pub fn executed(&self) -> bool {
        matches!(self, RunStatus::Executed)
    }
}

/// Runs external commands under the configured execution mode.
///
/// Read-only commands (`capture`) always execute, even in dry-run mode;
/// state-changing commands (`run`, `run_status`, `run_piped`) honor the mode
/// and echo the command line to the job log before dispatch.
pub struct ToolRunner {
    mode: ExecMode,
    timeout: Option<Duration>,
    log: Arc<JobLog>,
}

impl ToolRunner {
    /// Create a runner with the given mode and optional per-command timeout.
    pub fn new(mode: ExecMode, timeout: Option<Duration>, log: Arc<JobLog>) -> Self {
        Self { mode, timeout, log }
    }

    /// Current execution mode.
    pub fn mode(&self) -> ExecMode {
        self.mode
    }

    /// Run a read-only command and capture its stdout as UTF-8.
    ///
    /// Executes in every mode. Non-zero exit is an error.
    pub fn capture(&self, cmd: &mut Command) -> ToolResult<String> {
        let tool = tool_name(cmd);
        tracing::debug!("capturing output of `{}`", render_command(cmd));

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| ToolError::spawn(&tool, e))?;

        let mut stdout =
            child.stdout.take().ok_or_else(|| ToolError::Pipe {
                tool: tool.clone(),
            })?;
        let mut out = Vec::new();
        io::Read::read_to_end(&mut stdout, &mut out).map_err(|e| ToolError::io(&tool, e))?;

        let mut stderr = child.stderr.take().ok_or_else(|| ToolError::Pipe {
            tool: tool.clone(),
        })?;
        let mut err = Vec::new();
        io::Read::read_to_end(&mut stderr, &mut err).map_err(|e| ToolError::io(&tool, e))?;

        let status = self.wait(&mut child, &tool)?;
        if !status.success() {
            return Err(ToolError::failed(
                &tool,
                status.code().unwrap_or(-1),
                &String::from_utf8_lossy(&err),
            ));
        }

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Run a state-changing command. Non-zero exit is an error.
    pub fn run(&self, cmd: &mut Command) -> ToolResult<RunStatus> {
        match self.run_status(cmd)? {
            None => Ok(RunStatus::DryRun),
            Some(0) => Ok(RunStatus::Executed),
            Some(code) => Err(ToolError::failed(&tool_name(cmd), code, "")),
        }
    }

    /// Run a state-changing command and hand back the raw exit code.
    ///
    /// `None` means dry-run (nothing executed). Callers that treat some
    /// non-zero codes as warnings (mkvmerge exits 1 on warnings) use this
    /// instead of [`ToolRunner::run`].
    pub fn run_status(&self, cmd: &mut Command) -> ToolResult<Option<i32>> {
        let tool = tool_name(cmd);
        let line = render_command(cmd);
        self.log.command(&line);

        match self.mode {
            ExecMode::DryRun => return Ok(None),
            ExecMode::StepConfirm => wait_for_ack(),
            ExecMode::Execute => {}
        }

        let mut child = cmd.spawn().map_err(|e| ToolError::spawn(&tool, e))?;
        let status = self.wait(&mut child, &tool)?;
        Ok(Some(status.code().unwrap_or(-1)))
    }

    /// Run a decoder and an encoder as one pipeline, decoder stdout feeding
    /// encoder stdin. Both must exit zero.
    pub fn run_piped(&self, decoder: &mut Command, encoder: &mut Command) -> ToolResult<RunStatus> {
        let dec_tool = tool_name(decoder);
        let enc_tool = tool_name(encoder);
        let line = format!(
            "{} | {}",
            render_command(decoder),
            render_command(encoder)
        );
        self.log.command(&line);

        match self.mode {
            ExecMode::DryRun => return Ok(RunStatus::DryRun),
            ExecMode::StepConfirm => wait_for_ack(),
            ExecMode::Execute => {}
        }

        decoder.stdout(Stdio::piped());
        let mut dec_child = decoder.spawn().map_err(|e| ToolError::spawn(&dec_tool, e))?;
        let dec_stdout = dec_child.stdout.take().ok_or_else(|| ToolError::Pipe {
            tool: dec_tool.clone(),
        })?;

        encoder.stdin(Stdio::from(dec_stdout));
        let mut enc_child = match encoder.spawn() {
            Ok(child) => child,
            Err(e) => {
                let _ = dec_child.kill();
                let _ = dec_child.wait();
                return Err(ToolError::spawn(&enc_tool, e));
            }
        };

        // The encoder finishes when the decoder's stream closes, so wait on
        // it first; the decoder is reaped afterwards.
        let enc_status = match self.wait(&mut enc_child, &enc_tool) {
            Ok(status) => status,
            Err(e) => {
                let _ = dec_child.kill();
                let _ = dec_child.wait();
                return Err(e);
            }
        };
        let dec_status = self.wait(&mut dec_child, &dec_tool)?;

        if !dec_status.success() {
            return Err(ToolError::failed(
                &dec_tool,
                dec_status.code().unwrap_or(-1),
                "",
            ));
        }
        if !enc_status.success() {
            return Err(ToolError::failed(
                &enc_tool,
                enc_status.code().unwrap_or(-1),
                "",
            ));
        }

        Ok(RunStatus::Executed)
    }

    /// Wait for a child, enforcing the timeout when one is configured.
    fn wait(&self, child: &mut Child, tool: &str) -> ToolResult<ExitStatus> {
        let Some(limit) = self.timeout else {
            return child.wait().map_err(|e| ToolError::io(tool, e));
        };

        let started = Instant::now();
        loop {
            match child.try_wait().map_err(|e| ToolError::io(tool, e))? {
                Some(status) => return Ok(status),
                None => {
                    if started.elapsed() >= limit {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(ToolError::TimedOut {
                            tool: tool.to_string(),
                            secs: limit.as_secs(),
                        });
                    }
                    std::thread::sleep(Duration::from_millis(50));
                }
            }
        }
    }
}

/// Pause until the operator presses Enter (step-confirm mode).
fn wait_for_ack() {
    eprint!("Press Enter to execute (Ctrl-C aborts)... ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}

/// Program name of a command, for error messages.
fn tool_name(cmd: &Command) -> String {
    let program = cmd.get_program().to_string_lossy();
    // Strip any directory component so errors name the tool, not the path.
    std::path::Path::new(program.as_ref())
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.into_owned())
}

/// Render a command the way it would be typed in a shell.
///
/// For display only; arguments containing whitespace are quoted so the
/// echoed line is copy-pasteable.
pub fn render_command(cmd: &Command) -> String {
    let mut parts = vec![quote_arg(&cmd.get_program().to_string_lossy())];
    for arg in cmd.get_args() {
        parts.push(quote_arg(&arg.to_string_lossy()));
    }
    parts.join(" ")
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

/// Last non-empty stderr line, for compact error messages.
fn stderr_tail(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string()
}
