//! Builder for executing the decoder with an argument vector.
//!
//! Arguments are passed straight to the process, never through a shell.
//! [`ToolCommand::display`] renders a shell-escaped string for logs and
//! reports only.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use mp3wav_core::{Error, Result};
use tokio::process::Command;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use mp3wav_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> mp3wav_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("/tmp/mpg123-x1y2"))
///     .arg("-w").arg("/tmp/out.wav")
///     .arg("in.mp3")
///     .execute()
///     .await?;
/// println!("{}", output.stderr);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl AsRef<OsStr>>) -> &mut Self {
        self.args
            .extend(iter.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Set the maximum execution time. Without one the command may run
    /// indefinitely.
    pub fn timeout(&mut self, d: Option<Duration>) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Shell-escaped command line: the program followed by every argument.
    /// Non-UTF-8 bytes are replaced here only; the process gets them intact.
    pub fn display(&self) -> String {
        std::iter::once(shell_quote(&self.program.to_string_lossy()))
            .chain(self.args.iter().map(|a| shell_quote(&a.to_string_lossy())))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// A non-zero exit status is *not* an error here; callers inspect
    /// [`ToolOutput::status`] or the files the tool wrote.
    ///
    /// # Errors
    ///
    /// - [`Error::Decoder`] if spawning or waiting on the process fails.
    /// - [`Error::Timeout`] if a timeout is set and expires. The child is
    ///   killed.
    pub async fn execute(&self) -> Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| Error::decoder(&program_name, format!("failed to spawn: {e}")))?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(res) => res,
                // Dropping the future drops the child, and kill_on_drop reaps it.
                Err(_elapsed) => {
                    return Err(Error::Timeout {
                        tool: program_name,
                        timeout: limit,
                    })
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| Error::decoder(&program_name, format!("I/O error waiting for process: {e}")))?;

        Ok(ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Quote a single argument for a POSIX shell. Arguments made only of
/// characters the shell never interprets are left bare.
pub fn shell_quote(arg: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c);

    if !arg.is_empty() && arg.chars().all(is_plain) {
        return arg.to_string();
    }

    format!("'{}'", arg.replace('\'', r#"'\''"#))
}
