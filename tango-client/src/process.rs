//! Process invocation
//!
//! All interaction with docker and ssh goes through [`ProcessRunner`], so
//! the commands Tango composes can be inspected without executing them.

use async_trait::async_trait;
use std::process::Stdio;
#[cfg(test)]
use std::sync::{Arc, Mutex};
use tokio::process::Command;
use tracing::debug;

use crate::error::{ClientError, Result};

/// A program and its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Collect stdout/stderr instead of streaming them to the terminal
    pub capture: bool,
}

impl Invocation {
    /// Invocation whose output is streamed to the terminal
    pub fn streamed(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            capture: false,
        }
    }

    /// Invocation whose output is collected
    pub fn captured(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            capture: true,
        }
    }

    /// Command line for display
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push_str(&format!("{:?}", arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Outcome of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or None if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code
    #[cfg(test)]
    pub fn failed(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs an invocation to completion
    ///
    /// A non-zero exit status is not an error at this level; only failing
    /// to start the program is.
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// Runs programs on the local system
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

#[async_trait]
impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        debug!("Executing: {}", invocation.command_line());

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args).stdin(Stdio::null());

        let spawn_error = |source| ClientError::Spawn {
            program: invocation.program.clone(),
            source,
        };

        if invocation.capture {
            let output = command.output().await.map_err(spawn_error)?;

            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            if !stderr.trim().is_empty() {
                debug!("{} stderr: {}", invocation.program, stderr.trim());
            }

            Ok(ProcessOutput {
                code: output.status.code(),
                stdout,
                stderr,
            })
        } else {
            let status = command.status().await.map_err(spawn_error)?;
            Ok(ProcessOutput {
                code: status.code(),
                ..Default::default()
            })
        }
    }
}

/// Prints invocations to stderr instead of running them
///
/// Every invocation reports success with empty output, so stdout stays
/// reserved for command results such as `--json` listings.
#[derive(Debug, Clone, Default)]
pub struct DryRunRunner;

#[async_trait]
impl ProcessRunner for DryRunRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        eprintln!("[dry-run] {}", invocation.command_line());
        Ok(ProcessOutput::ok(""))
    }
}

/// Records invocations and replays scripted outputs
///
/// Outputs are matched by the first rule whose needle appears in the
/// command line; unmatched invocations succeed with empty output.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    rules: Arc<Mutex<Vec<(String, ProcessOutput)>>>,
}

#[cfg(test)]
impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `output` to any invocation whose command line contains `needle`
    pub fn respond(&self, needle: impl Into<String>, output: ProcessOutput) {
        if let Ok(mut rules) = self.rules.lock() {
            rules.push((needle.into(), output));
        }
    }

    /// All invocations seen so far
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Command lines of all invocations seen so far
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(Invocation::command_line).collect()
    }
}

#[cfg(test)]
#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }

        let line = invocation.command_line();
        let output = self
            .rules
            .lock()
            .ok()
            .and_then(|rules| {
                rules
                    .iter()
                    .find(|(needle, _)| line.contains(needle.as_str()))
                    .map(|(_, output)| output.clone())
            })
            .unwrap_or_else(|| ProcessOutput::ok(""));

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_whitespace() {
        let invocation = Invocation::streamed(
            "ssh",
            vec![
                "deploy@alpha".to_string(),
                "docker pull myorg/web".to_string(),
            ],
        );
        assert_eq!(
            invocation.command_line(),
            r#"ssh deploy@alpha "docker pull myorg/web""#
        );
    }

    #[tokio::test]
    async fn test_recording_runner_scripts_outputs() {
        let runner = RecordingRunner::new();
        runner.respond("pull", ProcessOutput::failed(1));

        let pull = Invocation::streamed("docker", vec!["pull".to_string()]);
        let push = Invocation::streamed("docker", vec!["push".to_string()]);

        assert!(!runner.run(&pull).await.unwrap().success());
        assert!(runner.run(&push).await.unwrap().success());
        assert_eq!(runner.command_lines(), vec!["docker pull", "docker push"]);
    }

    #[tokio::test]
    async fn test_dry_run_runner_never_spawns() {
        let invocation = Invocation::captured(
            "tango-definitely-not-a-program",
            vec!["image".to_string(), "ls".to_string()],
        );

        let output = DryRunRunner.run(&invocation).await.unwrap();

        assert!(output.success());
        assert!(output.stdout.is_empty());
        assert!(output.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_system_runner_reports_missing_program() {
        let invocation = Invocation::captured("tango-definitely-not-a-program", Vec::new());
        let err = SystemRunner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, ClientError::Spawn { .. }));
    }
}
