//! External process invocation.
//!
//! The pipeline shells out to scanner and OCR tools. All invocations go
//! through the [`CommandRunner`] trait so business logic never couples to a
//! shell syntax and tests can script tool behavior without hardware.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Captured output of one external command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit code, if the process terminated normally.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Convenience constructor for scripted runners in tests.
    pub fn ok(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }
}

/// Errors raised by the runner itself, as opposed to a tool exiting non-zero.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("external tool not found: {0}")]
    NotFound(String),

    #[error("command timed out after {0:?}")]
    TimedOut(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over external process execution.
///
/// Every invocation is time-bounded; a timeout surfaces as
/// [`CommandError::TimedOut`] and is treated by callers as a per-item
/// failure, never a process-wide hang.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

/// Runner that spawns real processes via tokio.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        let future = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(timeout, future).await {
            Err(_) => Err(CommandError::TimedOut(timeout)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CommandError::NotFound(program.to_string()))
            }
            Ok(Err(e)) => Err(CommandError::Io(e)),
            Ok(Ok(output)) => Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                exit_code: output.status.code(),
            }),
        }
    }
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Scripted command runner for tests.
///
/// Keeps external-process behavior out of test environments: the handler
/// closure decides each invocation's outcome, and every call is recorded
/// for assertions about what would have been spawned.
pub mod test_support {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{CommandError, CommandOutput, CommandRunner};

    pub struct ScriptedRunner<F> {
        handler: F,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl<F> ScriptedRunner<F>
    where
        F: Fn(&str, &[String]) -> Result<CommandOutput, CommandError> + Send + Sync,
    {
        pub fn new(handler: F) -> Self {
            Self {
                handler,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Programs and arguments of every invocation so far.
        pub fn calls(&self) -> Vec<(String, Vec<String>)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl<F> CommandRunner for ScriptedRunner<F>
    where
        F: Fn(&str, &[String]) -> Result<CommandOutput, CommandError> + Send + Sync,
    {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            _timeout: Duration,
        ) -> Result<CommandOutput, CommandError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            (self.handler)(program, args)
        }
    }
}
