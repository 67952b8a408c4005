//! External command execution with a time bound.

use std::{
    process::Stdio,
    sync::{Arc, Mutex},
};

use kickstart_core::{
    application::{
        ApplicationError,
        ports::{CommandInvocation, CommandOutput, CommandRunner},
    },
    error::{KickstartError, KickstartResult},
};
use tokio::{process::Command, time::timeout};
use tracing::{debug, instrument, warn};

/// Runs commands as child processes on a private current-thread runtime.
///
/// Must not be called from inside another tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    async fn run_async(invocation: &CommandInvocation) -> KickstartResult<CommandOutput> {
        let command_line = invocation.display();
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failed(&command_line, None, format!("could not start: {e}")))?;

        // Dropping the wait future on timeout drops the child, which kills it.
        match timeout(invocation.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CommandOutput {
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(e)) => Err(failed(&command_line, None, e.to_string())),
            Err(_) => {
                warn!(command = %command_line, "Command timed out, killed");
                Err(ApplicationError::CommandTimedOut {
                    command: command_line,
                    timeout_secs: invocation.timeout.as_secs(),
                }
                .into())
            }
        }
    }
}

impl CommandRunner for ProcessRunner {
    #[instrument(skip_all, fields(command = %invocation.display(), cwd = %invocation.cwd.display()))]
    fn run(&self, invocation: &CommandInvocation) -> KickstartResult<CommandOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| failed(&invocation.display(), None, format!("no runtime: {e}")))?;

        let output = runtime.block_on(Self::run_async(invocation))?;
        debug!(status = ?output.status, "Command finished");
        Ok(output)
    }
}

fn failed(command: &str, status: Option<i32>, stderr: String) -> KickstartError {
    ApplicationError::CommandFailed {
        command: command.to_string(),
        status,
        stderr,
    }
    .into()
}

/// Records invocations instead of running them.
#[derive(Debug, Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<CommandInvocation>>>,
    response: CommandOutput,
}

impl RecordingRunner {
    /// Every command "succeeds" with empty output.
    pub fn new() -> Self {
        Self {
            calls: Arc::default(),
            response: CommandOutput {
                status: Some(0),
                ..CommandOutput::default()
            },
        }
    }

    /// Every command returns `response`.
    pub fn responding(response: CommandOutput) -> Self {
        Self {
            calls: Arc::default(),
            response,
        }
    }

    /// Invocations seen so far, in order.
    pub fn calls(&self) -> Vec<CommandInvocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &CommandInvocation) -> KickstartResult<CommandOutput> {
        self.calls
            .lock()
            .map_err(|_| ApplicationError::StoreLockError)?
            .push(invocation.clone());
        Ok(self.response.clone())
    }
}
