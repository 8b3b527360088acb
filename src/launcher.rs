use std::process::Command;

use crate::error::{Error, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Success,
    /// `None` when the client was killed by a signal.
    Failure(Option<i32>),
}

impl ConnectOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn into_result(self, target: &str) -> Result<()> {
        match self {
            Self::Success => Ok(()),
            Self::Failure(code) => Err(Error::ConnectionFailure {
                target: target.to_string(),
                code,
            }),
        }
    }
}

pub trait Connector {
    fn connect(&self, target: &str, timeout_secs: u64) -> Result<ConnectOutcome>;
}

/// Runs the external SSH client in the foreground. No retries.
#[derive(Debug, Clone)]
pub struct Launcher {
    program: String,
}

impl Launcher {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, target: &str, timeout_secs: u64) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-o")
            .arg(format!("ConnectTimeout={timeout_secs}"))
            .arg(target);
        cmd
    }
}

impl Default for Launcher {
    fn default() -> Self {
        Self::new("ssh")
    }
}

impl Connector for Launcher {
    fn connect(&self, target: &str, timeout_secs: u64) -> Result<ConnectOutcome> {
        tracing::info!(connection = target, timeout_secs, program = %self.program, "connecting");
        let status = self
            .command(target, timeout_secs)
            .status()
            .map_err(|source| Error::Launch {
                program: self.program.clone(),
                source,
            })?;

        if status.success() {
            tracing::info!(connection = target, "session ended");
            Ok(ConnectOutcome::Success)
        } else {
            tracing::warn!(connection = target, code = ?status.code(), "connection failed");
            Ok(ConnectOutcome::Failure(status.code()))
        }
    }
}
