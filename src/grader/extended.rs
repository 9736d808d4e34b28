//! Optional private/extended test suite
//!
//! A deeper set of correctness tests distributed separately from this
//! repository. Resolved once at startup; absence is a valid non-error state
//! and simply means the run carries no bonus point.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::common::config::ExtendedConfig;
use crate::common::{Error, Result};

/// Pluggable extended-suite capability
#[async_trait]
pub trait ExtendedSuite: Send + Sync {
    /// Run the suite against the subject listening on `port` with pid `pid`
    async fn run(&self, port: &str, pid: u32) -> Result<bool>;
}

/// Extended suite backed by an external program invoked with `(port, pid)`
///
/// Exit status zero means the suite passed.
pub struct CommandSuite {
    program: PathBuf,
}

#[async_trait]
impl ExtendedSuite for CommandSuite {
    async fn run(&self, port: &str, pid: u32) -> Result<bool> {
        let status = Command::new(&self.program)
            .arg(port)
            .arg(pid.to_string())
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|e| Error::ExtendedSuite(e.to_string()))?;

        Ok(status.success())
    }
}

/// Resolve the configured suite program, if one is installed
pub fn resolve(config: &ExtendedConfig) -> Option<Box<dyn ExtendedSuite>> {
    match which::which(&config.program) {
        Ok(program) => {
            tracing::debug!(program = %program.display(), "extended suite resolved");
            Some(Box::new(CommandSuite { program }))
        }
        Err(_) => {
            tracing::debug!(
                program = %config.program,
                "no extended suite found; grading basic tests only"
            );
            None
        }
    }
}
