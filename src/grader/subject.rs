//! Subject process lifecycle
//!
//! The subject binary is spawned once per run and owned exclusively by the
//! harness. Teardown is graceful-then-forceful: SIGINT, a fixed cooldown,
//! SIGKILL, then a reap. It must run on every exit path; `kill_on_drop` is
//! the backstop for panics before `shutdown` is reached.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::common::{Error, Result};

/// Handle to the spawned subject binary
#[derive(Debug)]
pub struct Subject {
    child: Child,
    pid: u32,
}

impl Subject {
    /// Spawn the subject with an already-rendered argument vector
    pub fn spawn(binary: &Path, args: &[String]) -> Result<Self> {
        tracing::debug!(binary = %binary.display(), ?args, "spawning subject");

        let mut child = Command::new(binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::subject_spawn(binary, e))?;

        let pid = child.id().ok_or_else(|| {
            Error::subject_signal(0, "subject exited before its pid could be read")
        })?;

        Ok(Self { child, pid })
    }

    /// Operating-system process id of the subject
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Terminate and reap the subject: SIGINT, cooldown, SIGKILL, wait
    ///
    /// Consumes the handle so the signal-and-reap sequence can only run once.
    pub async fn shutdown(mut self, cooldown: Duration) -> Result<()> {
        #[cfg(unix)]
        {
            let rc = unsafe { libc::kill(self.pid as i32, libc::SIGINT) };
            if rc != 0 {
                // Subject may have already exited; the reap below still runs
                tracing::warn!(pid = self.pid, "SIGINT delivery failed");
            }
        }

        tokio::time::sleep(cooldown).await;

        // SIGKILL; fails harmlessly if the subject honored SIGINT
        let _ = self.child.start_kill();
        let status = self.child.wait().await?;

        tracing::debug!(pid = self.pid, ?status, "subject reaped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_and_shutdown_reaps_the_child() {
        let subject =
            Subject::spawn(Path::new("sleep"), &["30".to_string()]).expect("spawn sleep");
        let pid = subject.pid();
        assert!(pid > 0);

        subject
            .shutdown(Duration::from_millis(50))
            .await
            .expect("shutdown");

        // Reaped: signal 0 must fail for the dead pid
        #[cfg(unix)]
        {
            let rc = unsafe { libc::kill(pid as i32, 0) };
            assert_ne!(rc, 0, "subject should no longer exist");
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_is_a_subject_error() {
        let err = Subject::spawn(Path::new("/nonexistent/proxy-binary"), &[]).unwrap_err();
        assert!(matches!(err, Error::SubjectSpawn { .. }));
    }
}
