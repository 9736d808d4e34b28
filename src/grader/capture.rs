//! Aggregate log artifacts for the log-capture profile
//!
//! Instead of per-URL verdicts, this profile concatenates every proxied body
//! into one artifact and every direct body into another, for offline
//! diffing. Both handles close on drop, so no descriptor outlives the run
//! on any exit path.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::common::Result;

/// The two aggregate artifacts of a capture run
pub struct LogCapture {
    proxy_log: File,
    direct_log: File,
}

impl LogCapture {
    /// Create (truncating) both artifacts
    pub fn create(proxy_path: &Path, direct_path: &Path) -> Result<Self> {
        Ok(Self {
            proxy_log: File::create(proxy_path)?,
            direct_log: File::create(direct_path)?,
        })
    }

    /// Append one proxied response body
    pub fn record_proxy(&mut self, body: &str) -> Result<()> {
        self.proxy_log.write_all(body.as_bytes())?;
        Ok(())
    }

    /// Append one direct response body
    pub fn record_direct(&mut self, body: &str) -> Result<()> {
        self.direct_log.write_all(body.as_bytes())?;
        Ok(())
    }

    /// Flush and close both artifacts
    pub fn finish(mut self) -> Result<()> {
        self.proxy_log.flush()?;
        self.direct_log.flush()?;
        Ok(())
    }
}
