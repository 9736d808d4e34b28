//! Harness configuration file handling
//!
//! The test URL list and the subject launch argument template are the two
//! pieces of configuration that grading variants change; both live here so
//! the core logic never needs to be touched.

use clap::ValueEnum;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Ordered list of URLs fetched both through the proxy and directly
    #[serde(default = "default_urls")]
    pub urls: Vec<String>,

    /// Subject launch settings
    #[serde(default)]
    pub subject: SubjectConfig,

    /// Fetch strategy settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Comparison settings
    #[serde(default)]
    pub compare: CompareConfig,

    /// Warm-up and cooldown delays
    #[serde(default)]
    pub timing: Timing,

    /// Optional private/extended test suite
    #[serde(default)]
    pub extended: ExtendedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            urls: default_urls(),
            subject: SubjectConfig::default(),
            fetch: FetchConfig::default(),
            compare: CompareConfig::default(),
            timing: Timing::default(),
            extended: ExtendedConfig::default(),
        }
    }
}

// Stock public URL list; graders append their own while debugging.
fn default_urls() -> Vec<String> {
    [
        "http://labs.google.com/",
        "HTTP://www.stanford.edu/",
        "http://WWW.microsoft.com/en/us/default.aspx",
        "http://www.cnn.com/",
        "http://yuba.stanford.edu/vns/images/su.gif",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Subject launch settings
#[derive(Debug, Deserialize, Clone)]
pub struct SubjectConfig {
    /// Argument template; every `{port}` is replaced with the run's port.
    ///
    /// The VNS assignment variant uses
    /// `["-U", "-t", "225", "-s", "vns-2.stanford.edu", "-v", "vhost",
    ///   "-r", "rtable.vhost", "{port}"]`; the plain variant just `["{port}"]`.
    #[serde(default = "default_subject_args")]
    pub args: Vec<String>,
}

impl Default for SubjectConfig {
    fn default() -> Self {
        Self {
            args: default_subject_args(),
        }
    }
}

fn default_subject_args() -> Vec<String> {
    vec!["{port}".to_string()]
}

impl SubjectConfig {
    /// Render the argument vector for a concrete port
    pub fn render_args(&self, port: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace("{port}", port))
            .collect()
    }
}

/// How proxied responses are retrieved
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// In-process HTTP client routed through the subject proxy
    #[default]
    Client,
    /// Companion proxy-aware command-line tool, stdout captured
    Proxyget,
}

/// Fetch strategy settings
#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    /// Strategy used for proxied fetches
    #[serde(default)]
    pub strategy: FetchStrategy,

    /// Host the harness reaches the subject proxy on
    #[serde(default = "default_proxy_host")]
    pub proxy_host: String,

    /// Command template for the `proxyget` strategy; `{proxy}` becomes
    /// `host:port` and `{url}` the test URL.
    #[serde(default = "default_fetch_command")]
    pub command: Vec<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::default(),
            proxy_host: default_proxy_host(),
            command: default_fetch_command(),
        }
    }
}

fn default_proxy_host() -> String {
    "localhost".to_string()
}

fn default_fetch_command() -> Vec<String> {
    ["./proxyget", "-U", "{proxy}", "{url}"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl FetchConfig {
    /// Render the companion-tool command line for one URL
    pub fn render_command(&self, proxy: &str, url: &str) -> Vec<String> {
        self.command
            .iter()
            .map(|a| a.replace("{proxy}", proxy).replace("{url}", url))
            .collect()
    }
}

/// How proxy and direct responses are compared
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Pairwise line diff with per-URL pass/fail and a score
    #[default]
    LineDiff,
    /// Append full bodies to two aggregate logs for offline diffing; no score
    LogCapture,
}

/// Comparison settings
#[derive(Debug, Deserialize, Clone)]
pub struct CompareConfig {
    /// Comparison mode
    #[serde(default)]
    pub mode: CompareMode,

    /// Aggregate artifact for proxied bodies (log-capture mode)
    #[serde(default = "default_proxy_log")]
    pub proxy_log: PathBuf,

    /// Aggregate artifact for direct bodies (log-capture mode)
    #[serde(default = "default_direct_log")]
    pub direct_log: PathBuf,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            mode: CompareMode::default(),
            proxy_log: default_proxy_log(),
            direct_log: default_direct_log(),
        }
    }
}

fn default_proxy_log() -> PathBuf {
    PathBuf::from("log1.txt")
}

fn default_direct_log() -> PathBuf {
    PathBuf::from("log2.txt")
}

/// Warm-up and cooldown delays in seconds
#[derive(Debug, Deserialize, Clone)]
pub struct Timing {
    /// Delay after spawning the subject before the first fetch.
    /// Best-effort synchronization only; there is no readiness handshake,
    /// so a subject that is slow to bind shows up as failed fetches.
    #[serde(default = "default_warmup")]
    pub warmup_secs: u64,

    /// Delay between SIGINT and SIGKILL at teardown
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            warmup_secs: default_warmup(),
            cooldown_secs: default_cooldown(),
        }
    }
}

fn default_warmup() -> u64 {
    2
}
fn default_cooldown() -> u64 {
    2
}

/// Optional private/extended test suite
#[derive(Debug, Deserialize, Clone)]
pub struct ExtendedConfig {
    /// Program name or path; resolved at startup, absence disables the suite
    #[serde(default = "default_extended_program")]
    pub program: String,
}

impl Default for ExtendedConfig {
    fn default() -> Self {
        Self {
            program: default_extended_program(),
        }
    }
}

fn default_extended_program() -> String {
    "proxy-grade-private".to_string()
}

impl Config {
    /// Load configuration from the given file, or defaults if none was given
    ///
    /// An explicitly named file that cannot be read or parsed is an error;
    /// omitting the file is not.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|e| Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    })?;
                toml::from_str(&content).map_err(|e| Error::ConfigParse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }
}
