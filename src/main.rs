//! Proxy grading harness - grades a student HTTP proxy binary
//!
//! Spawns the subject proxy, fetches a fixed set of URLs through it and
//! directly, compares the two, and prints a score out of 10.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use proxy_grader::common::{config::Config, logging};
use proxy_grader::grader::{self, CompareMode, FetchStrategy, RunOptions};

#[derive(Parser)]
#[command(name = "proxy-grader", about = "Grading harness for HTTP proxy binaries")]
#[command(version, long_about = None)]
struct Cli {
    /// Path to the proxy binary under test
    subject: PathBuf,

    /// TCP port the subject should listen on (passed through verbatim)
    port: String,

    /// Path to a harness configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the comparison mode from the config
    #[arg(long, value_enum)]
    mode: Option<CompareMode>,

    /// Override the proxied-fetch strategy from the config
    #[arg(long, value_enum)]
    fetcher: Option<FetchStrategy>,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();

    // The subject must be an existing executable before anything is spawned.
    if !is_executable(&cli.subject) {
        eprintln!(
            "Error: '{}' is not an executable file",
            cli.subject.display()
        );
        eprintln!("Usage: proxy-grader <path-to-proxy-binary> <port>");
        return ExitCode::from(2);
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    let options = RunOptions {
        subject: cli.subject,
        port: cli.port,
        mode: cli.mode,
        fetcher: cli.fetcher,
    };

    if let Err(e) = grader::run(&config, options).await {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[cfg(unix)]
fn is_executable(path: &std::path::Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &std::path::Path) -> bool {
    path.is_file()
}
