//! Grading run orchestration
//!
//! Fully sequential: spawn the subject, wait out the warm-up, fetch every
//! URL through the proxy, then compare against direct fetches (or append to
//! the capture logs), run the optional extended suite, and tear the subject
//! down. Teardown runs whether or not the middle of the run failed.

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;

use crate::common::config::{CompareMode, Config, FetchStrategy};
use crate::common::Result;

use super::capture::LogCapture;
use super::compare::{compare_lines, CompareOutcome};
use super::extended::{self, ExtendedSuite};
use super::fetch::{self, DirectFetcher};
use super::score::Scoreboard;
use super::subject::Subject;

/// Per-run options taken from the command line
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Path to the proxy binary under test
    pub subject: PathBuf,
    /// Port string passed through to the subject verbatim
    pub port: String,
    /// Overrides the configured comparison mode when set
    pub mode: Option<CompareMode>,
    /// Overrides the configured fetch strategy when set
    pub fetcher: Option<FetchStrategy>,
}

/// Run one grading pass end to end
pub async fn run(config: &Config, options: RunOptions) -> Result<()> {
    println!("Binary: {}", options.subject.display());
    println!("Running on port {}", options.port);

    let mode = options.mode.unwrap_or(config.compare.mode);
    let strategy = options.fetcher.unwrap_or(config.fetch.strategy);

    // Resolve the optional private suite up front; absence is not an error
    let suite = extended::resolve(&config.extended);

    let args = config.subject.render_args(&options.port);
    let subject = Subject::spawn(&options.subject, &args)?;
    tracing::info!(pid = subject.pid(), "subject started");

    // Best-effort warm-up; there is no readiness handshake, so a subject
    // that is slow to bind shows up as failed fetches, not a harness error
    tokio::time::sleep(Duration::from_secs(config.timing.warmup_secs)).await;

    let pid = subject.pid();
    let outcome = drive(config, &options, mode, strategy, suite.as_deref(), pid).await;

    // The one hard resource-safety requirement: signal and reap regardless
    // of how the fetch/compare phase went
    let shutdown = subject
        .shutdown(Duration::from_secs(config.timing.cooldown_secs))
        .await;

    let scoreboard = outcome?;
    shutdown?;

    if let Some(scoreboard) = scoreboard {
        scoreboard.print_summary();
    }

    Ok(())
}

/// Fetch, compare, and tally; returns `None` in log-capture mode
async fn drive(
    config: &Config,
    options: &RunOptions,
    mode: CompareMode,
    strategy: FetchStrategy,
    suite: Option<&dyn ExtendedSuite>,
    pid: u32,
) -> Result<Option<Scoreboard>> {
    let fetcher = fetch::proxy_fetcher(&config.fetch, strategy, &options.port)?;
    let direct = DirectFetcher::new()?;

    // Phase 1: every URL through the proxy, in declared order. A failed
    // fetch is an empty body, which reads as "no data" downstream.
    let mut proxied = Vec::with_capacity(config.urls.len());
    for url in &config.urls {
        let body = match fetcher.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "proxied fetch failed");
                String::new()
            }
        };
        proxied.push(body);
    }

    match mode {
        CompareMode::LogCapture => {
            capture_responses(config, &direct, &proxied).await?;
            Ok(None)
        }
        CompareMode::LineDiff => {
            let mut scoreboard = grade_responses(config, &direct, &proxied).await?;

            if let Some(suite) = suite {
                // The subject is still alive here; the suite drives it too
                match suite.run(&options.port, pid).await {
                    Ok(passed) => scoreboard.extended = Some(passed),
                    Err(e) => {
                        tracing::warn!(error = %e, "extended suite failed to run");
                        scoreboard.extended = Some(false);
                    }
                }
            }

            Ok(Some(scoreboard))
        }
    }
}

/// Phase 2, line-diff profile: compare each proxied body against a fresh
/// direct fetch and tally the verdicts
async fn grade_responses(
    config: &Config,
    direct: &DirectFetcher,
    proxied: &[String],
) -> Result<Scoreboard> {
    let mut scoreboard = Scoreboard::new(config.urls.len());

    for (url, proxy_body) in config.urls.iter().zip(proxied) {
        // An empty proxy response fails fast; the direct fetch is skipped
        if proxy_body.lines().next().is_none() {
            println!("No data received for {url}");
            continue;
        }

        let direct_body = match direct.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "direct fetch failed");
                String::new()
            }
        };

        match compare_lines(proxy_body, &direct_body) {
            CompareOutcome::Pass => {
                scoreboard.record_pass();
                println!("  {} {}", "✓".green(), url.dimmed());
            }
            CompareOutcome::NoData => {
                println!("No data received for {url}");
            }
            CompareOutcome::Mismatch {
                proxy_line,
                direct_line,
            } => {
                println!(">>> {proxy_line}");
                println!("<<< {direct_line}");
                println!("  {} {}", "✗".red(), url.dimmed());
            }
        }
    }

    println!(
        "Basic HTTP transactions: {} of {} tests passed",
        scoreboard.passcount, scoreboard.total
    );

    Ok(scoreboard)
}

/// Phase 2, capture profile: append everything to the two aggregate logs
async fn capture_responses(
    config: &Config,
    direct: &DirectFetcher,
    proxied: &[String],
) -> Result<()> {
    let mut capture = LogCapture::create(&config.compare.proxy_log, &config.compare.direct_log)?;

    for (url, proxy_body) in config.urls.iter().zip(proxied) {
        capture.record_proxy(proxy_body)?;

        let direct_body = match direct.fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "direct fetch failed");
                String::new()
            }
        };
        capture.record_direct(&direct_body)?;
    }

    capture.finish()?;

    tracing::info!(
        proxy_log = %config.compare.proxy_log.display(),
        direct_log = %config.compare.direct_log.display(),
        "captured responses for offline diffing"
    );

    Ok(())
}
