//! Proxy grading harness
//!
//! Launches a student-written HTTP proxy binary, drives a fixed list of test
//! URLs through it, compares the proxied responses against direct fetches of
//! the same URLs, and prints a 0-10 score.

pub mod common;
pub mod grader;

// Re-export commonly used types for tests
pub use common::{Config, Error, Result};
pub use grader::{run, RunOptions};
