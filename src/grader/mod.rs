//! The grading harness
//!
//! One strictly sequential pipeline: spawn the subject proxy, warm up, fetch
//! every test URL through it and directly, compare, tally, tear down.

pub mod capture;
pub mod compare;
pub mod extended;
pub mod fetch;
pub mod runner;
pub mod score;
pub mod subject;

pub use crate::common::config::{CompareMode, FetchStrategy};
pub use runner::{run, RunOptions};
