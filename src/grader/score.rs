//! Score tally and summary output
//!
//! The 0-10 grade breaks down as: up to eight points for the basic pass
//! ratio, one bonus point if the extended suite passed, and one point
//! reserved for the manual style review that never appears here.

use colored::Colorize;

/// Aggregate results for one grading run
#[derive(Debug)]
pub struct Scoreboard {
    pub passcount: usize,
    pub total: usize,
    /// Extended-suite verdict; `None` when no suite is installed
    pub extended: Option<bool>,
}

impl Scoreboard {
    pub fn new(total: usize) -> Self {
        Self {
            passcount: 0,
            total,
            extended: None,
        }
    }

    /// Record one passing test case
    pub fn record_pass(&mut self) {
        self.passcount += 1;
        debug_assert!(self.passcount <= self.total);
    }

    /// Base score out of 10, truncated to an integer
    ///
    /// An empty URL list grades as zero basic points rather than dividing
    /// by zero.
    pub fn base_score(&self) -> u32 {
        let bonus = if self.extended == Some(true) { 1.0 } else { 0.0 };
        let ratio = if self.total == 0 {
            0.0
        } else {
            self.passcount as f64 / self.total as f64
        };
        (bonus + ratio * 8.0) as u32
    }

    /// Print the human-readable summary block
    pub fn print_summary(&self) {
        println!("\n{}", "Summary:".blue().bold());
        println!("\t{} of {} tests passed.", self.passcount, self.total);

        match self.extended {
            Some(true) => println!("\t100% of extended tests passed."),
            Some(false) => println!("\tNot all extended tests passed."),
            None => {}
        }

        println!(
            "Base Score: {}/10 (Remember, one point is based on style!)",
            self.base_score()
        );
    }
}
