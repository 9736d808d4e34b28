//! Response comparison
//!
//! Proxy and direct bodies are compared line-pairwise in order, stopping at
//! the first divergence. Iteration stops at the shorter body, so a proxy
//! response that is a clean prefix of the direct one still passes; that is
//! the zip semantics the grading contract inherited.

/// Verdict for one test case
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompareOutcome {
    Pass,
    /// One side produced no lines at all
    NoData,
    /// First diverging line pair
    Mismatch {
        proxy_line: String,
        direct_line: String,
    },
}

impl CompareOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Compare a proxied body against the direct reference body
pub fn compare_lines(proxy_body: &str, direct_body: &str) -> CompareOutcome {
    if proxy_body.lines().next().is_none() || direct_body.lines().next().is_none() {
        return CompareOutcome::NoData;
    }

    for (proxy_line, direct_line) in proxy_body.lines().zip(direct_body.lines()) {
        if proxy_line != direct_line {
            return CompareOutcome::Mismatch {
                proxy_line: proxy_line.to_string(),
                direct_line: direct_line.to_string(),
            };
        }
    }

    CompareOutcome::Pass
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_bodies_pass() {
        let body = "<html>\n<body>hello</body>\n</html>\n";
        assert_eq!(compare_lines(body, body), CompareOutcome::Pass);
    }

    #[test]
    fn test_empty_proxy_body_is_no_data() {
        assert_eq!(compare_lines("", "<html>\n"), CompareOutcome::NoData);
    }

    #[test]
    fn test_empty_direct_body_is_no_data() {
        assert_eq!(compare_lines("<html>\n", ""), CompareOutcome::NoData);
    }

    #[test]
    fn test_first_divergence_is_reported() {
        let outcome = compare_lines("a\nb\nc\n", "a\nx\ny\n");
        assert_eq!(
            outcome,
            CompareOutcome::Mismatch {
                proxy_line: "b".to_string(),
                direct_line: "x".to_string(),
            }
        );
    }

    #[test]
    fn test_proxy_prefix_of_direct_passes() {
        // zip stops at the shorter side
        assert_eq!(compare_lines("a\nb\n", "a\nb\nc\n"), CompareOutcome::Pass);
    }

    #[test]
    fn test_direct_prefix_of_proxy_passes() {
        assert_eq!(compare_lines("a\nb\nc\n", "a\nb\n"), CompareOutcome::Pass);
    }
}
