//! Narrative calculation trace.
//!
//! Each site calculator records every intermediate quantity as a line of text
//! (`"DC Depreciation: $15.00M / 20 yrs = $0.75M/yr"`). The trace is part of
//! the result contract: lines are emitted in a fixed order so they can be
//! displayed verbatim and compared exactly in tests.

/// Section heading that opens the 20-year positive-cashflow projection.
pub const POSITIVE_CASHFLOW_HEADING: &str = "--- Positive Cashflow ---";

/// Section heading that opens the contract-improvement block.
pub const IMPROVED_CONTRACT_HEADING: &str = "--- Improved Contract ---";

/// Visible blank line (a lone non-breaking space).
pub const BLANK_LINE: &str = "\u{00A0}";

/// Ordered builder for calculation-trace lines.
///
/// # Examples
/// ```
/// use valuation_core::trace::CalcTrace;
///
/// let mut trace = CalcTrace::new();
/// trace.push(format!("Revenue: ${:.2}M", 500.0));
/// trace.section("--- Positive Cashflow ---");
/// let steps = trace.into_steps();
/// assert_eq!(steps, vec!["Revenue: $500.00M", "\u{00A0}", "--- Positive Cashflow ---"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalcTrace {
    lines: Vec<String>,
}

impl CalcTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.
    #[inline]
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Appends a visible blank line.
    pub fn blank(&mut self) {
        self.lines.push(BLANK_LINE.to_string());
    }

    /// Appends an empty spacer line.
    pub fn spacer(&mut self) {
        self.lines.push(String::new());
    }

    /// Appends a blank line followed by `heading`.
    pub fn section(&mut self, heading: &str) {
        self.blank();
        self.push(heading);
    }

    /// Lines recorded so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines recorded.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consumes the builder and returns the ordered lines.
    pub fn into_steps(self) -> Vec<String> {
        self.lines
    }
}
