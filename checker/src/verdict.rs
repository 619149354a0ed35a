/// Markers embedded in rendered verdict strings. The dashboard tallies rows
/// by scanning cells for these, so they double as the aggregation tags; the
/// review marker is only ever written by human reviewers.
pub const PASS_MARKER: &str = "✅";
pub const FAIL_MARKER: &str = "❌";
pub const REVIEW_MARKER: &str = "⚠️";

/// Outcome of classifying one row.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// A concept cleared the model threshold; carries the concept name and
    /// its confidence as a percentage.
    Pass {
        concept: String,
        confidence_pct: f32,
    },
    /// No concept reached the threshold.
    Fail,
    /// The row's category has no registered model; decided before any
    /// remote call.
    UnknownCategory,
    /// The whole chunk's remote call failed; the message carries the error
    /// body verbatim.
    ApiError(String),
}

impl Verdict {
    /// Display string written to the verdict cell. Pure function of the tag.
    pub fn render(&self) -> String {
        match self {
            Verdict::Pass {
                concept,
                confidence_pct,
            } => format!("{PASS_MARKER} {concept} ({confidence_pct:.1}%)"),
            Verdict::Fail => format!("{FAIL_MARKER} Non-compliant or unclear"),
            Verdict::UnknownCategory => format!("{FAIL_MARKER} Unknown type"),
            Verdict::ApiError(message) => format!("{FAIL_MARKER} API Error: {message}"),
        }
    }
}
