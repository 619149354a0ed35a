use indexmap::IndexMap;
use lib_table::{SummarySink, TableRow};

use crate::{
    error::AppResult,
    verdict::{FAIL_MARKER, PASS_MARKER, REVIEW_MARKER},
};

/// Per-category verdict tallies, fully recomputed on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub category: String,
    pub pass_count: usize,
    pub fail_count: usize,
    pub review_count: usize,
}

/// Re-scan the dataset and tally verdict markers per category, categories in
/// first-seen order. Every data row registers its category, so rows still
/// awaiting a verdict contribute a zero-count entry. Marker checks are
/// independent, not mutually exclusive: a cell carrying both a fail and a
/// review marker counts toward both columns.
pub fn summarize(rows: &[TableRow]) -> Vec<SummaryRow> {
    let mut summary: IndexMap<String, SummaryRow> = IndexMap::new();

    for row in rows {
        let entry = summary
            .entry(row.category.clone())
            .or_insert_with(|| SummaryRow {
                category: row.category.clone(),
                pass_count: 0,
                fail_count: 0,
                review_count: 0,
            });

        if row.verdict.contains(PASS_MARKER) {
            entry.pass_count += 1;
        }
        if row.verdict.contains(FAIL_MARKER) {
            entry.fail_count += 1;
        }
        if row.verdict.contains(REVIEW_MARKER) {
            entry.review_count += 1;
        }
    }

    summary.into_values().collect()
}

/// Clear the summary surface and rewrite it: header first, then one row per
/// category.
pub fn render_to(sink: &mut dyn SummarySink, summary: &[SummaryRow]) -> AppResult<()> {
    sink.clear()?;
    sink.append_row(&[
        "Image Type".to_string(),
        format!("{PASS_MARKER} Passed"),
        format!("{FAIL_MARKER} Failed"),
        format!("{REVIEW_MARKER} Manual Review"),
    ])?;

    for row in summary {
        sink.append_row(&[
            row.category.clone(),
            row.pass_count.to_string(),
            row.fail_count.to_string(),
            row.review_count.to_string(),
        ])?;
    }

    tracing::info!("Dashboard rewritten with {} categories", summary.len());
    Ok(())
}
