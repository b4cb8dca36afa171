//! `coverage report` invocation and summary parsing.
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

/// Totals from the `TOTAL` row of a coverage report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSummary {
    pub statements: u64,
    pub missed: u64,
    pub percent: f64,
}

pub(crate) fn report_args(coverage_file: &Path) -> Vec<String> {
    vec![
        "report".to_string(),
        format!("--data-file={}", coverage_file.display()),
    ]
}

fn total_row() -> Option<&'static Regex> {
    static TOTAL_ROW: OnceLock<Option<Regex>> = OnceLock::new();
    TOTAL_ROW
        .get_or_init(|| {
            Regex::new(r"(?m)^TOTAL\s+(\d+)\s+(\d+)(?:\s+\d+\s+\d+)?\s+(\d+(?:\.\d+)?)%\s*$").ok()
        })
        .as_ref()
}

/// Parse the last `TOTAL` row; branch columns are accepted and ignored.
pub(crate) fn parse_summary(report: &str) -> Option<CoverageSummary> {
    let cap = total_row()?.captures_iter(report).last()?;
    Some(CoverageSummary {
        statements: cap.get(1)?.as_str().parse().ok()?,
        missed: cap.get(2)?.as_str().parse().ok()?,
        percent: cap.get(3)?.as_str().parse().ok()?,
    })
}
