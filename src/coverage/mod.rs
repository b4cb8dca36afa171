//! Coverage collection for release unit tests.
//!
//! A run is a fixed sequence: `bazel test` with pytest-cov enabled, then
//! `coverage report` over the resulting data file, then an optional upload of
//! that file to S3. Any failing step aborts the run.
mod bazel;
mod config;
mod report;
mod upload;

pub(crate) use config::{
    absolute_from, CoverageConfig, UploadTarget, BAZEL_COMMAND_VAR, DEFAULT_BUCKET,
    DEFAULT_KEY_PREFIX,
};
pub(crate) use report::CoverageSummary;
pub(crate) use upload::{AwsCliStore, ObjectStore, AWS_COMMAND_VAR};

use crate::process::CommandRunner;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

const COVERAGE_PROGRAM: &str = "coverage";

/// Result of a completed `collect` run.
#[derive(Debug, Clone, Serialize)]
pub struct CollectOutcome {
    pub test_target: String,
    pub coverage_file: PathBuf,
    pub report: String,
    pub summary: Option<CoverageSummary>,
    /// Object key, present only when the data file was uploaded.
    pub uploaded_key: Option<String>,
}

/// Collect coverage for `config.test_target` and optionally upload it.
pub fn collect(
    config: &CoverageConfig,
    runner: &dyn CommandRunner,
    store: &dyn ObjectStore,
    today: NaiveDate,
) -> Result<CollectOutcome> {
    tracing::info!(
        "Collecting coverage for test target: {}",
        config.test_target
    );

    let test_args = bazel::test_args(config);
    runner
        .run(&config.bazel.program, &test_args)
        .with_context(|| format!("run bazel test for {}", config.test_target))?;

    let stdout = runner
        .run(COVERAGE_PROGRAM, &report::report_args(&config.coverage_file))
        .with_context(|| format!("read coverage report {}", config.coverage_file.display()))?;
    let report = String::from_utf8_lossy(&stdout).into_owned();
    tracing::info!("{report}");

    let summary = report::parse_summary(&report);
    match &summary {
        Some(summary) => tracing::info!(
            statements = summary.statements,
            missed = summary.missed,
            percent = summary.percent,
            "coverage summary"
        ),
        None => tracing::debug!("coverage report has no TOTAL row"),
    }

    let uploaded_key = match &config.upload {
        Some(target) => {
            let key = upload::object_key(&target.key_prefix, today);
            store.upload_file(&config.coverage_file, &target.bucket, &key)?;
            tracing::info!("Successfully uploaded coverage data to s3 as {key}");
            Some(key)
        }
        None => None,
    };

    Ok(CollectOutcome {
        test_target: config.test_target.clone(),
        coverage_file: config.coverage_file.clone(),
        report,
        summary,
        uploaded_key,
    })
}

#[cfg(test)]
#[path = "collect_tests.rs"]
mod tests;
