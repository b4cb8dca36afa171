//! Bazel test invocation for coverage runs.
use super::CoverageConfig;

/// Arguments for `bazel test` that collect pytest-cov data into one file.
///
/// Tests run with `--jobs 1`: parallel pytest processes race when creating the
/// initial coverage database. The `test` dynamic context keeps per-test
/// attribution in the data file.
pub(crate) fn test_args(config: &CoverageConfig) -> Vec<String> {
    config.bazel.with_args([
        "test".to_string(),
        config.test_target.clone(),
        format!("--test_tag_filters={}", config.test_tag_filter),
        "--jobs".to_string(),
        "1".to_string(),
        format!(
            "--test_env=PYTEST_ADDOPTS=--cov-context=test --cov={} --cov-append",
            config.source_dir.display()
        ),
        format!("--test_env=COVERAGE_FILE={}", config.coverage_file.display()),
        "--cache_test_results=no".to_string(),
    ])
}
