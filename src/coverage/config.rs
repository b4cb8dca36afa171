//! Coverage run configuration and defaults.
use crate::process::CommandLine;
use std::path::{Path, PathBuf};

pub const COVERAGE_FILE_NAME: &str = "ray_release.cov";
pub const DEFAULT_BUCKET: &str = "ray-release-automation-results";
pub const DEFAULT_KEY_PREFIX: &str = "continuous-release";
pub const DEFAULT_TEST_TAG_FILTER: &str = "release_unit";

/// Environment override for the Bazel command line.
pub const BAZEL_COMMAND_VAR: &str = "RAY_COVERAGE_BAZEL";

/// Everything a single `collect` run needs.
#[derive(Debug, Clone)]
pub struct CoverageConfig {
    pub test_target: String,
    pub coverage_file: PathBuf,
    /// Directory pytest-cov measures (`--cov=`).
    pub source_dir: PathBuf,
    pub test_tag_filter: String,
    pub upload: Option<UploadTarget>,
    pub bazel: CommandLine,
}

/// Where the coverage data file goes when uploading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub bucket: String,
    pub key_prefix: String,
}

impl Default for UploadTarget {
    fn default() -> Self {
        Self {
            bucket: DEFAULT_BUCKET.to_string(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl CoverageConfig {
    /// Defaults for `test_target`, relative to `cwd`, without upload.
    pub fn new(test_target: &str, cwd: PathBuf) -> Self {
        Self {
            test_target: test_target.to_string(),
            coverage_file: default_coverage_file(),
            source_dir: cwd.join("release"),
            test_tag_filter: DEFAULT_TEST_TAG_FILTER.to_string(),
            upload: None,
            bazel: CommandLine::new("bazel"),
        }
    }
}

pub fn default_coverage_file() -> PathBuf {
    std::env::temp_dir().join(COVERAGE_FILE_NAME)
}

/// Anchor a user-supplied path at `cwd`.
///
/// Paths handed to `bazel test --test_env` are resolved inside the sandbox,
/// so they must be absolute.
pub fn absolute_from(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    cwd.join(path)
}
