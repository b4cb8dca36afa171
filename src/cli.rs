//! CLI argument parsing for the release CI helpers.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::coverage::UploadTarget;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "ray-coverage",
    version,
    about = "Coverage collection and runfile resolution for release CI",
    after_help = "Examples:\n  ray-coverage collect //release:ray_release_unit_tests\n  ray-coverage collect //release:ray_release_unit_tests --upload\n  ray-coverage runfile release ray_release/configs/oss_config.yaml",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log at debug level unless RUST_LOG is set
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Collect(CollectArgs),
    Runfile(RunfileArgs),
}

/// Collect command inputs for a single Bazel test target.
#[derive(Parser, Debug)]
#[command(about = "Run a test target under coverage and print the report")]
pub struct CollectArgs {
    /// Bazel test target to run
    #[arg(value_name = "TEST_TARGET")]
    pub test_target: String,

    /// Upload the coverage data file to S3
    #[arg(long, visible_alias = "productionize")]
    pub upload: bool,

    /// Coverage data file (defaults to <tmp>/ray_release.cov)
    #[arg(long, value_name = "PATH")]
    pub coverage_file: Option<PathBuf>,

    /// Source directory measured by pytest-cov (defaults to <cwd>/release)
    #[arg(long, value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Destination bucket for --upload
    #[arg(long, value_name = "BUCKET", default_value = crate::coverage::DEFAULT_BUCKET)]
    pub bucket: String,

    /// Key prefix inside the bucket for --upload
    #[arg(long, value_name = "PREFIX", default_value = crate::coverage::DEFAULT_KEY_PREFIX)]
    pub key_prefix: String,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

impl CollectArgs {
    pub fn upload_target(&self) -> Option<UploadTarget> {
        self.upload.then(|| UploadTarget {
            bucket: self.bucket.clone(),
            key_prefix: self.key_prefix.clone(),
        })
    }
}

/// Runfile command inputs.
#[derive(Parser, Debug)]
#[command(about = "Resolve a repository path through Bazel runfiles")]
pub struct RunfileArgs {
    /// Path segments, joined and normalized before lookup
    #[arg(value_name = "SEGMENT", required = true, num_args = 1..)]
    pub segments: Vec<String>,

    /// Emit {"source", "path"} JSON instead of the bare path
    #[arg(long)]
    pub json: bool,
}
