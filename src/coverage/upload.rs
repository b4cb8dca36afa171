//! Coverage data upload to S3.
use crate::process::{CommandLine, CommandRunner};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

/// Environment override for the AWS CLI command line.
pub const AWS_COMMAND_VAR: &str = "RAY_COVERAGE_AWS";

/// Object storage that accepts a local file under `bucket/key`.
pub trait ObjectStore {
    fn upload_file(&self, local: &Path, bucket: &str, key: &str) -> Result<()>;
}

/// Uploads through `aws s3 cp`, using whatever credentials the CLI resolves.
pub struct AwsCliStore<'a, R: CommandRunner> {
    command: CommandLine,
    runner: &'a R,
}

impl<'a, R: CommandRunner> AwsCliStore<'a, R> {
    pub fn new(command: CommandLine, runner: &'a R) -> Self {
        Self { command, runner }
    }
}

impl<R: CommandRunner> ObjectStore for AwsCliStore<'_, R> {
    fn upload_file(&self, local: &Path, bucket: &str, key: &str) -> Result<()> {
        let args = self.command.with_args([
            "s3".to_string(),
            "cp".to_string(),
            "--only-show-errors".to_string(),
            local.display().to_string(),
            format!("s3://{bucket}/{key}"),
        ]);
        self.runner
            .run(&self.command.program, &args)
            .with_context(|| format!("upload {} to s3://{bucket}/{key}", local.display()))?;
        Ok(())
    }
}

/// Object key for a coverage file collected on `date`.
pub fn object_key(prefix: &str, date: NaiveDate) -> String {
    let name = format!("ray-release-{}.cov", date.format("%Y-%m-%d"));
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        return name;
    }
    format!("{prefix}/{name}")
}
