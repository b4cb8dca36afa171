use anyhow::{Context, Result};
use clap::Parser;

mod cli;
mod coverage;
mod logging;
mod process;
mod runfiles;

use cli::{CollectArgs, Command, RootArgs, RunfileArgs};
use coverage::{
    absolute_from, AwsCliStore, CoverageConfig, AWS_COMMAND_VAR, BAZEL_COMMAND_VAR,
};
use process::{CommandLine, SystemRunner};
use runfiles::{RunfileResolver, Runfiles};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    logging::init(args.verbose);

    match args.command {
        Command::Collect(args) => cmd_collect(args),
        Command::Runfile(args) => cmd_runfile(args),
    }
}

fn cmd_collect(args: CollectArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("resolve cwd")?;
    let mut config = CoverageConfig::new(&args.test_target, cwd.clone());
    if let Some(path) = &args.coverage_file {
        config.coverage_file = absolute_from(&cwd, path);
    }
    if let Some(dir) = &args.source_dir {
        config.source_dir = absolute_from(&cwd, dir);
    }
    config.upload = args.upload_target();
    config.bazel = CommandLine::from_env_or(BAZEL_COMMAND_VAR, "bazel")?;

    let runner = SystemRunner;
    let store = AwsCliStore::new(aws_command(config.upload.is_some())?, &runner);
    let today = chrono::Local::now().date_naive();
    let outcome = coverage::collect(&config, &runner, &store, today)?;

    if args.json {
        let text = serde_json::to_string_pretty(&outcome).context("serialize collect outcome")?;
        println!("{text}");
    }
    Ok(())
}

/// `RAY_COVERAGE_AWS` is only read when uploading.
fn aws_command(upload: bool) -> Result<CommandLine> {
    if !upload {
        return Ok(CommandLine::new("aws"));
    }
    CommandLine::from_env_or(AWS_COMMAND_VAR, "aws")
}

fn cmd_runfile(args: RunfileArgs) -> Result<()> {
    let runfiles = Runfiles::from_env()?;
    match &runfiles {
        Runfiles::Manifest(manifest) if manifest.is_empty() => {
            tracing::warn!("runfiles manifest has no entries")
        }
        Runfiles::Manifest(manifest) => {
            tracing::debug!(entries = manifest.len(), "loaded runfiles manifest")
        }
        Runfiles::Directory(dir) => {
            tracing::debug!(root = %dir.root().display(), "using runfiles directory")
        }
        Runfiles::Unavailable => tracing::debug!("no runfiles found"),
    }
    let kind = runfiles.kind();
    let resolver = RunfileResolver::new(runfiles);
    tracing::debug!(
        kind,
        legacy_root = %resolver.legacy_root().display(),
        "runfile resolver ready"
    );

    if args.json {
        let resolution = resolver.resolve_detailed(args.segments)?;
        tracing::debug!(
            source = resolution.source(),
            path = %resolution.path().display(),
            "resolved"
        );
        let text = serde_json::to_string_pretty(&resolution).context("serialize resolution")?;
        println!("{text}");
    } else {
        let path = resolver.resolve(args.segments)?;
        println!("{}", path.display());
    }
    Ok(())
}
