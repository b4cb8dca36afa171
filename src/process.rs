//! Subprocess execution with check-output semantics.
use anyhow::{anyhow, Context, Result};
use std::process::{Command, Stdio};

/// A command line split into program + leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Parse a shell-quoted override such as `bazelisk --output_base=/tmp/b`.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut words = shell_words::split(raw).with_context(|| format!("parse command {raw:?}"))?;
        if words.is_empty() {
            return Err(anyhow!("command is empty"));
        }
        let program = words.remove(0);
        Ok(Self {
            program,
            args: words,
        })
    }

    /// Read an override from `var`, falling back to `default_program`.
    pub fn from_env_or(var: &str, default_program: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(raw) => Self::parse(&raw).with_context(|| format!("parse {var}")),
            Err(std::env::VarError::NotPresent) => Ok(Self::new(default_program)),
            Err(err) => Err(anyhow!("read {var}: {err}")),
        }
    }

    /// Leading arguments followed by `extra`.
    pub fn with_args<I, S>(&self, extra: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = self.args.clone();
        argv.extend(extra.into_iter().map(Into::into));
        argv
    }
}

/// Runs external tools and returns their stdout.
pub trait CommandRunner {
    /// Run `program` with `args`; a non-zero exit is an error.
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>>;
}

/// Runs commands on the host. Stderr is inherited so tool output stays visible.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<Vec<u8>> {
        let resolved =
            which::which(program).with_context(|| format!("locate {program} on PATH"))?;
        tracing::debug!(program = %resolved.display(), ?args, "running command");
        let output = Command::new(&resolved)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("run {program}"))?;
        if !output.status.success() {
            let status = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "termination by signal".to_string(),
            };
            return Err(anyhow!("{program} failed with {status}"));
        }
        Ok(output.stdout)
    }
}
