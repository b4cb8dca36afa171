//! Runfile manifest providers.
//!
//! Bazel exposes runfiles either through a `MANIFEST` file mapping logical
//! names to on-disk locations or through a symlink tree directory. Both are
//! hidden behind [`RunfileManifest`] so the resolver never touches process
//! environment itself.
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE_VAR: &str = "RUNFILES_MANIFEST_FILE";
const RUNFILES_DIR_VAR: &str = "RUNFILES_DIR";
const TEST_SRCDIR_VAR: &str = "TEST_SRCDIR";

/// Lookup capability: logical runfile name to a filesystem location.
pub trait RunfileManifest {
    /// Return the registered location, or `None` when the name is unknown.
    fn rlocation(&self, logical: &str) -> Option<PathBuf>;
}

impl<T: RunfileManifest + ?Sized> RunfileManifest for &T {
    fn rlocation(&self, logical: &str) -> Option<PathBuf> {
        (**self).rlocation(logical)
    }
}

/// Parsed Bazel `MANIFEST` file.
#[derive(Debug, Clone, Default)]
pub struct ManifestFile {
    entries: BTreeMap<String, PathBuf>,
}

impl ManifestFile {
    /// Read and parse a manifest file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read runfiles manifest {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Parse manifest text: one `<logical> <actual>` pair per line.
    ///
    /// Lines without a space map the name to itself, which is how Bazel
    /// records empty files.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| match line.split_once(' ') {
                Some((logical, actual)) => (logical.to_string(), PathBuf::from(actual)),
                None => (line.to_string(), PathBuf::from(line)),
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RunfileManifest for ManifestFile {
    fn rlocation(&self, logical: &str) -> Option<PathBuf> {
        self.entries.get(logical).cloned()
    }
}

/// Runfiles symlink tree rooted at a directory.
#[derive(Debug, Clone)]
pub struct DirectoryRunfiles {
    root: PathBuf,
}

impl DirectoryRunfiles {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RunfileManifest for DirectoryRunfiles {
    fn rlocation(&self, logical: &str) -> Option<PathBuf> {
        Some(self.root.join(logical))
    }
}

/// Runfiles-related variables captured from the process.
#[derive(Debug, Clone, Default)]
pub struct RunfilesEnv {
    pub manifest_file: Option<PathBuf>,
    pub runfiles_dir: Option<PathBuf>,
    pub test_srcdir: Option<PathBuf>,
    pub argv0: Option<PathBuf>,
}

impl RunfilesEnv {
    /// Snapshot the current process environment.
    pub fn from_process() -> Self {
        Self {
            manifest_file: non_empty_var(MANIFEST_FILE_VAR),
            runfiles_dir: non_empty_var(RUNFILES_DIR_VAR),
            test_srcdir: non_empty_var(TEST_SRCDIR_VAR),
            argv0: env::args_os().next().map(PathBuf::from),
        }
    }
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    non_empty(env::var_os(name))
}

/// Bazel treats a set-but-empty variable as unset.
fn non_empty(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|value| !value.is_empty()).map(PathBuf::from)
}

/// Process-wide runfiles provider, discovered once at startup.
#[derive(Debug, Clone)]
pub enum Runfiles {
    Manifest(ManifestFile),
    Directory(DirectoryRunfiles),
    /// Not running under Bazel; every lookup misses.
    Unavailable,
}

impl Runfiles {
    /// Discover runfiles from the current process environment.
    pub fn from_env() -> Result<Self> {
        Self::discover(&RunfilesEnv::from_process())
    }

    /// Pick a provider from captured variables.
    ///
    /// Precedence: explicit manifest file, runfiles directory, `TEST_SRCDIR`,
    /// then `<argv0>.runfiles_manifest` / `<argv0>.runfiles` next to the binary.
    pub fn discover(vars: &RunfilesEnv) -> Result<Self> {
        if let Some(path) = &vars.manifest_file {
            return Ok(Self::Manifest(ManifestFile::load(path)?));
        }
        if let Some(dir) = vars.runfiles_dir.as_ref().or(vars.test_srcdir.as_ref()) {
            return Ok(Self::Directory(DirectoryRunfiles::new(dir.clone())));
        }
        if let Some(argv0) = &vars.argv0 {
            let manifest = sibling_with_suffix(argv0, ".runfiles_manifest");
            if manifest.is_file() {
                return Ok(Self::Manifest(ManifestFile::load(&manifest)?));
            }
            let dir = sibling_with_suffix(argv0, ".runfiles");
            if dir.is_dir() {
                return Ok(Self::Directory(DirectoryRunfiles::new(dir)));
            }
        }
        Ok(Self::Unavailable)
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Manifest(_) => "manifest",
            Self::Directory(_) => "directory",
            Self::Unavailable => "unavailable",
        }
    }
}

impl RunfileManifest for Runfiles {
    fn rlocation(&self, logical: &str) -> Option<PathBuf> {
        match self {
            Self::Manifest(manifest) => manifest.rlocation(logical),
            Self::Directory(dir) => dir.rlocation(logical),
            Self::Unavailable => None,
        }
    }
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

/// In-memory manifest for tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticManifest {
    entries: BTreeMap<String, PathBuf>,
}

#[cfg(test)]
impl StaticManifest {
    pub fn with(mut self, logical: &str, actual: impl Into<PathBuf>) -> Self {
        self.entries.insert(logical.to_string(), actual.into());
        self
    }
}

#[cfg(test)]
impl RunfileManifest for StaticManifest {
    fn rlocation(&self, logical: &str) -> Option<PathBuf> {
        self.entries.get(logical).cloned()
    }
}
