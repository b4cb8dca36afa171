//! Runfile resolution with a repository-layout fallback.
//!
//! The same binaries run inside a hermetic Bazel sandbox, where a generated
//! manifest says where each file lives, and from a plain checkout, where files
//! sit at fixed paths under the repository root. Resolution asks the manifest
//! first and otherwise falls back to `<legacy root>/<path>`.
mod manifest;
mod normalize;

pub(crate) use manifest::{RunfileManifest, Runfiles};
#[cfg(test)]
pub(crate) use manifest::{DirectoryRunfiles, StaticManifest};

use normalize::normalize_join;

use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Logical root under which this repository's files are registered.
pub const REPO_NAME: &str = "com_github_ray_project_ray";

/// Parents between this crate's manifest dir and the repository root.
///
/// Assumes the crate is checked in at `<repo>/ci/<crate>`. Built from any
/// other location, the legacy root is whatever directory sits two levels
/// above `Cargo.toml` (or `/` when there is none), so fallback paths only
/// make sense once the crate is deployed at that layout.
const LEGACY_ROOT_PARENTS: usize = 2;

/// Repository root used when the manifest cannot resolve a path.
pub fn default_legacy_root() -> PathBuf {
    let anchor = Path::new(env!("CARGO_MANIFEST_DIR"));
    anchor
        .ancestors()
        .take(LEGACY_ROOT_PARENTS + 1)
        .last()
        .unwrap_or(anchor)
        .to_path_buf()
}

/// Which strategy produced a resolved path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "path", rename_all = "snake_case")]
pub enum Resolution {
    Manifest(PathBuf),
    Legacy(PathBuf),
}

impl Resolution {
    pub fn path(&self) -> &Path {
        match self {
            Self::Manifest(path) | Self::Legacy(path) => path,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Self::Manifest(path) | Self::Legacy(path) => path,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Manifest(_) => "manifest",
            Self::Legacy(_) => "legacy",
        }
    }
}

/// Resolves repository-relative paths through an injected manifest.
#[derive(Debug, Clone)]
pub struct RunfileResolver<M> {
    manifest: M,
    legacy_root: PathBuf,
}

impl<M: RunfileManifest> RunfileResolver<M> {
    /// Create a resolver that falls back to [`default_legacy_root`].
    pub fn new(manifest: M) -> Self {
        Self::with_legacy_root(manifest, default_legacy_root())
    }

    pub fn with_legacy_root(manifest: M, legacy_root: PathBuf) -> Self {
        Self {
            manifest,
            legacy_root,
        }
    }

    pub fn legacy_root(&self) -> &Path {
        &self.legacy_root
    }

    /// Resolve path segments to an absolute location.
    ///
    /// A missing resource is not an error: the legacy path is returned and the
    /// caller fails later when opening it. Only an empty segment list errors.
    pub fn resolve<I, S>(&self, segments: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_detailed(segments).map(Resolution::into_path)
    }

    /// Like [`Self::resolve`], but reports which strategy fired.
    pub fn resolve_detailed<I, S>(&self, segments: I) -> Result<Resolution>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rel = normalize_join(segments)
            .ok_or_else(|| anyhow!("runfile path needs at least one segment"))?;
        let logical = logical_name(&rel);

        if let Some(found) = self
            .manifest
            .rlocation(&logical)
            .filter(|path| path.exists())
        {
            tracing::debug!(logical = %logical, path = %found.display(), "resolved runfile");
            return Ok(Resolution::Manifest(found));
        }

        // No existence check on the fallback.
        let fallback = self.legacy_root.join(&rel);
        tracing::warn!(
            path = %rel,
            fallback = %fallback.display(),
            "could not resolve runfile {rel}, using legacy path"
        );
        Ok(Resolution::Legacy(fallback))
    }
}

fn logical_name(rel: &str) -> String {
    if rel.starts_with('/') {
        return rel.to_string();
    }
    format!("{REPO_NAME}/{rel}")
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
