//! Run configuration: where the layers live, where artifacts go.
//!
//! Each field resolves from the command line first, then the environment,
//! then a default relative to the discovered model root.

use crate::error::{CompileError, Result};
use crate::loader::Layer;
use anyhow::Context;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const ROOT_ENV: &str = "PRODUCT_MODEL_ROOT";
pub const SRC_ENV: &str = "PRODUCT_MODEL_SRC";
pub const OUT_ENV: &str = "PRODUCT_MODEL_OUT";

const DEFAULT_SOURCE_DIR: &str = "model";
const DEFAULT_OUTPUT_DIR: &str = "build/model";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Load and validate only; write nothing.
    pub check_only: bool,
}

/// Values taken from the command line. `None` defers to the environment.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub check_only: bool,
}

impl CompileConfig {
    /// Resolve against the real process environment and working directory.
    pub fn resolve(overrides: ConfigOverrides) -> anyhow::Result<Self> {
        let cwd = env::current_dir().context("unable to read the current directory")?;
        let config = Self::resolve_with(overrides, &cwd, |key| env::var(key).ok())?;
        Ok(config)
    }

    /// Resolution with an injectable environment, so callers and tests never
    /// have to mutate process state.
    pub fn resolve_with<F>(overrides: ConfigOverrides, cwd: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
        };

        let explicit_source = overrides.source_dir.or_else(|| from_env(SRC_ENV));
        let explicit_output = overrides.output_dir.or_else(|| from_env(OUT_ENV));

        let root = if explicit_source.is_some() && explicit_output.is_some() {
            cwd.to_path_buf()
        } else {
            find_model_root(from_env(ROOT_ENV).as_deref(), cwd)
        };

        let source_dir = match explicit_source {
            Some(path) => cwd.join(path),
            None => root.join(DEFAULT_SOURCE_DIR),
        };
        let output_dir = match explicit_output {
            Some(path) => cwd.join(path),
            None => root.join(DEFAULT_OUTPUT_DIR),
        };

        let source_dir = resolve_physical(&source_dir);
        let output_dir = resolve_physical(&output_dir);
        check_output_is_disjoint(&source_dir, &output_dir, &[cwd, &root])?;

        Ok(Self {
            source_dir,
            output_dir,
            check_only: overrides.check_only,
        })
    }

    /// Re-check a config that may have been built by hand: the output must
    /// not overlap the sources or enclose the working directory.
    pub fn check_output_dir(&self) -> Result<()> {
        let cwd = env::current_dir().ok();
        let protected: Vec<&Path> = cwd.iter().map(PathBuf::as_path).collect();
        check_output_is_disjoint(
            &resolve_physical(&self.source_dir),
            &resolve_physical(&self.output_dir),
            &protected,
        )
    }
}

/// Absolute path with `.`/`..` folded and the longest existing prefix
/// canonicalized, so symlinks and not-yet-created directories compare alike.
fn resolve_physical(path: &Path) -> PathBuf {
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                folded.pop();
            }
            other => folded.push(other.as_os_str()),
        }
    }

    let mut existing = folded.as_path();
    let mut missing = Vec::new();
    loop {
        if let Ok(real) = fs::canonicalize(existing) {
            let mut resolved = real;
            resolved.extend(missing.iter().rev());
            return resolved;
        }
        match (existing.file_name(), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return folded,
        }
    }
}

/// The output directory is replaced wholesale on every run, so it must not
/// overlap the sources or enclose any of `protected`.
fn check_output_is_disjoint(source: &Path, output: &Path, protected: &[&Path]) -> Result<()> {
    if output.starts_with(source) || source.starts_with(output) {
        return Err(CompileError::Config(format!(
            "output directory {} overlaps source directory {}",
            output.display(),
            source.display()
        )));
    }
    for dir in protected {
        if resolve_physical(dir).starts_with(output) {
            return Err(CompileError::Config(format!(
                "output directory {} would replace {}",
                output.display(),
                dir.display()
            )));
        }
    }
    Ok(())
}

/// True when `candidate/model/` holds a vision layer in any accepted format.
fn is_model_root(candidate: &Path) -> bool {
    let source = candidate.join(DEFAULT_SOURCE_DIR);
    Layer::Vision
        .candidate_paths(&source)
        .iter()
        .any(|path| path.is_file())
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_model_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Locate the directory that owns `model/`.
///
/// An explicit hint wins only when it really contains a model; otherwise the
/// search climbs from `cwd`, and falls back to `cwd` itself so a missing model
/// surfaces as a load error naming the expected path.
pub fn find_model_root(hint: Option<&Path>, cwd: &Path) -> PathBuf {
    if let Some(hint) = hint {
        let hinted = cwd.join(hint);
        if is_model_root(&hinted) {
            return hinted;
        }
        tracing::debug!(hint = %hinted.display(), "ignoring {ROOT_ENV}: no model found there");
    }
    search_upwards(cwd).unwrap_or_else(|| cwd.to_path_buf())
}
