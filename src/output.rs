//! All-or-nothing persistence of rendered artifacts.
//!
//! Artifacts are written into a staging directory created beside the output
//! directory. Only when every write succeeded does the staging directory
//! replace the output directory; otherwise it is discarded and the previous
//! output stays as it was.

use crate::emit::Artifact;
use crate::error::{CompileError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const STAGING_PREFIX: &str = ".model-staging-";
const BACKUP_PREFIX: &str = ".model-previous-";

/// Write `artifacts` under `out_dir`, replacing its previous contents.
///
/// Returns the final path of every written artifact. Every artifact is
/// attempted even after a failure so the error lists all of them.
pub fn persist_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>> {
    let staging = staging_dir(out_dir)?;

    let mut failures = Vec::new();
    for artifact in artifacts {
        let target = staging.path().join(&artifact.path);
        if let Err(err) = write_file(&target, &artifact.contents) {
            failures.push(format!("  {}: {err}", artifact.path.display()));
        }
    }
    if !failures.is_empty() {
        return Err(CompileError::Persist { failures });
    }

    swap_into_place(staging, out_dir)?;
    tracing::debug!(dir = %out_dir.display(), count = artifacts.len(), "artifacts persisted");

    Ok(artifacts
        .iter()
        .map(|artifact| out_dir.join(&artifact.path))
        .collect())
}

fn parent_dir(out_dir: &Path) -> PathBuf {
    match out_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn sibling_dir(out_dir: &Path, prefix: &str) -> Result<TempDir> {
    let parent = parent_dir(out_dir);
    fs::create_dir_all(&parent).map_err(|err| persist_failure(&parent, err))?;
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir_in(&parent)
        .map_err(|err| persist_failure(&parent, err))
}

fn staging_dir(out_dir: &Path) -> Result<TempDir> {
    sibling_dir(out_dir, STAGING_PREFIX)
}

fn write_file(target: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(dir) = target.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(target, contents)
}

/// Move the previous output aside, move staging into place, then drop the
/// previous output. If the second move fails the previous output is restored.
fn swap_into_place(staging: TempDir, out_dir: &Path) -> Result<()> {
    if !out_dir.exists() {
        return fs::rename(staging.path(), out_dir).map_err(|err| persist_failure(out_dir, err));
    }

    let backup = sibling_dir(out_dir, BACKUP_PREFIX)?;
    let previous = backup.path().join("previous");
    fs::rename(out_dir, &previous).map_err(|err| persist_failure(out_dir, err))?;

    if let Err(err) = fs::rename(staging.path(), out_dir) {
        let mut failures = vec![format!("  {}: {err}", out_dir.display())];
        if let Err(restore) = fs::rename(&previous, out_dir) {
            failures.push(format!(
                "  {}: previous output left at {}: {restore}",
                out_dir.display(),
                previous.display()
            ));
            // Keep the only remaining copy on disk.
            let _ = backup.keep();
        }
        return Err(CompileError::Persist { failures });
    }

    if let Err(err) = backup.close() {
        tracing::warn!(error = %err, "previous output could not be removed");
    }
    Ok(())
}

fn persist_failure(path: &Path, err: std::io::Error) -> CompileError {
    CompileError::Persist {
        failures: vec![format!("  {}: {err}", path.display())],
    }
}
