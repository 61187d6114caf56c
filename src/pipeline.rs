//! The compile run: load, validate, emit.
//!
//! Stages advance strictly in order. A load or shape failure ends the run
//! before validation; an error-level issue ends it before emission. Either way
//! nothing is written.

use crate::config::CompileConfig;
use crate::emit::render_artifacts;
use crate::error::{CompileError, Result};
use crate::loader::load_model;
use crate::output::persist_artifacts;
use crate::validate::{Issue, Normalized, normalize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Loading,
    Validating,
    Emitting,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Loading => "loading",
            Stage::Validating => "validating",
            Stage::Emitting => "emitting",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct Outcome {
    pub entities: usize,
    /// Every issue found; only warnings when the run succeeded.
    pub issues: Vec<Issue>,
    /// Written artifact paths, empty in check mode.
    pub artifacts: Vec<PathBuf>,
}

struct Tracker {
    stage: Stage,
}

impl Tracker {
    fn start() -> Self {
        debug!(stage = %Stage::Loading, "compile stage");
        Self {
            stage: Stage::Loading,
        }
    }

    fn advance(&mut self, next: Stage) {
        debug!(from = %self.stage, to = %next, "compile stage");
        self.stage = next;
    }

    fn fail(&mut self, err: CompileError) -> CompileError {
        self.advance(Stage::Failed);
        err
    }
}

/// Run one compile against `config`.
///
/// An output directory that overlaps the sources is refused before anything
/// is read.
pub fn run(config: &CompileConfig) -> Result<Outcome> {
    let mut tracker = Tracker::start();
    config.check_output_dir().map_err(|err| tracker.fail(err))?;

    let model = load_model(&config.source_dir).map_err(|err| tracker.fail(err))?;
    let entities = model.entity_count();

    tracker.advance(Stage::Validating);
    let normalized = normalize(&model);
    report_issues(&normalized);
    if normalized.has_errors() {
        let errors = normalized.errors().count();
        return Err(tracker.fail(CompileError::Validation { errors }));
    }

    let mut artifacts = Vec::new();
    if config.check_only {
        info!(
            entities,
            warnings = normalized.issues.len(),
            "model is valid; check mode writes nothing"
        );
    } else {
        tracker.advance(Stage::Emitting);
        let rendered =
            render_artifacts(&model, &normalized.index).map_err(|err| tracker.fail(err))?;
        artifacts =
            persist_artifacts(&config.output_dir, &rendered).map_err(|err| tracker.fail(err))?;
        info!(
            entities,
            warnings = normalized.issues.len(),
            artifacts = artifacts.len(),
            out = %config.output_dir.display(),
            "model compiled"
        );
    }

    tracker.advance(Stage::Done);
    Ok(Outcome {
        entities,
        issues: normalized.issues,
        artifacts,
    })
}

/// Warnings first, then errors, each group in layer walk order.
fn report_issues(normalized: &Normalized) {
    for issue in normalized.warnings() {
        warn!(code = %issue.code, "{}", issue.message);
    }
    for issue in normalized.errors() {
        error!(code = %issue.code, "{}", issue.message);
    }
}
