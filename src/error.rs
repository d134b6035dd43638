//! Soft diagnostics and the one fallible boundary this crate has (emission
//! I/O), per spec.md §7: "advisory and conservative; it never aborts the
//! host... all errors are local."

use std::path::PathBuf;

use thiserror::Error;

use crate::ir::InstId;

/// Severity of an [`AnalysisDiagnostic`]. Missing debug info and oracle
/// `none` answers are *not* diagnostics (spec.md §7 explicitly calls them
/// "signal, not error") — only genuinely exceptional, non-fatal conditions
/// produce one, e.g. an oracle answer that appears to violate spec.md §3's
/// same-address invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Note,
    Warning,
}

/// A soft, non-fatal note collected into `AnalysisResult::diagnostics`
/// (spec.md §7's "never propagate" policy: these are returned alongside
/// the result, never as an `Err`).
#[derive(Debug, Clone)]
pub struct AnalysisDiagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub inst: Option<InstId>,
}

impl AnalysisDiagnostic {
    pub fn warning(inst: InstId, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            message: message.into(),
            inst: Some(inst),
        }
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Note,
            message: message.into(),
            inst: None,
        }
    }
}

/// The one fallible boundary in this crate: writing an emission output file
/// (spec.md §6). Per spec.md §7, a host-facing caller logs this via
/// `tracing::warn!` and continues; the analysis itself never depends on
/// emission succeeding.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
