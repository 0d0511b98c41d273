//! Unified diagnostic system for the analyzer.
//!
//! Mirrors the error-kind split from spec.md §7: five fatal categories
//! (`AnalysisError`, built on `thiserror`+`miette` the way the teacher's
//! error type is) plus a non-fatal [`Diagnostic`] used by the Source
//! Validator (§4.A) and by any pipeline stage that "warns and skips" rather
//! than aborting (§4.B, §4.C, §4.F).

use std::sync::Arc;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::ast::Span;

/// Converts an AST [`Span`] into a `miette::SourceSpan` for diagnostic
/// rendering.
pub fn to_source_span(span: Span) -> SourceSpan {
    (span.start..span.end).into()
}

/// Severity of a non-fatal [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single non-fatal diagnostic: a Validator finding (spec.md §4.A) or a
/// skip/warning emitted while walking unrecognized AST or operator nodes
/// (spec.md §4.B, §4.F). Collected into the response when the request's
/// `warnings` option is set (spec.md §6).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            span,
        }
    }

    pub fn warning(message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        write!(
            f,
            "{label}: {} (at {}..{})",
            self.message, self.span.start, self.span.end
        )
    }
}

/// The five fatal error kinds from spec.md §7. Any one of these aborts the
/// request with no partial results, surfaced as the `{error}` envelope
/// (spec.md §6).
#[derive(Debug, Error, MietteDiagnostic)]
pub enum AnalysisError {
    /// The Validator (§4.A) rejected the source; carries the joined
    /// diagnostic list.
    #[error("source rejected: {}", diagnostics.join("; "))]
    #[diagnostic(code(sympath::precheck_failed))]
    PrecheckFailed { diagnostics: Vec<String> },

    /// An identifier was used without a prior declaration in any ancestor
    /// Root context's symbol table (spec.md §3 scoping invariant, §4.C
    /// failure mode, §4.F table).
    #[error("unknown symbol '{symbol}'")]
    #[diagnostic(code(sympath::unknown_symbol))]
    UnknownSymbol {
        symbol: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("referenced here")]
        span: SourceSpan,
    },

    /// A declared type fell outside `{number, boolean}` (spec.md §4.G
    /// step 1).
    #[error("unsupported declared type '{ty}'")]
    #[diagnostic(code(sympath::unsupported_type))]
    UnsupportedType {
        ty: String,
        #[source_code]
        src: Arc<NamedSource<String>>,
        #[label("declared here")]
        span: SourceSpan,
    },

    /// The SMT solver failed, timed out, or could not be set up (spec.md
    /// §4.G, §5 timeouts).
    #[error("SMT solver error: {message}")]
    #[diagnostic(code(sympath::solver_error))]
    SolverError { message: String },

    /// An engine bug; exposed as a generic message (spec.md §7).
    #[error("internal error: {message}")]
    #[diagnostic(code(sympath::internal))]
    Internal { message: String },
}

impl AnalysisError {
    /// The HTTP status family spec.md §6 assigns to each error kind:
    /// precheck/symbol/type failures are client errors, solver/internal
    /// failures are server errors.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::PrecheckFailed { .. }
                | AnalysisError::UnknownSymbol { .. }
                | AnalysisError::UnsupportedType { .. }
        )
    }
}

/// Builds a single-file `NamedSource` for attaching to span-carrying
/// errors, mirroring the teacher's `SourceContext::to_named_source`.
pub fn named_source(file_name: &str, content: &str) -> Arc<NamedSource<String>> {
    Arc::new(NamedSource::new(file_name, content.to_string()))
}
