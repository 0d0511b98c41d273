//! Orchestration entry point threading the pipeline end to end (spec.md §2,
//! §4). Both the CLI (`cli.rs`) and the HTTP façade (`server.rs`) call
//! [`analyze`] rather than the individual stage modules directly — the same
//! "one orchestration function, many front ends" shape the teacher's
//! `run_sutra_source_with_output` gives the Sutra pipeline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info_span, instrument};
use tracing_subscriber::layer::SubscriberExt;
use z3::Config;

use crate::assembler;
use crate::ast::Type;
use crate::condition;
use crate::config::AnalysisOptions;
use crate::context::{self, Context};
use crate::diagnostics::{AnalysisError, Diagnostic};
use crate::logging::TraceCollector;
use crate::pathenum;
use crate::smt::{self, PathNote};
use crate::validator;

/// The full response shape for a successful analysis request (spec.md §6):
/// a bare ordered array of `PathNote`s when neither `warnings` nor
/// `logging` was requested, or a `{pathNotes, warnings?, trace?}` document
/// otherwise. Modeled as an untagged enum rather than a single struct with
/// optional fields so the common-case wire shape matches exactly — no
/// `warnings: null`/`trace: null` ever appears.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AnalysisResponse {
    Bare(Vec<PathNote>),
    Annotated {
        #[serde(rename = "pathNotes")]
        path_notes: Vec<PathNote>,
        #[serde(skip_serializing_if = "Option::is_none")]
        warnings: Option<Vec<Diagnostic>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        trace: Option<Vec<String>>,
    },
}

impl AnalysisResponse {
    pub fn path_notes(&self) -> &[PathNote] {
        match self {
            AnalysisResponse::Bare(notes) => notes,
            AnalysisResponse::Annotated { path_notes, .. } => path_notes,
        }
    }

    pub fn warnings(&self) -> Option<&[Diagnostic]> {
        match self {
            AnalysisResponse::Bare(_) => None,
            AnalysisResponse::Annotated { warnings, .. } => warnings.as_deref(),
        }
    }

    pub fn trace(&self) -> Option<&[String]> {
        match self {
            AnalysisResponse::Bare(_) => None,
            AnalysisResponse::Annotated { trace, .. } => trace.as_deref(),
        }
    }
}

/// Runs the full pipeline — Source Validator, AST Adapter, Context Tree
/// Builder, Path Enumerator, Statement Processor, Condition Evaluator, SMT
/// Driver, Result Assembler — over `source_text` and returns the assembled
/// response, or the first fatal `AnalysisError` encountered.
///
/// When `options.logging` is set, a [`TraceCollector`] is installed as the
/// thread-local default `tracing` subscriber for the duration of the run
/// and its captured lines are surfaced on the response's `trace` field
/// (spec.md §6 "Include per-stage trace in the response").
pub fn analyze(
    source_name: &str,
    source_text: &str,
    options: &AnalysisOptions,
) -> Result<AnalysisResponse, AnalysisError> {
    if options.logging {
        let collector = TraceCollector::new();
        let subscriber = tracing_subscriber::registry().with(collector.clone());
        let result = tracing::subscriber::with_default(subscriber, || {
            run_pipeline(source_name, source_text, options)
        });
        let trace = collector.snapshot();
        result.map(|(path_notes, warnings)| AnalysisResponse::Annotated {
            path_notes,
            warnings: options.warnings.then_some(warnings),
            trace: Some(trace),
        })
    } else {
        let (path_notes, warnings) = run_pipeline(source_name, source_text, options)?;
        Ok(if options.warnings {
            AnalysisResponse::Annotated {
                path_notes,
                warnings: Some(warnings),
                trace: None,
            }
        } else {
            AnalysisResponse::Bare(path_notes)
        })
    }
}

#[instrument(skip_all, fields(source_name))]
fn run_pipeline(
    source_name: &str,
    source_text: &str,
    options: &AnalysisOptions,
) -> Result<(Vec<PathNote>, Vec<Diagnostic>), AnalysisError> {
    let mut warnings: Vec<Diagnostic> = Vec::new();

    let (program, validate_warnings) = {
        let _span = info_span!("validate").entered();
        validator::validate(source_text)?
    };
    warnings.extend(validate_warnings);

    let root = {
        let _span = info_span!("context_tree").entered();
        context::build_context_tree(&program, &mut warnings)?
    };

    let paths = {
        let _span = info_span!("path_enumeration").entered();
        pathenum::enumerate_paths(&root)
    };

    let root_symbols = root_symbols(&root);

    let config = Config::new();
    let z3ctx = z3::Context::new(&config);

    let deadline = Instant::now() + Duration::from_millis(options.analysis_timeout_ms);
    let mut notes = Vec::with_capacity(paths.len());
    {
        let _span = info_span!("smt_driver").entered();
        for path in &paths {
            if Instant::now() >= deadline {
                return Err(AnalysisError::SolverError {
                    message: format!(
                        "analysis exceeded the {}ms overall timeout",
                        options.analysis_timeout_ms
                    ),
                });
            }
            let conditions = condition::process_path(path);
            let note = smt::evaluate_path(
                &z3ctx,
                root_symbols,
                source_name,
                source_text,
                &conditions,
                options.path_solver_timeout_ms,
                &mut warnings,
            )?;
            notes.extend(note);
        }
    }

    let path_notes = {
        let _span = info_span!("assemble").entered();
        assembler::assemble(notes)
    };

    Ok((path_notes, warnings))
}

fn root_symbols(ctx: &Context) -> &HashMap<String, Type> {
    match ctx {
        Context::Root { symbols, .. } => symbols,
        _ => unreachable!("build_context_tree always returns a Root node"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_function_is_reachable() {
        let source = "function f(a: number) { return a; }";
        let response = analyze("test.src", source, &AnalysisOptions::default()).unwrap();
        assert!(response.path_notes().is_empty());
    }

    #[test]
    fn contradictory_branch_is_unreachable() {
        let source = "function f(a: number) { if (a > 0) { if (a < 0) { return 1; } } }";
        let response = analyze("test.src", source, &AnalysisOptions::default()).unwrap();
        assert!(response.path_notes().iter().any(|n| !n.reachable));
    }

    #[test]
    fn unknown_symbol_is_fatal() {
        let source = "function f(a: number) { if (b > 0) { return 1; } }";
        let err = analyze("test.src", source, &AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownSymbol { .. }));
    }

    #[test]
    fn logging_option_populates_trace() {
        let source = "function f(a: number) { return a; }";
        let options = AnalysisOptions {
            logging: true,
            ..AnalysisOptions::default()
        };
        let response = analyze("test.src", source, &options).unwrap();
        assert!(response.trace().is_some_and(|lines| !lines.is_empty()));
    }
}
