//! Analysis options (spec.md §6).
//!
//! A small, serde-driven configuration struct shared by the CLI and the
//! HTTP façade, mirroring the teacher's habit of keeping request-shaped
//! configuration as a plain `Deserialize` struct with `#[serde(default)]`
//! fields rather than hand-rolling a builder.

use serde::{Deserialize, Serialize};

fn default_warnings() -> bool {
    false
}

fn default_logging() -> bool {
    false
}

fn default_analysis_timeout_ms() -> u64 {
    10_000
}

fn default_path_solver_timeout_ms() -> u32 {
    2_000
}

/// Per-request analysis options (spec.md §6 table). All fields are
/// optional on the wire; defaults match the spec's stated values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Include non-fatal Diagnostics (§4.A/§4.C/§4.F warnings) in the
    /// response.
    #[serde(default = "default_warnings")]
    pub warnings: bool,

    /// Emit structured per-stage trace logs while running the pipeline.
    #[serde(default = "default_logging")]
    pub logging: bool,

    /// Wall-clock budget for the whole analysis request, in milliseconds.
    #[serde(default = "default_analysis_timeout_ms")]
    pub analysis_timeout_ms: u64,

    /// Per-path SMT solver timeout, in milliseconds.
    #[serde(default = "default_path_solver_timeout_ms")]
    pub path_solver_timeout_ms: u32,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            warnings: default_warnings(),
            logging: default_logging(),
            analysis_timeout_ms: default_analysis_timeout_ms(),
            path_solver_timeout_ms: default_path_solver_timeout_ms(),
        }
    }
}
