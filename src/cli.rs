//! The main entry point for all CLI commands. Dispatches to `analyze` or
//! `serve` and orchestrates reading input, running the pipeline, and
//! rendering output — either colorized text (via `termcolor`, the way the
//! teacher renders its own CLI output) or JSON.

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use termcolor::{Color, ColorSpec, StandardStream, WriteColor};

use crate::config::AnalysisOptions;
use crate::diagnostics::AnalysisError;
use crate::engine::{self, AnalysisResponse};

#[derive(Parser)]
#[command(name = "sympath", about = "Symbolic path analysis for a small imperative language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a source file and print a reachability verdict per Path.
    Analyze {
        file: PathBuf,
        /// Print the full response as JSON instead of colorized text.
        #[arg(long)]
        json: bool,
        /// Include non-fatal diagnostics in the output.
        #[arg(long)]
        warnings: bool,
        /// Emit per-stage trace logs (honors RUST_LOG).
        #[arg(long)]
        trace: bool,
        #[arg(long, default_value_t = 10_000)]
        analysis_timeout_ms: u64,
        #[arg(long, default_value_t = 2_000)]
        path_solver_timeout_ms: u32,
    },
    /// Run the HTTP façade exposing `POST /analyze`.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

/// The CLI entry point, called from `main`.
pub fn run() {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Analyze {
            file,
            json,
            warnings,
            trace,
            analysis_timeout_ms,
            path_solver_timeout_ms,
        } => {
            if trace {
                crate::logging::init();
            }
            let options = AnalysisOptions {
                warnings,
                logging: trace,
                analysis_timeout_ms,
                path_solver_timeout_ms,
            };
            handle_analyze(&file, json, &options)
        }
        Command::Serve { port } => {
            crate::logging::init();
            handle_serve(port)
        }
    };

    if let Err(err) = result {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}

fn handle_analyze(
    file: &PathBuf,
    json: bool,
    options: &AnalysisOptions,
) -> Result<(), AnalysisError> {
    let source_name = file.to_string_lossy().into_owned();
    let source_text = std::fs::read_to_string(file).map_err(|e| AnalysisError::Internal {
        message: format!("failed to read '{source_name}': {e}"),
    })?;

    let response = engine::analyze(&source_name, &source_text, options)?;

    if json {
        let payload = serde_json::to_string_pretty(&response).map_err(|e| AnalysisError::Internal {
            message: format!("failed to serialize response: {e}"),
        })?;
        println!("{payload}");
    } else {
        print_human(&response);
    }

    Ok(())
}

fn print_human(response: &AnalysisResponse) {
    let mut stdout = StandardStream::stdout(termcolor::ColorChoice::Auto);

    let notes = response.path_notes();
    if notes.is_empty() {
        println!("No dead or inconclusive paths found.");
    }
    for note in notes {
        let (color, label) = if note.reachable {
            (Color::Yellow, "UNKNOWN")
        } else {
            (Color::Red, "UNREACHABLE")
        };
        let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
        let _ = write!(stdout, "{label}");
        let _ = stdout.reset();
        println!(" (lines {}-{})", note.start_line, note.end_line);
        if let Some(explanation) = &note.explanation {
            println!("  {explanation}");
        }
    }

    if let Some(warnings) = response.warnings() {
        for warning in warnings {
            let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
            println!("warning: {warning}");
            let _ = stdout.reset();
        }
    }

    if let Some(trace) = response.trace() {
        for line in trace {
            println!("trace: {line}");
        }
    }
}

fn handle_serve(port: u16) -> Result<(), AnalysisError> {
    let runtime = tokio::runtime::Runtime::new().map_err(|e| AnalysisError::Internal {
        message: format!("failed to start async runtime: {e}"),
    })?;
    runtime.block_on(crate::server::serve(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_analyze_subcommand() {
        let cli = Cli::try_parse_from(["sympath", "analyze", "foo.src", "--json"]).unwrap();
        match cli.command {
            Command::Analyze { file, json, .. } => {
                assert_eq!(file, PathBuf::from("foo.src"));
                assert!(json);
            }
            _ => panic!("expected Analyze"),
        }
    }
}
