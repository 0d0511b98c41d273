//! Structured logging setup (spec.md §8, ambient stack).
//!
//! The teacher renders diagnostics with `miette`/`termcolor` but has no
//! structured tracing layer of its own; this is an enrichment drawn from
//! the broader example pack's `tracing`/`tracing-subscriber` usage. Kept
//! deliberately small: one `fmt` subscriber, env-filter controlled, matching
//! the "initialize once at process start" shape those examples use.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::Attributes;
use tracing::Event;
use tracing_subscriber::layer::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

/// Installs a global `tracing` subscriber reading its filter from
/// `RUST_LOG`, defaulting to `info` when unset. Safe to call once per
/// process; the CLI and the HTTP server both call this from their own
/// entry points.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// A `tracing_subscriber::Layer` that appends every event it observes to a
/// shared per-request buffer, instead of (or in addition to) printing it.
/// `engine::analyze` installs one of these as a thread-local default
/// subscriber for the duration of a single request when `logging: true` is
/// requested, then drains it into the response's `trace` field (spec.md
/// §6 "Include per-stage trace in the response").
#[derive(Clone, Default)]
pub struct TraceCollector {
    lines: Arc<Mutex<Vec<String>>>,
}

impl TraceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out every line recorded so far, in emission order.
    pub fn snapshot(&self) -> Vec<String> {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl<S: tracing::Subscriber> Layer<S> for TraceCollector {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &tracing::span::Id, _ctx: Context<'_, S>) {
        let mut message = String::new();
        let mut visitor = LineVisitor::default();
        attrs.record(&mut visitor);
        let _ = write!(message, "{} enter", attrs.metadata().name());
        if !visitor.fields.is_empty() {
            let _ = write!(message, " {}", visitor.fields);
        }
        self.push(message);
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let mut message = format!(
            "{} {}",
            event.metadata().level(),
            event.metadata().target()
        );
        if !visitor.message.is_empty() {
            let _ = write!(message, ": {}", visitor.message);
        }
        if !visitor.fields.is_empty() {
            let _ = write!(message, " {}", visitor.fields);
        }
        self.push(message);
    }
}

impl TraceCollector {
    fn push(&self, line: String) {
        self.lines.lock().unwrap_or_else(|e| e.into_inner()).push(line);
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            if !self.fields.is_empty() {
                self.fields.push(' ');
            }
            let _ = write!(self.fields, "{}={value:?}", field.name());
        }
    }
}
