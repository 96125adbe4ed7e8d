//! Diagnostic sinks
//!
//! Loading and saving report non-fatal problems through a [`DiagnosticSink`]
//! instead of writing to a process-wide stream. The default [`LogSink`]
//! forwards to the `log` facade; any `Fn(&Diagnostic)` closure is also a sink.

use std::sync::{Arc, Mutex};

use crate::error::Diagnostic;

/// Receiver for diagnostics raised by the parser and the settings facade
pub trait DiagnosticSink: Send + Sync {
    /// Handle one diagnostic
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Sink that forwards diagnostics to the `log` facade
///
/// Failures are logged at error level, per-line problems at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        if diagnostic.is_failure() {
            log::error!("{}", diagnostic);
        } else {
            log::warn!("{}", diagnostic);
        }
    }
}

/// Sink that keeps every diagnostic in memory
///
/// Clones share the same buffer, so one handle can be given to
/// [`Settings::with_diagnostics`](crate::Settings::with_diagnostics) while
/// another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    collected: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingSink {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.collected.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of diagnostics reported so far
    pub fn len(&self) -> usize {
        self.diagnostics().len()
    }

    /// True when nothing has been reported
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        let mut guard = match self.collected.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(diagnostic.clone());
    }
}
