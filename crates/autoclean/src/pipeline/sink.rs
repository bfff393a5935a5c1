//! Diagnostics sinks for the cleaning pipeline.
//!
//! The pipeline never prints. Every stage event and every column-local anomaly
//! is handed to a [`DiagnosticsSink`] injected through the builder.
//!
//! # Example
//!
//! ```rust,ignore
//! use autoclean::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_diagnostic(|d| println!("[{}] {}", d.stage, d.message))
//!     .build()?
//!     .process(&df)?;
//! ```

use std::sync::{Arc, Mutex};

use crate::types::Diagnostic;

/// Receives diagnostics as the pipeline produces them.
///
/// Implementations must be thread-safe so a configured pipeline can be moved
/// to another thread.
///
/// # Example
///
/// ```rust,ignore
/// struct StderrSink;
///
/// impl DiagnosticsSink for StderrSink {
///     fn record(&self, diagnostic: &Diagnostic) {
///         eprintln!("{diagnostic}");
///     }
/// }
/// ```
pub trait DiagnosticsSink: Send + Sync {
    /// Called once per diagnostic, in the order they were produced.
    fn record(&self, diagnostic: &Diagnostic);
}

/// Wrapper that implements [`DiagnosticsSink`] using a closure.
pub struct ClosureDiagnosticsSink<F>
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureDiagnosticsSink<F>
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> DiagnosticsSink for ClosureDiagnosticsSink<F>
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn record(&self, diagnostic: &Diagnostic) {
        (self.callback)(diagnostic);
    }
}

/// Sink that keeps every diagnostic in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DiagnosticsSink for CollectingSink {
    fn record(&self, diagnostic: &Diagnostic) {
        let mut guard = match self.diagnostics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(diagnostic.clone());
    }
}

static_assertions::assert_impl_all!(CollectingSink: Send, Sync);
static_assertions::assert_impl_all!(Diagnostic: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CleaningStage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_sink_invoked() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let sink = ClosureDiagnosticsSink::new(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        sink.record(&Diagnostic::info(CleaningStage::Encoding, "X", "one"));
        sink.record(&Diagnostic::info(CleaningStage::Scaling, "Y", "two"));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_collecting_sink_shares_buffer() {
        let sink = CollectingSink::new();
        let clone = sink.clone();
        clone.record(&Diagnostic::warning(CleaningStage::Imputation, "W", "warn"));

        let recorded = sink.diagnostics();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].code, "W");
    }
}
