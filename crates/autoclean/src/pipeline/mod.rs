//! Pipeline module.
//!
//! This module provides the main cleaning pipeline and the diagnostics sinks
//! it reports through.

mod builder;
pub mod sink;

pub use builder::{Pipeline, PipelineBuilder};
pub use sink::{ClosureDiagnosticsSink, CollectingSink, DiagnosticsSink};
