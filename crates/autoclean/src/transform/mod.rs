//! Table transforms applied after cleaning.
//!
//! Every transform takes a table by reference and returns a new one, so a
//! caller's table is never modified. Column-local anomalies are recorded as
//! diagnostics instead of failing the transform.

use polars::prelude::*;

use crate::error::Result;
use crate::types::Diagnostic;

mod encoder;
mod scaler;

pub use encoder::OneHotEncoder;
pub use scaler::StandardScaler;

/// A transform from one table to another.
///
/// All transforms must be thread-safe (Send + Sync) so a configured pipeline
/// can be moved to a worker thread.
pub trait Transform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Apply the transform, appending diagnostics for anything noteworthy.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that are not local to one column.
    fn apply(&self, df: &DataFrame, diagnostics: &mut Vec<Diagnostic>) -> Result<DataFrame>;

    /// Apply the transform and discard diagnostics.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut diagnostics = Vec::new();
        self.apply(df, &mut diagnostics)
    }
}
