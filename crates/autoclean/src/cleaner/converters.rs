//! Numeric reinterpretation of text columns.
//!
//! Coercion is an explicit parse-and-count: every non-missing value is parsed,
//! successes are counted and compared against the threshold. Nothing relies on
//! a parse failure aborting the column.

use crate::utils::parse_number;

/// Result of parsing every non-missing value of a text column.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NumericParse {
    /// Parsed values; entries that were missing or failed to parse are `None`.
    pub values: Vec<Option<f64>>,
    pub non_missing: usize,
    pub parsed: usize,
}

impl NumericParse {
    /// Share of non-missing values that parsed. Zero when nothing is present.
    pub fn success_ratio(&self) -> f64 {
        if self.non_missing == 0 {
            0.0
        } else {
            self.parsed as f64 / self.non_missing as f64
        }
    }

    /// Whether the column should become numeric: strictly more than
    /// `threshold` of the present values parsed.
    pub fn should_convert(&self, threshold: f64) -> bool {
        self.non_missing > 0 && self.parsed as f64 > threshold * self.non_missing as f64
    }

    /// Values that were present but did not parse.
    pub fn failures(&self) -> usize {
        self.non_missing - self.parsed
    }
}

/// Parse each present value as a number and count the successes.
pub(crate) fn parse_numeric(values: &[Option<String>]) -> NumericParse {
    let mut non_missing = 0;
    let mut parsed = 0;
    let values = values
        .iter()
        .map(|value| {
            let value = value.as_deref()?;
            non_missing += 1;
            let number = parse_number(value);
            if number.is_some() {
                parsed += 1;
            }
            number
        })
        .collect();

    NumericParse {
        values,
        non_missing,
        parsed,
    }
}
