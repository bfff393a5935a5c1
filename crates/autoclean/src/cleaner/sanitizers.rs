//! Text normalization.

/// Tokens that mean "missing" once a value is trimmed and lowercased.
const MISSING_TOKENS: [&str; 2] = ["", "nan"];

/// Trim, lowercase, and map missing tokens to `None`.
pub(crate) fn normalize_value(value: &str) -> Option<String> {
    let normalized = value.trim().to_lowercase();
    if MISSING_TOKENS.contains(&normalized.as_str()) {
        None
    } else {
        Some(normalized)
    }
}

/// Normalize every value of a text column.
///
/// Returns the normalized values and how many entries changed (including
/// entries that became missing).
pub(crate) fn normalize_values(values: &[Option<String>]) -> (Vec<Option<String>>, usize) {
    let mut changed = 0;
    let normalized = values
        .iter()
        .map(|value| {
            let out = value.as_deref().and_then(normalize_value);
            if out.as_deref() != value.as_deref() {
                changed += 1;
            }
            out
        })
        .collect();
    (normalized, changed)
}
