//! Dataset discovery and CSV persistence.

use crate::error::{CleaningError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows scanned when inferring the schema of a CSV file.
pub const SCHEMA_INFERENCE_ROWS: usize = 100;

/// Find the first `*.csv` file in `dir`, ordered by file name.
///
/// Returns [`CleaningError::MissingInput`] when the directory does not exist
/// or holds no CSV file.
pub fn find_dataset(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(CleaningError::MissingInput(format!(
            "directory not found: {}",
            dir.display()
        )));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();
    debug!("Found {} CSV candidates in {}", candidates.len(), dir.display());

    candidates.into_iter().next().ok_or_else(|| {
        CleaningError::MissingInput(format!("no CSV file found in {}", dir.display()))
    })
}

/// Load a CSV file with a header row.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CleaningError::MissingInput(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(SCHEMA_INFERENCE_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    info!(
        "Loaded {} ({} rows x {} columns)",
        path.display(),
        df.height(),
        df.width()
    );
    Ok(df)
}

/// Write a table as CSV with a header row, creating parent directories.
pub fn write_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    let mut output = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut output)?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}
