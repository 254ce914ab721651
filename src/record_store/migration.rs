//! Upgrades a stale log to the current layout without losing rows.
//!
//! The whole log is loaded with every cell kept as text, missing columns are
//! added with their documented defaults, columns are put in current order and
//! the result is written to a temporary file next to the log. Only a complete
//! copy replaces the original, so a failure at any step leaves the log as it was.

use crate::record_store::error::MigrationError;
use crate::types::log_schema::LogSchema;
use crate::utils::parent_dir;
use log::info;
use polars::prelude::*;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// What a successful migration did.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// Known layout the log was in, `None` for an unrecognised header.
    pub from: Option<LogSchema>,
    /// Number of data rows carried over.
    pub rows: usize,
    pub added_columns: Vec<String>,
}

/// Reads a log with every column as a string column, so values are carried
/// over exactly as they were written.
pub(crate) fn read_log_as_text(path: &Path) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

pub fn migrate_log(path: &Path) -> Result<MigrationReport, MigrationError> {
    let mut frame = read_log_as_text(path).map_err(MigrationError::Read)?;
    let original: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let from = LogSchema::detect(&original);
    let target = LogSchema::Current.column_names();

    let unknown: Vec<String> = original
        .iter()
        .filter(|name| LogSchema::current_name(name).is_none())
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(MigrationError::UnknownColumns(unknown));
    }

    // Older layouts may name the same column differently.
    let existing: Vec<&'static str> = original
        .iter()
        .filter_map(|name| LogSchema::current_name(name))
        .collect();
    let mut duplicated: Vec<String> = existing
        .iter()
        .enumerate()
        .filter(|&(i, name)| existing[..i].contains(name))
        .map(|(_, name)| name.to_string())
        .collect();
    duplicated.dedup();
    if !duplicated.is_empty() {
        return Err(MigrationError::DuplicateColumns(duplicated));
    }
    frame
        .set_column_names(existing.iter().copied())
        .map_err(MigrationError::Reshape)?;

    let mut added_columns = Vec::new();
    let mut defaults = Vec::new();
    for column in &target {
        if existing.contains(column) {
            continue;
        }
        let default = LogSchema::default_cell(column)
            .ok_or_else(|| MigrationError::MissingColumn(column.to_string()))?;
        defaults.push(lit(default).alias(*column));
        added_columns.push(column.to_string());
    }

    let before = frame.height();
    let mut migrated = frame
        .lazy()
        .with_columns(defaults)
        .select(target.iter().map(|name| col(*name)).collect::<Vec<_>>())
        .collect()
        .map_err(MigrationError::Reshape)?;
    if migrated.height() != before {
        return Err(MigrationError::RowCountMismatch {
            before,
            after: migrated.height(),
        });
    }

    let mut temp = NamedTempFile::new_in(parent_dir(path)).map_err(MigrationError::TempWriteIo)?;
    CsvWriter::new(temp.as_file_mut())
        .include_header(true)
        .finish(&mut migrated)
        .map_err(MigrationError::TempWriteEncode)?;
    temp.as_file_mut()
        .flush()
        .and_then(|_| temp.as_file().sync_all())
        .map_err(MigrationError::TempWriteIo)?;
    temp.persist(path).map_err(MigrationError::Replace)?;

    info!(
        "Migrated {} ({} rows) from {} layout, added {:?}",
        path.display(),
        before,
        from.map(|s| s.to_string())
            .unwrap_or_else(|| "unrecognised".to_string()),
        added_columns
    );

    Ok(MigrationReport {
        from,
        rows: before,
        added_columns,
    })
}
