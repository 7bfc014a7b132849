//! Spreadsheet export for headtrack.
//!
//! Renders the full or filtered inventory as an `.xlsx` workbook: a header
//! row of the column names followed by one row per record. The server
//! returns the workbook bytes as a download; the CLI writes them to a
//! file. Exporting an empty set is an error surfaced to the operator, not
//! a blank sheet.

use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::error::{Error, Result};
use crate::inventory::{self, ExportFilter};
use crate::record::{MachineRecord, COLUMNS};

/// Default file name for a full export.
pub const EXPORT_FILE_NAME: &str = "database_export.xlsx";

/// Default file name for a filtered export.
pub const FILTERED_EXPORT_FILE_NAME: &str = "filtered_data_export.xlsx";

/// Render every record as a workbook and return the file bytes.
///
/// # Errors
///
/// Returns [`Error::ExportEmpty`] if there are no records, or
/// [`Error::ExportFailed`] if serialization fails.
pub fn export_all(records: &[MachineRecord]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(Error::ExportEmpty);
    }
    write_workbook(records)
}

/// Filter the records, then render the matches as a workbook.
///
/// # Errors
///
/// Returns [`Error::ExportEmpty`] if nothing matched the filter, or
/// [`Error::ExportFailed`] if serialization fails.
pub fn export_filtered(records: &[MachineRecord], filter: &ExportFilter) -> Result<Vec<u8>> {
    let matched = inventory::filter(records, filter);
    if matched.is_empty() {
        return Err(Error::ExportEmpty);
    }
    write_workbook(&matched)
}

/// Write a full export to the given file path (used by the CLI).
///
/// # Errors
///
/// Returns an export error or a file-write error.
pub fn write_to_file(records: &[MachineRecord], path: impl AsRef<Path>) -> Result<()> {
    let bytes = export_all(records)?;
    std::fs::write(path.as_ref(), bytes)?;
    debug!("Wrote export to {}", path.as_ref().display());
    Ok(())
}

/// Serialize records into xlsx bytes: header row plus one row per record.
fn write_workbook(records: &[MachineRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string(0, u16::try_from(col).unwrap_or(u16::MAX), *name)?;
    }
    for (row, record) in records.iter().enumerate() {
        let row = u32::try_from(row + 1).unwrap_or(u32::MAX);
        for (col, value) in record.values().iter().enumerate() {
            worksheet.write_string(row, u16::try_from(col).unwrap_or(u16::MAX), *value)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!("Rendered {} records into {} bytes", records.len(), bytes.len());
    Ok(bytes)
}
