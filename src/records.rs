//! Record normalization: turning a tabular source into fixed-width text
//! records.
//!
//! Every spreadsheet row becomes a [`Record`] of exactly [`RECORD_WIDTH`]
//! text fields, in source order. Ragged rows are padded or truncated, absent
//! cells become empty strings, and no row is treated as a header.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};

/// Number of text fields in every normalized record.
pub const RECORD_WIDTH: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum SourceReadError {
    #[error("failed to open workbook: {0}")]
    Open(#[from] calamine::Error),
    #[error("workbook contains no sheets")]
    NoSheets,
    #[error("failed to read sheet '{0}': {1}")]
    Sheet(String, #[source] calamine::Error),
}

/// A single lesson record: exactly [`RECORD_WIDTH`] text fields.
///
/// Field 0 is the spoken phrase; the remaining fields carry accompanying
/// text (translation, reading, notes) and pass through untouched.
/// Serializes as a bare JSON array of 4 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record(pub [String; RECORD_WIDTH]);

impl Record {
    /// Build a record from an arbitrary-width row of cell texts.
    ///
    /// Rows narrower than [`RECORD_WIDTH`] are right-padded with empty
    /// strings; wider rows keep only their first [`RECORD_WIDTH`] values.
    pub fn from_cells<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut fields: [String; RECORD_WIDTH] = std::array::from_fn(|_| String::new());
        let mut cells = cells.into_iter();
        for field in fields.iter_mut() {
            match cells.next() {
                Some(value) => *field = value,
                None => break,
            }
        }
        Record(fields)
    }

    /// The spoken-phrase column (field 0), untrimmed.
    pub fn phrase(&self) -> &str {
        &self.0[0]
    }

    /// All fields in order.
    pub fn fields(&self) -> &[String; RECORD_WIDTH] {
        &self.0
    }
}

/// Read a spreadsheet into normalized records, in source row order.
///
/// Opens the workbook (format detected from the file), takes its first
/// sheet, and normalizes every row of the used range. The first row is data
/// like any other; there is no header handling.
pub fn read_records(path: &Path) -> Result<Vec<Record>, SourceReadError> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(SourceReadError::NoSheets)?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| SourceReadError::Sheet(sheet.clone(), e))?;

    log::info!(
        "read sheet '{}' from {}: {} rows",
        sheet,
        path.display(),
        range.height()
    );

    Ok(range
        .rows()
        .map(|cells| Record::from_cells(cells.iter().map(cell_text)))
        .collect())
}

/// Textual representation of one cell. Logically-absent cells become the
/// empty string, never a "missing" literal.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}
