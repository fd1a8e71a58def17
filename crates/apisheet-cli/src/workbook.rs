//! Workbook adapters: read job rows with calamine, write result tables with
//! rust_xlsxwriter.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use apisheet::{Exporter, JobRecord, NormalizedRecord};

/// Longest text a single cell may hold.
pub const MAX_CELL_CHARS: usize = 32_767;

// Each field accepts its Turkish header and an English alias.
const HOST_COLUMNS: &[&str] = &["dns", "host"];
const LABEL_COLUMNS: &[&str] = &["uygulamaadi", "label"];
const ENDPOINT_COLUMNS: &[&str] = &["endpoint"];
const SAMPLE_COLUMNS: &[&str] = &["postOrnek", "samplePayload"];
const METHOD_COLUMNS: &[&str] = &["requestType", "method"];

/// Errors raised by the workbook adapters.
#[derive(thiserror::Error, Debug)]
pub enum WorkbookError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Export error: {0}")]
    Export(#[from] XlsxError),
}

/// Load jobs from the first worksheet of `path`.
///
/// Never fails: an unreadable workbook is logged and yields no jobs.
pub fn load_jobs(path: &Path) -> Vec<JobRecord> {
    match read_jobs(path) {
        Ok(jobs) => {
            tracing::info!("Loaded {} job(s) from {}", jobs.len(), path.display());
            jobs
        }
        Err(e) => {
            tracing::error!("Failed to load {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Read jobs from the first worksheet of `path`.
pub fn read_jobs(path: &Path) -> Result<Vec<JobRecord>, WorkbookError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| WorkbookError::Load(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| WorkbookError::Load("workbook has no worksheets".to_string()))?
        .map_err(|e| WorkbookError::Load(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = ColumnMap::from_header(header);

    Ok(rows
        .filter(|row| !row.iter().all(|cell| matches!(cell, Data::Empty)))
        .map(|row| columns.job(row))
        .collect())
}

/// Positions of the known fields in the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    host: Option<usize>,
    label: Option<usize>,
    endpoint: Option<usize>,
    sample_payload: Option<usize>,
    method: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &[Data]) -> Self {
        let find = |aliases: &[&str]| {
            header.iter().position(|cell| {
                let name = cell_text(Some(cell));
                aliases.iter().any(|alias| *alias == name.trim())
            })
        };

        Self {
            host: find(HOST_COLUMNS),
            label: find(LABEL_COLUMNS),
            endpoint: find(ENDPOINT_COLUMNS),
            sample_payload: find(SAMPLE_COLUMNS),
            method: find(METHOD_COLUMNS),
        }
    }

    fn job(&self, row: &[Data]) -> JobRecord {
        let field = |index: Option<usize>| cell_text(index.and_then(|i| row.get(i)));

        JobRecord::new(
            field(self.host),
            field(self.label),
            field(self.endpoint),
            field(self.sample_payload),
            &field(self.method),
        )
    }
}

/// Coerce any cell, present or not, to text. Missing and empty cells are "".
pub fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(Data::Float(f)) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        Some(other) => other.to_string(),
    }
}

/// Clip `text` to what a cell can hold, on a char boundary.
fn fit_cell(text: &str) -> &str {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Writes each job's rows to its own `.xlsx` workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxExporter;

impl XlsxExporter {
    /// Write `records` under a bold header row.
    pub fn write(records: &[NormalizedRecord], target: &Path) -> Result<(), WorkbookError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let sheet = workbook.add_worksheet();

        for (col, name) in NormalizedRecord::EXPORT_COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &bold)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_number(row, 0, record.status_code)?;
            sheet.write_string(row, 1, fit_cell(&record.request_parameters))?;
            sheet.write_string(row, 2, fit_cell(&record.response_parameters))?;
            sheet.write_string(row, 3, fit_cell(&record.endpoint))?;
        }

        workbook.save(target)?;
        Ok(())
    }
}

impl Exporter for XlsxExporter {
    fn extension(&self) -> &str {
        "xlsx"
    }

    fn export(&self, records: &[NormalizedRecord], target: &Path, label: &str) -> bool {
        if records.is_empty() {
            tracing::warn!("No data for {label}, workbook not created");
            return false;
        }

        match Self::write(records, target) {
            Ok(()) => {
                tracing::info!("Saved results for {label} to {}", target.display());
                true
            }
            Err(e) => {
                tracing::error!("Failed to export {label} to {}: {e}", target.display());
                false
            }
        }
    }
}
