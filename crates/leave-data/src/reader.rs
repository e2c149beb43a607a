//! Loading and validation of leave applications.
//!
//! Reads an `.xlsx` (or other workbook) sheet or a CSV export with
//! `Employee_Name`, `Start_Date`, `End_Date` and `Reason` columns and turns it
//! into validated [`LeaveRow`]s. Missing files and missing columns are fatal;
//! individual bad rows follow the caller's [`InvalidRowPolicy`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use leave_core::calculations::derive_row;
use leave_core::models::{InvalidRowPolicy, LeaveRecord, LeaveRow};
use leave_core::{LeaveError, Result};
use tracing::{debug, warn};

// ── Schema ────────────────────────────────────────────────────────────────────

pub const EMPLOYEE_NAME: &str = "Employee_Name";
pub const START_DATE: &str = "Start_Date";
pub const END_DATE: &str = "End_Date";
pub const REASON: &str = "Reason";

/// Required columns in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 4] = [EMPLOYEE_NAME, START_DATE, END_DATE, REASON];

/// Extensions read as spreadsheet workbooks; anything else is parsed as CSV.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

// ── Public types ──────────────────────────────────────────────────────────────

/// A row that was dropped under [`InvalidRowPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RowError {
    /// 1-based line of a CSV file, or sheet row of a workbook, where the
    /// record starts.
    pub line: usize,
    /// Employee name when it could be read.
    pub employee: Option<String>,
    pub message: String,
}

/// Output of [`load_leave_records`].
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub source: PathBuf,
    pub rows: Vec<LeaveRow>,
    pub row_errors: Vec<RowError>,
    /// Data rows seen, valid or not.
    pub rows_read: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load, validate and enrich every leave application in `path`.
///
/// The first worksheet is read when the extension is one of
/// [`WORKBOOK_EXTENSIONS`]; any other file is read as CSV.
///
/// # Errors
///
/// * [`LeaveError::MissingSource`] when `path` does not exist.
/// * [`LeaveError::Workbook`] when a workbook cannot be opened.
/// * [`LeaveError::Schema`] naming every absent required column.
/// * [`LeaveError::Data`] for the first bad row under
///   [`InvalidRowPolicy::Abort`].
pub fn load_leave_records(path: &Path, policy: InvalidRowPolicy) -> Result<LoadedDataset> {
    if !path.exists() {
        return Err(LeaveError::MissingSource(path.to_path_buf()));
    }

    let table = if is_workbook(path) {
        read_workbook(path)?
    } else {
        read_csv(path)?
    };
    let columns = resolve_columns(&table.headers)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let rows_read = table.records.len();

    for SourceRecord { line, cells } in table.records {
        let outcome = cells
            .map_err(|message| (None, message))
            .and_then(|record| parse_row(&record, &columns));

        match outcome {
            Ok(row) => rows.push(row),
            Err((employee, message)) => match policy {
                InvalidRowPolicy::Abort => return Err(LeaveError::Data { line, message }),
                InvalidRowPolicy::Skip => {
                    warn!("Skipping line {} of {}: {}", line, path.display(), message);
                    row_errors.push(RowError {
                        line,
                        employee,
                        message,
                    });
                }
            },
        }
    }

    debug!(
        "Loaded {}: {} read, {} valid, {} skipped",
        path.display(),
        rows_read,
        rows.len(),
        row_errors.len()
    );

    Ok(LoadedDataset {
        source: path.to_path_buf(),
        rows,
        row_errors,
        rows_read,
    })
}

/// Coerce a spreadsheet date cell to a calendar date.
///
/// Accepts ISO dates, ISO datetimes (the time part is discarded), `YYYY/MM/DD`
/// and US-style `MM/DD/YYYY`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
}

// ── Sources ───────────────────────────────────────────────────────────────────

/// One data record and the line it starts on.
struct SourceRecord {
    line: usize,
    cells: std::result::Result<StringRecord, String>,
}

/// Header row plus data records, whatever the file format.
struct SourceTable {
    headers: StringRecord,
    records: Vec<SourceRecord>,
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

fn read_csv(path: &Path) -> Result<SourceTable> {
    let content = std::fs::read(path).map_err(|source| LeaveError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let lines = LineIndex::new(&content);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_slice());

    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    let mut last_line = 1usize;
    for result in reader.records() {
        let record = match result {
            Ok(record) => SourceRecord {
                line: record
                    .position()
                    .map_or(last_line + 1, |p| lines.line_of(p.byte())),
                cells: Ok(record),
            },
            Err(e) => SourceRecord {
                line: e
                    .position()
                    .map_or(last_line + 1, |p| lines.line_of(p.byte())),
                cells: Err(format!("CSV parse error: {e}")),
            },
        };
        last_line = record.line;
        records.push(record);
    }

    Ok(SourceTable { headers, records })
}

/// Maps byte offsets in a CSV file to 1-based line numbers.
///
/// Blank lines are skipped by the parser and quoted fields may contain
/// newlines, so lines are counted from the raw bytes.
struct LineIndex<'a> {
    content: &'a [u8],
    newlines: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(content: &'a [u8]) -> Self {
        let newlines = content
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self { content, newlines }
    }

    /// Line of the first non-newline byte at or after `byte`, i.e. where a
    /// record starting at `byte` actually has content.
    fn line_of(&self, byte: u64) -> usize {
        let start = usize::try_from(byte).map_or(self.content.len(), |b| b.min(self.content.len()));
        let skipped = self.content[start..]
            .iter()
            .take_while(|b| matches!(b, b'\n' | b'\r'))
            .count();
        let pos = start + skipped;
        self.newlines.partition_point(|&n| n < pos) + 1
    }
}

/// Read the first worksheet. Fully empty rows are skipped like blank CSV
/// lines; every other row keeps its sheet row number.
fn read_workbook(path: &Path) -> Result<SourceTable> {
    let workbook_error = |message: String| LeaveError::Workbook {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| workbook_error("workbook has no worksheets".to_string()))?
        .map_err(|e| workbook_error(e.to_string()))?;

    // Sheet rows are 1-based and the used range may start below row 1.
    let first_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    let mut sheet_rows = range.rows();
    let headers = sheet_rows
        .next()
        .map(cells_to_record)
        .unwrap_or_else(StringRecord::new);

    let records = sheet_rows
        .enumerate()
        .filter(|(_, cells)| !cells.iter().all(|c| matches!(c, Data::Empty)))
        .map(|(idx, cells)| SourceRecord {
            line: first_row + idx + 1,
            cells: Ok(cells_to_record(cells)),
        })
        .collect();

    Ok(SourceTable { headers, records })
}

fn cells_to_record(cells: &[Data]) -> StringRecord {
    cells.iter().map(cell_text).collect()
}

/// Render a workbook cell the way a CSV export would spell it.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| dt.as_f64().to_string()),
        Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
        other => other.to_string(),
    }
}

// ── Columns and rows ──────────────────────────────────────────────────────────

/// Positions of the required columns within a record.
struct ColumnMap {
    employee: usize,
    start: usize,
    end: usize,
    reason: usize,
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet CSV exports often put a BOM in front of the first header.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnMap> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();

    let lookup = |column: &str| header_map.get(&column.to_ascii_lowercase()).copied();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| lookup(c).is_none())
        .map(|c| c.to_string())
        .collect();

    match (
        lookup(EMPLOYEE_NAME),
        lookup(START_DATE),
        lookup(END_DATE),
        lookup(REASON),
    ) {
        (Some(employee), Some(start), Some(end), Some(reason)) => Ok(ColumnMap {
            employee,
            start,
            end,
            reason,
        }),
        _ => Err(LeaveError::Schema { missing }),
    }
}

type RowFailure = (Option<String>, String);

fn parse_row(record: &StringRecord, columns: &ColumnMap) -> std::result::Result<LeaveRow, RowFailure> {
    let field = |idx: usize| record.get(idx).unwrap_or("").trim();

    let employee_name = field(columns.employee);
    if employee_name.is_empty() {
        return Err((None, format!("{EMPLOYEE_NAME} is empty")));
    }
    let employee = Some(employee_name.to_string());

    let reason = field(columns.reason);
    if reason.is_empty() {
        return Err((employee, format!("{REASON} is empty")));
    }

    let start_raw = field(columns.start);
    let Some(start_date) = parse_date(start_raw) else {
        return Err((employee, format!("unparseable {START_DATE} '{start_raw}'")));
    };
    let end_raw = field(columns.end);
    let Some(end_date) = parse_date(end_raw) else {
        return Err((employee, format!("unparseable {END_DATE} '{end_raw}'")));
    };

    derive_row(LeaveRecord {
        employee_name: employee_name.to_string(),
        start_date,
        end_date,
        reason: reason.to_string(),
    })
    .map_err(|e| (employee, e.to_string()))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
