//! Decoding period files into polars frames.
//!
//! Spreadsheets go through calamine (first worksheet, first row as header);
//! CSV goes through polars' own reader. Column types are inferred from the
//! non-empty cells of each column.

use crate::error::{DouaneError, Result};
use calamine::{Data, DataType as _, Ods, Range, Reader, Xls, Xlsx};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

/// Read a whole period file from disk.
///
/// # Errors
///
/// `Load` if the file cannot be read or decoded.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_lowercase();
    let bytes = std::fs::read(path).map_err(|e| DouaneError::load(path, e))?;
    read_table_from_bytes(&bytes, &ext).map_err(|e| DouaneError::load(path, e))
}

/// Decode an in-memory period file. `extension` picks the format (no leading dot).
///
/// # Errors
///
/// `DataProcessing` if the bytes are not a table of the given format.
pub fn read_table_from_bytes(bytes: &[u8], extension: &str) -> Result<DataFrame> {
    let cursor = Cursor::new(bytes);
    match extension.to_lowercase().as_str() {
        "xlsx" | "xlsm" => {
            let mut workbook = Xlsx::new(cursor).map_err(spreadsheet_error)?;
            first_sheet(workbook.worksheet_range_at(0))
        }
        "xls" => {
            let mut workbook = Xls::new(cursor).map_err(spreadsheet_error)?;
            first_sheet(workbook.worksheet_range_at(0))
        }
        "ods" => {
            let mut workbook = Ods::new(cursor).map_err(spreadsheet_error)?;
            first_sheet(workbook.worksheet_range_at(0))
        }
        "csv" => CsvReader::new(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| DouaneError::DataProcessing(format!("CSV: {e}"))),
        other => Err(DouaneError::DataProcessing(format!(
            "Unsupported file extension: '{other}'"
        ))),
    }
}

fn spreadsheet_error(err: impl std::fmt::Display) -> DouaneError {
    DouaneError::DataProcessing(format!("Spreadsheet: {err}"))
}

fn first_sheet<E>(range: Option<std::result::Result<Range<Data>, E>>) -> Result<DataFrame>
where
    E: std::fmt::Display,
{
    let range = range
        .ok_or_else(|| DouaneError::DataProcessing("Spreadsheet has no worksheet".to_owned()))?
        .map_err(spreadsheet_error)?;
    let rows: Vec<&[Data]> = range.rows().collect();
    cells_to_frame(&rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellColType {
    Int64,
    Float64,
    Boolean,
    Datetime,
    Utf8,
}

/// Build a frame from raw rows, the first of which holds the headers.
pub(crate) fn cells_to_frame(rows: &[&[Data]]) -> Result<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let names = header_names(header);
    let mut columns = Vec::with_capacity(names.len());
    for (col_idx, name) in names.iter().enumerate() {
        let cells: Vec<Option<&Data>> = body.iter().map(|row| row.get(col_idx)).collect();
        let series = column_to_series(name, &cells, infer_column_type(&cells))?;
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}

/// Blank headers become `Unnamed: <idx>`; repeats get `.1`, `.2`, ...
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(header.len());
    for (idx, cell) in header.iter().enumerate() {
        let raw = cell_text(cell)
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format!("Unnamed: {idx}"));

        let mut name = raw.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{raw}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

fn is_missing(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

fn infer_column_type(cells: &[Option<&Data>]) -> CellColType {
    let mut values = cells.iter().flatten().filter(|c| !is_missing(c)).peekable();
    if values.peek().is_none() {
        return CellColType::Float64;
    }

    let mut all_int = true;
    let mut all_number = true;
    let mut all_bool = true;
    let mut all_datetime = true;
    for cell in values {
        let (int, number) = match cell {
            Data::Int(_) => (true, true),
            Data::Float(f) => (f.is_finite() && f.fract() == 0.0, true),
            _ => (false, false),
        };
        all_int &= int;
        all_number &= number;
        all_bool &= matches!(cell, Data::Bool(_));
        all_datetime &= matches!(cell, Data::DateTime(_) | Data::DateTimeIso(_));
    }

    if all_int {
        CellColType::Int64
    } else if all_number {
        CellColType::Float64
    } else if all_bool {
        CellColType::Boolean
    } else if all_datetime {
        CellColType::Datetime
    } else {
        CellColType::Utf8
    }
}

fn present(cell: Option<&Data>) -> Option<&Data> {
    cell.filter(|c| !is_missing(c))
}

fn column_to_series(name: &str, cells: &[Option<&Data>], col_type: CellColType) -> Result<Series> {
    let series = match col_type {
        CellColType::Int64 => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| present(*c).and_then(|d| d.as_i64()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColType::Float64 => {
            let v: Vec<Option<f64>> = cells
                .iter()
                .map(|c| present(*c).and_then(|d| d.as_f64()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColType::Boolean => {
            let v: Vec<Option<bool>> = cells
                .iter()
                .map(|c| present(*c).and_then(|d| d.get_bool()))
                .collect();
            Series::new(name.into(), v)
        }
        CellColType::Datetime => {
            let v: Vec<Option<i64>> = cells
                .iter()
                .map(|c| {
                    present(*c)
                        .and_then(|d| d.as_datetime())
                        .map(|dt| dt.and_utc().timestamp_millis())
                })
                .collect();
            Series::new(name.into(), v).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        CellColType::Utf8 => {
            let v: Vec<Option<String>> = cells
                .iter()
                .map(|c| present(*c).and_then(cell_text))
                .collect();
            Series::new(name.into(), v)
        }
    };
    Ok(series)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
