// XLSX input for uploaded files

use crate::data::{normalize_headers, CellValue, Dataset};
use anyhow::{anyhow, Context, Result};
use calamine::{Data, DataType, Reader, Xlsx};
use std::io::Cursor;

/// Read the first worksheet of an XLSX workbook. The first non-empty row is
/// the header row.
pub fn read_xlsx(bytes: &[u8]) -> Result<Dataset> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).context("Failed to open XLSX workbook")?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow!("Workbook contains no worksheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read worksheet '{}'", sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("No columns to parse from file"))?
        .iter()
        .map(header_text)
        .collect();

    let data_rows = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Dataset::new(normalize_headers(headers), data_rows)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => cell_value(other).to_string(),
    }
}

/// Map a calamine cell to a wire cell; dates become ISO-like text
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Null,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) if dt.time() == chrono::NaiveTime::MIN => {
                CellValue::Text(dt.format("%Y-%m-%d").to_string())
            }
            Some(dt) => CellValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Text(cell.to_string()),
        },
        Data::Error(_) => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}
