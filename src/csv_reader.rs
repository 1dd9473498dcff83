// CSV input for uploaded files

use crate::data::{normalize_headers, CellValue, Dataset};
use anyhow::{Context, Result};

/// Read CSV bytes into a Dataset. The first record is the header row; every
/// cell is kept as text (empty cells become null later, during numeric
/// normalization).
pub fn read_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        anyhow::bail!("No columns to parse from file");
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", row_idx + 1))?;
        rows.push(
            record
                .iter()
                .map(|cell| CellValue::Text(cell.to_string()))
                .collect(),
        );
    }

    Dataset::new(normalize_headers(headers), rows)
}
