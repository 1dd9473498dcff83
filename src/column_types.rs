// Column type inference for uploaded tables

use crate::data::{CellValue, Dataset};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Inferred type of an uploaded column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    #[serde(rename = "T")]
    Text,
    #[serde(rename = "N")]
    Numeric,
    #[serde(rename = "TN")]
    MixedTextNumeric,
    #[serde(rename = "D")]
    Date,
}

impl ColumnType {
    /// Short tag used on the wire
    pub fn tag(self) -> &'static str {
        match self {
            ColumnType::Text => "T",
            ColumnType::Numeric => "N",
            ColumnType::MixedTextNumeric => "TN",
            ColumnType::Date => "D",
        }
    }

    /// Unknown tags yield `None`; callers treat that as "no badge"
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "T" => Some(ColumnType::Text),
            "N" => Some(ColumnType::Numeric),
            "TN" => Some(ColumnType::MixedTextNumeric),
            "D" => Some(ColumnType::Date),
            _ => None,
        }
    }

    /// Human-readable label for type badges
    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Text => "Text",
            ColumnType::Numeric => "Numeric",
            ColumnType::MixedTextNumeric => "Text + Numeric",
            ColumnType::Date => "Date",
        }
    }
}

/// Formats a column must match in full (one format for every value)
const STRICT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%d %B %Y",
    "%Y-%m-%d %H:%M:%S",
];

/// Extra formats tried value by value on a small sample
const LENIENT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%m/%d/%y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%d.%m.%Y",
];

const LENIENT_SAMPLE_SIZE: usize = 10;

/// Infer one type per column, in column order
pub fn infer_column_types(dataset: &Dataset) -> Vec<(String, ColumnType)> {
    dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<&CellValue> = dataset.column_cells(idx).collect();
            (name.clone(), infer_column_type(&cells))
        })
        .collect()
}

/// Classify a single column.
///
/// Numeric wins when every cell (nulls included) is a number. Otherwise the
/// column is a date column when its values parse as dates, mixed when some
/// value contains a letter and some value contains a digit, and text
/// otherwise.
pub fn infer_column_type(cells: &[&CellValue]) -> ColumnType {
    if cells.iter().all(|c| c.as_number().is_some()) {
        return ColumnType::Numeric;
    }

    let values: Vec<String> = cells
        .iter()
        .filter(|c| !c.is_null())
        .map(|c| c.to_string())
        .collect();

    if is_date_column(&values) {
        return ColumnType::Date;
    }

    if has_text_and_numbers(&values) {
        return ColumnType::MixedTextNumeric;
    }

    ColumnType::Text
}

fn is_date_column(values: &[String]) -> bool {
    if values.is_empty() {
        return false;
    }

    // 1. One explicit format for the whole column
    let strict = STRICT_DATE_FORMATS
        .iter()
        .any(|format| values.iter().all(|v| parses_with_format(v.trim(), format)));
    if strict {
        return true;
    }

    // 2. Permissive check on a sample
    values
        .iter()
        .take(LENIENT_SAMPLE_SIZE)
        .all(|v| parses_leniently(v.trim()))
}

fn parses_with_format(value: &str, format: &str) -> bool {
    if format.contains("%H") {
        NaiveDateTime::parse_from_str(value, format).is_ok()
    } else {
        NaiveDate::parse_from_str(value, format).is_ok()
    }
}

fn parses_leniently(value: &str) -> bool {
    if DateTime::parse_from_rfc3339(value).is_ok() || DateTime::parse_from_rfc2822(value).is_ok() {
        return true;
    }
    STRICT_DATE_FORMATS
        .iter()
        .chain(LENIENT_DATE_FORMATS)
        .any(|format| parses_with_format(value, format))
}

fn has_text_and_numbers(values: &[String]) -> bool {
    let has_text = values
        .iter()
        .any(|v| v.chars().any(|c| c.is_ascii_alphabetic()));
    let has_numbers = values.iter().any(|v| v.chars().any(|c| c.is_ascii_digit()));
    has_text && has_numbers
}
