// Upload parser: turns an uploaded file into the wire response

use crate::column_types::{infer_column_types, ColumnType};
use crate::csv_reader;
use crate::data::Dataset;
use crate::protocol::{file_extension, has_accepted_extension, UploadResponse};
use crate::xlsx_reader;
use anyhow::Result;
use log::{info, warn};

pub const ERR_NO_FILE_PART: &str = "No file part";
pub const ERR_NO_SELECTED_FILE: &str = "No selected file";
pub const ERR_UNSUPPORTED_TYPE: &str = "File type not supported. Please upload .xlsx or .csv files.";

/// A parsed upload: typed table plus one inferred type per column
#[derive(Debug, Clone)]
pub struct ParsedUpload {
    pub dataset: Dataset,
    pub column_types: Vec<(String, ColumnType)>,
}

/// Parse file bytes according to the file's extension
pub fn parse_upload(file_name: &str, bytes: &[u8]) -> Result<ParsedUpload> {
    let dataset = match file_extension(file_name).as_deref() {
        Some("xlsx") => xlsx_reader::read_xlsx(bytes)?,
        Some("csv") => csv_reader::read_csv(bytes)?,
        _ => anyhow::bail!(ERR_UNSUPPORTED_TYPE),
    };

    let dataset = dataset.with_numeric_columns();
    let column_types = infer_column_types(&dataset);

    Ok(ParsedUpload {
        dataset,
        column_types,
    })
}

/// Handle one upload request end to end, reporting every failure through the
/// response's `error` field.
///
/// `file_name` is `None` when the request carried no file part at all.
pub fn handle_upload(file_name: Option<&str>, bytes: &[u8]) -> UploadResponse {
    let file_name = match file_name {
        None => return UploadResponse::failure(ERR_NO_FILE_PART),
        Some("") => return UploadResponse::failure(ERR_NO_SELECTED_FILE),
        Some(name) => name,
    };

    if !has_accepted_extension(file_name) {
        warn!("Rejected upload '{}': unsupported file type", file_name);
        return UploadResponse::failure(ERR_UNSUPPORTED_TYPE);
    }

    match parse_upload(file_name, bytes) {
        Ok(parsed) => {
            info!(
                "Parsed '{}': {} columns, {} rows",
                file_name,
                parsed.dataset.columns().len(),
                parsed.dataset.len()
            );
            UploadResponse::success(&parsed.dataset, &parsed.column_types)
        }
        Err(e) => {
            warn!("Failed to parse '{}': {:#}", file_name, e);
            UploadResponse::failure(format!("{:#}", e))
        }
    }
}
