// Wire contract between the intake handler and the upload parser

use crate::column_types::ColumnType;
use crate::data::{Dataset, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Path of the upload endpoint
pub const UPLOAD_PATH: &str = "/upload";

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "file";

/// Extensions accepted on both sides of the contract
pub const ACCEPTED_EXTENSIONS: &[&str] = &["xlsx", "csv"];

/// Response of the upload endpoint: either an error or the parsed table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UploadResponse {
    /// Any object carrying `error` is a rejection, even when the string is
    /// empty; the intake substitutes a generic reason for a blank one.
    Failure { error: String },
    Success(UploadPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPayload {
    #[serde(default = "default_success")]
    pub success: bool,
    pub columns: Vec<String>,
    /// Type tag per column; tags are kept as strings so an unrecognized tag
    /// degrades to "no badge" instead of rejecting the whole response
    pub column_types: BTreeMap<String, String>,
    pub data: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl UploadResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        UploadResponse::Failure {
            error: error.into(),
        }
    }

    /// Build a success response from a parsed dataset and its column types
    pub fn success(dataset: &Dataset, column_types: &[(String, ColumnType)]) -> Self {
        UploadResponse::Success(UploadPayload {
            success: true,
            columns: dataset.columns().to_vec(),
            column_types: column_types
                .iter()
                .map(|(col, ty)| (col.clone(), ty.tag().to_string()))
                .collect(),
            data: dataset.to_records(),
            message: Some("File successfully processed".to_string()),
        })
    }
}

/// Extension of `file_name` (text after the last dot), lowercased.
/// Names without a dot have no extension.
pub fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Whether `file_name` carries one of the accepted extensions (case-insensitive)
pub fn has_accepted_extension(file_name: &str) -> bool {
    file_extension(file_name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
