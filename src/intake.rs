// File intake: selection, validation and upload state

use crate::column_types::ColumnType;
use crate::data::Dataset;
use crate::error::{IntakeError, ValidationError};
use crate::protocol::{has_accepted_extension, UploadPayload, UploadResponse};
use crate::transport::{SelectedFile, UploadTransport};
use log::{info, warn};

const NO_FILE_LABEL: &str = "Choose a file";
/// Shown when the parser rejects a file with a blank `error`
const UNSPECIFIED_REJECTION: &str = "Upload rejected without a reason";

/// Inline status shown next to the upload trigger
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadStatus {
    #[default]
    Idle,
    Processing,
    Succeeded,
    Failed(String),
}

impl UploadStatus {
    pub fn message(&self) -> Option<String> {
        match self {
            UploadStatus::Idle => None,
            UploadStatus::Processing => Some("Processing file...".to_string()),
            UploadStatus::Succeeded => Some("File processed successfully!".to_string()),
            UploadStatus::Failed(reason) => Some(format!("Error: {}", reason)),
        }
    }
}

/// Result of a successful upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedData {
    pub columns: Vec<String>,
    /// `None` marks a column whose type tag was not recognized
    pub column_types: Vec<(String, Option<ColumnType>)>,
    pub dataset: Dataset,
}

impl UploadedData {
    pub fn from_payload(payload: UploadPayload) -> Self {
        let column_types = payload
            .columns
            .iter()
            .map(|col| {
                let ty = payload
                    .column_types
                    .get(col)
                    .and_then(|tag| ColumnType::from_tag(tag));
                (col.clone(), ty)
            })
            .collect();
        let dataset = Dataset::from_records(payload.columns.clone(), &payload.data);
        Self {
            columns: payload.columns,
            column_types,
            dataset,
        }
    }
}

/// Tracks the selected file and the outcome of the last upload. `submit`
/// borrows the intake mutably, so one intake never has two uploads pending.
#[derive(Debug, Default)]
pub struct FileIntake {
    selected: Option<SelectedFile>,
    submit_enabled: bool,
    status: UploadStatus,
}

impl FileIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the chosen file; submission is enabled only when one is present
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        self.submit_enabled = file.is_some();
        self.selected = file;
    }

    /// Name to display for the current selection
    pub fn display_name(&self) -> &str {
        self.selected
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or(NO_FILE_LABEL)
    }

    pub fn can_submit(&self) -> bool {
        self.submit_enabled
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    /// Validate and transmit the selected file.
    ///
    /// Validation failures never reach the transport and leave submission
    /// enabled. Rejections and transport failures re-enable submission. After
    /// a success submission stays disabled until another file is selected.
    pub async fn submit<T: UploadTransport>(
        &mut self,
        transport: &T,
    ) -> Result<UploadedData, IntakeError> {
        let file = self.selected.clone().ok_or(IntakeError::NoFileSelected)?;

        if !has_accepted_extension(&file.name) {
            let err = ValidationError {
                file_name: file.name.clone(),
            };
            self.status = UploadStatus::Failed(err.to_string());
            return Err(err.into());
        }

        self.submit_enabled = false;
        self.status = UploadStatus::Processing;

        match transport.upload(&file).await {
            Ok(UploadResponse::Success(payload)) => {
                info!("Uploaded '{}': {} rows", file.name, payload.data.len());
                self.status = UploadStatus::Succeeded;
                Ok(UploadedData::from_payload(payload))
            }
            Ok(UploadResponse::Failure { error }) => {
                let error = if error.trim().is_empty() {
                    UNSPECIFIED_REJECTION.to_string()
                } else {
                    error
                };
                warn!("Upload of '{}' rejected: {}", file.name, error);
                self.fail(error.clone());
                Err(IntakeError::Rejected(error))
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!("Upload of '{}' failed: {}", file.name, message);
                self.fail(message.clone());
                Err(IntakeError::Transport(message))
            }
        }
    }

    fn fail(&mut self, reason: String) {
        self.status = UploadStatus::Failed(reason);
        self.submit_enabled = true;
    }
}
