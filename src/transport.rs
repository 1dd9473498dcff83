// Transports carrying a selected file to the upload parser

use crate::ingest;
use crate::protocol::{UploadResponse, UPLOAD_FIELD, UPLOAD_PATH};
use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::Url;
use std::future::Future;
use std::path::Path;

/// A file chosen by the user, held in memory until submission
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("'{}' does not name a file", path.display()))?;
        Ok(Self { name, bytes })
    }
}

/// Sends one file to the upload parser and returns its structured response.
/// An `Err` means the exchange itself failed (network, malformed reply).
pub trait UploadTransport {
    fn upload(&self, file: &SelectedFile) -> impl Future<Output = Result<UploadResponse>> + Send;
}

/// Calls the parser in-process
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransport;

impl UploadTransport for LocalTransport {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse> {
        debug!("Parsing '{}' in-process ({} bytes)", file.name, file.bytes.len());
        Ok(ingest::handle_upload(Some(&file.name), &file.bytes))
    }
}

/// Posts the file as multipart form data to a running upload server
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:5000`
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("Invalid server URL '{}'", base_url))?;
        let endpoint = base
            .join(UPLOAD_PATH)
            .with_context(|| format!("Cannot build upload URL from '{}'", base_url))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl UploadTransport for HttpTransport {
    async fn upload(&self, file: &SelectedFile) -> Result<UploadResponse> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

        debug!("POST {} ({})", self.endpoint, file.name);
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .context("Failed to reach upload server")?;

        // Error replies still carry a JSON body; only give up if it is unreadable
        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("Failed to read upload response")?;
        serde_json::from_slice(&body)
            .with_context(|| format!("Malformed upload response (HTTP {})", status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_endpoint() {
        let transport = HttpTransport::new("http://127.0.0.1:5000").unwrap();
        assert_eq!(transport.endpoint().as_str(), "http://127.0.0.1:5000/upload");
    }

    #[test]
    fn test_http_transport_invalid_url() {
        assert!(HttpTransport::new("not a url").is_err());
    }

    #[test]
    fn test_selected_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        std::fs::write(&path, "a\n1\n").unwrap();
        let file = SelectedFile::from_path(&path).unwrap();
        assert_eq!(file.name, "sales.csv");
        assert_eq!(file.bytes, b"a\n1\n");
    }

    #[tokio::test]
    async fn test_local_transport() {
        let file = SelectedFile::new("t.csv", b"x,y\n1,2\n".to_vec());
        let response = LocalTransport.upload(&file).await.unwrap();
        assert!(matches!(response, UploadResponse::Success(_)));
    }
}
