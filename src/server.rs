// HTTP upload endpoint

use crate::ingest;
use crate::protocol::{UploadResponse, UPLOAD_FIELD, UPLOAD_PATH};
use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{info, warn};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Build the router serving `POST /upload`
pub fn router(config: &ServerConfig) -> Router {
    Router::new()
        .route(UPLOAD_PATH, post(upload))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
}

/// Bind and serve until the process is stopped
pub async fn run(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("Listening on http://{}", listener.local_addr()?);
    serve(listener, &config).await
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, config: &ServerConfig) -> Result<()> {
    axum::serve(listener, router(config))
        .await
        .context("Upload server stopped")
}

async fn upload(mut multipart: Multipart) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return reply(UploadResponse::failure(e.body_text())),
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let name = field.file_name().unwrap_or_default().to_string();
        match field.bytes().await {
            Ok(bytes) => file = Some((name, bytes.to_vec())),
            Err(e) => return reply(UploadResponse::failure(e.body_text())),
        }
    }

    let parsed = tokio::task::spawn_blocking(move || match &file {
        Some((name, bytes)) => ingest::handle_upload(Some(name.as_str()), bytes),
        None => ingest::handle_upload(None, &[]),
    })
    .await;

    match parsed {
        Ok(response) => reply(response),
        Err(e) => {
            warn!("Upload worker failed: {}", e);
            reply(UploadResponse::failure("Internal error while parsing the file"))
        }
    }
}

fn reply(response: UploadResponse) -> Response {
    let status = match &response {
        UploadResponse::Success(_) => StatusCode::OK,
        UploadResponse::Failure { .. } => StatusCode::BAD_REQUEST,
    };
    (status, Json(response)).into_response()
}
