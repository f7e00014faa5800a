use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Why a dataset could not be built from its source file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Excel file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("{0}")]
    Parse(String),
}

impl From<anyhow::Error> for LoadError {
    fn from(e: anyhow::Error) -> Self {
        LoadError::Parse(format!("{:#}", e))
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Parse(e.to_string())
    }
}

/// Query against a dataset that failed to load.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    #[error("{dataset}: {message}")]
    LoadFailed { dataset: String, message: String },
}

/// Failure surfaced by an HTTP handler.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Export failed: {0}")]
    Export(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "ok": false, "error": self.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
