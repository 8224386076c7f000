//! Top-level error for the binaries and the import/seed paths.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::catalog::CatalogImportError;
use crate::config::ConfigError;
use crate::store::RepositoryError;
use crate::telemetry::TelemetryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogImportError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Catalog(error) => catalog_status(error),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

fn catalog_status(error: &CatalogImportError) -> StatusCode {
    match error {
        CatalogImportError::Csv(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogImportError::UnknownShelter { .. } => StatusCode::NOT_FOUND,
        CatalogImportError::Account(_)
        | CatalogImportError::Pet(_)
        | CatalogImportError::Adoption(_) => StatusCode::BAD_REQUEST,
        CatalogImportError::Repository(RepositoryError::Conflict { .. }) => StatusCode::CONFLICT,
        CatalogImportError::Repository(RepositoryError::MissingReference { .. }) => {
            StatusCode::BAD_REQUEST
        }
        CatalogImportError::Repository(_) | CatalogImportError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}
