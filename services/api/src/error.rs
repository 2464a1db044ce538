//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, and how it is
//! reported to HTTP clients.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use luminary_core::workspace::WorkspaceError;
use serde::Serialize;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a rejected workspace operation.
    #[error("{0}")]
    Workspace(#[from] WorkspaceError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Workspace(e) => match e {
                WorkspaceError::DocumentNotFound(_) | WorkspaceError::HighlightNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                WorkspaceError::LastDocument
                | WorkspaceError::AnalysisInFlight
                | WorkspaceError::ChatInFlight => StatusCode::CONFLICT,
                WorkspaceError::EmptyDocument
                | WorkspaceError::EmptyQuestion
                | WorkspaceError::Reconcile(_) => StatusCode::UNPROCESSABLE_ENTITY,
                WorkspaceError::Oracle(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
