use actix_web::http::StatusCode;
use actix_web::{error::ResponseError, HttpResponse};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::storage::StorageError;

/// Error taxonomy for every engine operation.
///
/// `Validation` is rejected before any write; `StateConflict` and
/// `NotFound` are distinguishable so callers can branch their messaging;
/// `UndoExpired` discards the stale undo slot as a side effect of being
/// detected; `Storage` means the whole transaction rolled back and the
/// caller owns any retry policy.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    StateConflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("undo window expired")]
    UndoExpired,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ServiceError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::StateConflict(_) => "state_conflict",
            Self::NotFound(_) => "not_found",
            Self::UndoExpired => "undo_expired",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::StateConflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UndoExpired => StatusCode::GONE,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
