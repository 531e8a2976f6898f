use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::participations::TransitionError;
use crate::models::users::UserRole;

/// Error taxonomy for the participation and complaint workflows. Every
/// handler returns this; the HTTP mapping lives in one place.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Registration refused: window closed, activity not published,
    /// already registered, or capacity full. Never retried automatically.
    #[error("{0}")]
    Ineligible(String),

    /// A transition was attempted from a state that does not permit it.
    #[error("{0}")]
    InvalidState(String),

    /// The actor does not own the resource they are mutating.
    #[error("{0}")]
    Authorization(String),

    /// An identical pending complaint already exists.
    #[error("{0}")]
    Duplicate(String),

    /// A request field is missing or out of range; the message names it.
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ServiceError {
    fn kind(&self) -> &'static str {
        match self {
            ServiceError::Ineligible(_) => "ineligible",
            ServiceError::InvalidState(_) => "invalid_state",
            ServiceError::Authorization(_) => "forbidden",
            ServiceError::Duplicate(_) => "duplicate",
            ServiceError::Validation(_) => "validation",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Db(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Ineligible(_) | ServiceError::Authorization(_) => StatusCode::FORBIDDEN,
            ServiceError::InvalidState(_) | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Duplicate(_) => StatusCode::CONFLICT,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn wrong_role(required: UserRole) -> Self {
        ServiceError::Authorization(format!("this operation requires the {} role", required))
    }
}

impl From<TransitionError> for ServiceError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::WrongActor { .. } => ServiceError::Authorization(err.to_string()),
            TransitionError::Illegal { .. } | TransitionError::ActivityNotCompleted { .. } => {
                ServiceError::InvalidState(err.to_string())
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match &self {
            ServiceError::Authorization(msg) => {
                tracing::warn!(reason = %msg, "authorization refused");
            }
            ServiceError::Db(err) => {
                tracing::error!(error = %err, "database failure");
            }
            _ => {}
        }

        let status = self.status();
        let message = match &self {
            // Never leak driver details to the client.
            ServiceError::Db(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        let body = Json(json!({
            "error": self.kind(),
            "message": message,
        }));
        (status, body).into_response()
    }
}
