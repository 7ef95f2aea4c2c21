use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, warn};
use uuid::Uuid;

#[derive(Debug)]
pub struct AppError(pub &'static str);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AppError {}

/// Rejections raised by call desk operations.  None of these leave the session modified.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CallError {
    #[error("cannot {operation} while the call is {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },
    #[error("no profile selected")]
    NoProfileSelected,
    #[error("profile {0} not found")]
    ProfileNotFound(Uuid),
    #[error("{0}")]
    BadRequest(String),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{0}")]
    Validation(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not valid: {value:?}")]
    Invalid { key: &'static str, value: String },
}

fn message_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

impl IntoResponse for CallError {
    fn into_response(self) -> Response {
        warn!(error=%self, "rejected call operation");
        let status = match self {
            CallError::InvalidState { .. } | CallError::NoProfileSelected => StatusCode::CONFLICT,
            CallError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            CallError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        message_response(status, self.to_string())
    }
}

impl IntoResponse for ProfileError {
    fn into_response(self) -> Response {
        warn!(error=%self, "rejected profile");
        message_response(StatusCode::BAD_REQUEST, self.to_string())
    }
}

pub async fn handle_error(e: impl std::error::Error) {
    error!("ERROR: {e}")
}
