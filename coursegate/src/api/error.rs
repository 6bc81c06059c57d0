use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use coursegate_core::authorization::{AuthorizationError, Outcome};
use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum AppError {
    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn get_error_msg(&self) -> (axum::http::StatusCode, String) {
        let status: axum::http::StatusCode = match self {
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        if let Some(app_error) = e.downcast_ref::<AppError>() {
            return app_error.clone();
        }
        AppError::InternalServerError(e.to_string())
    }
}

impl From<AuthorizationError> for AppError {
    fn from(e: AuthorizationError) -> Self {
        // Only a missing resource is reported as such, everything else hides
        // behind a plain 403
        match e.outcome() {
            Outcome::ResourceNotFound => AppError::NotFound(e.to_string()),
            Outcome::Forbidden | Outcome::Allowed => AppError::Forbidden,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.get_error_msg();
        let body = serde_json::json!({ "error": true, "message": body });
        (status, Json(body)).into_response()
    }
}
