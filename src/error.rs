use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// Missing, malformed or expired bearer token.
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Login failure. Same message for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("missing admin permissions")]
    Forbidden,

    #[error("User not found")]
    NotFound,

    #[error("This email is already being used")]
    Conflict,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict => StatusCode::CONFLICT,
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "An internal error occurred" })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        let cases = [
            (AppError::BadRequest("Invalid email".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("Invalid or expired token"), StatusCode::UNAUTHORIZED),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::NotFound, StatusCode::NOT_FOUND),
            (AppError::Conflict, StatusCode::CONFLICT),
            (AppError::Internal(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn forbidden_uses_fixed_message() {
        assert_eq!(AppError::Forbidden.to_string(), "missing admin permissions");
    }
}
