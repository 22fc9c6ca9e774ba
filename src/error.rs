use axum::{http::StatusCode, response::IntoResponse, response::Response};
use thiserror::Error;

/// ApiError
///
/// The application-wide error taxonomy. Every fallible service and handler
/// path propagates one of these variants with `?`; the `IntoResponse` impl
/// is the single place errors are mapped to HTTP statuses.
///
/// Bodies are intentionally empty: the product API contract surfaces only the
/// status code, and server-side failures are logged with their cause rather
/// than echoed to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Entity lookup miss, surfaced as 404 on the API.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Invariant or store-constraint violation. On the product-creation path
    /// this surfaces as a status-only 500.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Uniqueness conflict (duplicate username on registration).
    #[error("{0}")]
    Conflict(&'static str),

    /// Missing or invalid session. Never distinguishes unknown-user from
    /// wrong-password.
    #[error("authentication required")]
    Unauthorized,

    /// Authenticated but lacking the required role.
    #[error("insufficient privileges")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("password hashing failed")]
    Hash(#[from] bcrypt::BcryptError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::Validation(_) | ApiError::Database(_) | ApiError::Hash(_) => {
                // Diagnostic context stays in the log, never in the body.
                tracing::error!(error = %self, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status.into_response()
    }
}
