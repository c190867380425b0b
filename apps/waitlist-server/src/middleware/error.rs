//! Error handling middleware - `{success: false, message}` responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use waitlist_core::DomainError;
use waitlist_shared::SubscribeResponse;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address.";
pub const DUPLICATE_MESSAGE: &str = "This email is already on our waitlist!";
pub const UNAVAILABLE_MESSAGE: &str = "Database connection unavailable. Please try again later.";
pub const INTERNAL_MESSAGE: &str = "An error occurred. Please try again.";

/// Application-level error type rendered as a failed `SubscribeResponse`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Service unavailable")]
    Unavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::BadRequest(detail) => {
                tracing::debug!(%detail, "Rejected subscribe request");
                INVALID_EMAIL_MESSAGE
            }
            AppError::Conflict(_) => DUPLICATE_MESSAGE,
            AppError::Unavailable => UNAVAILABLE_MESSAGE,
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                INTERNAL_MESSAGE
            }
        };

        HttpResponse::build(self.status_code()).json(SubscribeResponse::failure(message))
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Unavailable => AppError::Unavailable,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_internal_details_are_not_exposed() {
        let err = AppError::from(DomainError::Internal("connection reset by peer".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_of(err).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], INTERNAL_MESSAGE);
    }

    #[test]
    fn test_domain_error_statuses() {
        let cases = [
            (DomainError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DomainError::Duplicate("x".into()), StatusCode::CONFLICT),
            (DomainError::Unavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status_code(), status);
        }
    }
}
