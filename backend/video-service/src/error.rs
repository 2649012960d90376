/// Error types for the video service
///
/// Every failure surfaced to a caller maps onto one taxonomy variant, and
/// the `ResponseError` impl renders the shared error envelope so clients see
/// a single wire shape regardless of where the failure originated.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, ErrorResponse};
use media_store::MediaStoreError;

/// Result type for video-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed identifier, invalid pagination or sort
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Request body failed field validation
    #[error("validation failed")]
    Validation(#[from] validator::ValidationErrors),

    /// Actor lacks permission for the requested mutation
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Referenced entity does not exist (or is soft-deleted)
    #[error("not found: {0}")]
    NotFound(String),

    /// Database or media-store call failed or timed out
    #[error("dependency failure: {0}")]
    DependencyFailure(String),

    /// Everything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DependencyFailure(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let code = match self {
            AppError::InvalidArgument(_) => error_codes::INVALID_ARGUMENT,
            AppError::Validation(_) => error_codes::VALIDATION_ERROR,
            AppError::Unauthorized(_) => error_codes::UNAUTHORIZED,
            AppError::NotFound(_) => error_codes::NOT_FOUND,
            AppError::DependencyFailure(_) => error_codes::DEPENDENCY_FAILURE,
            AppError::Internal(_) => error_codes::INTERNAL_ERROR,
        };

        let mut response = ErrorResponse::new(status.as_u16(), code, self.to_string());
        if let AppError::Validation(errors) = self {
            response = response.with_details(validation_details(errors));
        }

        HttpResponse::build(status).json(response)
    }
}

fn validation_details(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut details: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let reason = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{field}: {reason}")
            })
        })
        .collect();
    details.sort();
    details
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("record not found".to_string()),
            other => AppError::DependencyFailure(format!("database error: {other}")),
        }
    }
}

impl From<MediaStoreError> for AppError {
    fn from(err: MediaStoreError) -> Self {
        AppError::DependencyFailure(format!("media store error: {err}"))
    }
}
