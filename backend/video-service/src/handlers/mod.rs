/// HTTP endpoints
///
/// Handlers stay thin: parse and validate input, call a service or
/// repository, wrap the result in the shared response envelope.
use actix_web::HttpResponse;
use error_types::ApiResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

pub mod comments;
pub mod history;
pub mod likes;
pub mod subscriptions;
pub mod tweets;
pub mod videos;

/// 200 envelope
pub(crate) fn ok<T: Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data, message))
}

/// 201 envelope
pub(crate) fn created<T: Serialize>(data: T, message: &str) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::new(201, data, message))
}

/// Structural identifier check before any lookup
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidArgument(format!("invalid {what} id: {raw}")))
}
