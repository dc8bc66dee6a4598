// Route exports
pub mod evaluation;

use actix_multipart::{form::MultipartFormConfig, MultipartError};
use actix_web::{error, http::StatusCode, web, HttpResponse};
use serde::Serialize;

pub use evaluation::AppState;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(evaluation::configure),
    );
}

/// JSON error response for JSON payload errors
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// JSON extractor config shared by the server and tests
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1024 * 1024)
        .error_handler(handle_json_payload_error)
}

/// Upper bound for an uploaded transcript file
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Handle malformed multipart uploads
pub fn handle_multipart_error(err: MultipartError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Multipart payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_multipart".to_string(),
        message: format!("Invalid upload: {}", err),
        status_code: 400,
    }
    .into()
}

/// Multipart extractor config shared by the server and tests
pub fn multipart_config() -> MultipartFormConfig {
    MultipartFormConfig::default()
        .total_limit(MAX_UPLOAD_BYTES)
        .memory_limit(MAX_UPLOAD_BYTES)
        .error_handler(handle_multipart_error)
}
