use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{Evaluator, EvaluationError};
use crate::models::{
    AdvisorRequest, AdvisorResponse, ErrorResponse, HealthResponse, MatchCoursesRequest,
    ParseTranscriptRequest, ParseTranscriptResponse, TranscriptUploadForm,
};
use crate::services::{AdvisorDrafter, AdvisorError, Attachment, AttachmentKind, TranscriptParser};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Evaluator,
    pub transcripts: TranscriptParser,
    pub advisor: AdvisorDrafter,
}

/// Configure all evaluation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/courses/match", web::post().to(match_courses))
        .route("/transcript/parse", web::post().to(parse_transcript))
        .route("/transcript/upload", web::post().to(upload_transcript))
        .route("/advisor/request", web::post().to(advisor_request));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let inference = if state.evaluator.strategy().is_assisted() { "enabled" } else { "disabled" };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        inference: inference.to_string(),
    })
}

/// Match courses endpoint
///
/// POST /api/v1/courses/match
///
/// Request body:
/// ```json
/// {
///   "courses": [{"courseCode": "MATH& 151", "courseTitle": "Calculus I", "credits": 5, "grade": "A"}],
///   "major": "Computer Science"
/// }
/// ```
///
/// Always answers with `{matches, summary}` unless the input is invalid or the
/// equivalency guide itself is broken.
async fn match_courses(
    state: web::Data<AppState>,
    req: web::Json<MatchCoursesRequest>,
) -> impl Responder {
    match state.evaluator.evaluate_request(&req).await {
        Ok(evaluation) => HttpResponse::Ok().json(evaluation),
        Err(EvaluationError::InvalidInput(message)) => {
            tracing::info!("Rejected match request: {}", message);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid courses payload".to_string(),
                message,
                status_code: 400,
            })
        }
        Err(e) => {
            tracing::error!("Failed to match courses: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to match courses".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Parse transcript text endpoint
///
/// POST /api/v1/transcript/parse
///
/// Request body:
/// ```json
/// { "transcriptText": "MATH& 151  Calculus I  5.0  3.4 ..." }
/// ```
async fn parse_transcript(
    state: web::Data<AppState>,
    req: web::Json<ParseTranscriptRequest>,
) -> impl Responder {
    if req.validate().is_err() || req.transcript_text.trim().is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "No transcript text provided".to_string(),
            message: "transcriptText must be a non-empty string".to_string(),
            status_code: 400,
        });
    }

    let courses = state.transcripts.parse_text(&req.transcript_text).await;

    HttpResponse::Ok().json(ParseTranscriptResponse { courses })
}

/// Transcript file upload endpoint
///
/// POST /api/v1/transcript/upload
///
/// Multipart form with a `file` part holding a PDF, JPEG, PNG, WebP or GIF.
/// The file goes to the reasoning service as-is; nothing is decoded locally.
async fn upload_transcript(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<TranscriptUploadForm>,
) -> impl Responder {
    let Some(file) = form.file.filter(|f| !f.data.is_empty()) else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "No file provided".to_string(),
            message: "Upload a transcript under the `file` field".to_string(),
            status_code: 400,
        });
    };

    let mime = file.content_type.as_ref().map(|m| m.essence_str()).unwrap_or_default();
    let Some(kind) = AttachmentKind::from_mime(mime) else {
        tracing::info!("Rejected transcript upload with content type {:?}", mime);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Unsupported file type. Please upload a PDF or image (JPEG, PNG, WebP, GIF).".to_string(),
            message: format!("Unsupported content type: {}", mime),
            status_code: 400,
        });
    };

    let attachment = Attachment {
        kind,
        bytes: file.data.to_vec(),
    };
    let courses = state.transcripts.parse_file(&attachment).await;

    HttpResponse::Ok().json(ParseTranscriptResponse { courses })
}

/// Advisor email endpoint
///
/// POST /api/v1/advisor/request
///
/// Request body:
/// ```json
/// { "matches": [...], "studentName": "string", "major": "string" }
/// ```
async fn advisor_request(
    state: web::Data<AppState>,
    req: web::Json<AdvisorRequest>,
) -> impl Responder {
    match state.advisor.draft(&req).await {
        Ok(email_body) => HttpResponse::Ok().json(AdvisorResponse { email_body }),
        Err(AdvisorError::ServiceUnavailable) => {
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Advisor drafting unavailable".to_string(),
                message: "No reasoning service is configured".to_string(),
                status_code: 503,
            })
        }
        Err(e) => {
            tracing::error!("Failed to generate advisor request: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to generate advisor request".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
            inference: "disabled".to_string(),
        };

        assert_eq!(response.status, "healthy");
    }
}
