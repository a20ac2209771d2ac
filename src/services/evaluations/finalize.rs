use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn finalize_submission(
    service: &EvaluationService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine.finalize(&identity, submission_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            result,
            "Submission finalized successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::SubmissionNotFound)),
    }
}
