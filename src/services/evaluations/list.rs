use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn list_evaluations(
    service: &EvaluationService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine.list_evaluations(&identity, submission_id).await {
        Ok(evaluations) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            evaluations,
            "Evaluations retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::SubmissionNotFound)),
    }
}
