use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::models::evaluations::requests::RecordEvaluationRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn record_evaluation(
    service: &EvaluationService,
    request: &HttpRequest,
    submission_id: i64,
    evaluation_data: RecordEvaluationRequest,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine
        .record_evaluation(&identity, submission_id, evaluation_data)
        .await
    {
        Ok(evaluation) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            evaluation,
            "Evaluation recorded successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::SubmissionNotFound)),
    }
}
