use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine.get_submission(&identity, submission_id).await {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            submission,
            "Submission retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::SubmissionNotFound)),
    }
}

pub async fn list_my_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine.submission_history(&identity, project_id).await {
        Ok(history) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            history,
            "Submission history retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}
