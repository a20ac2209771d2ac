use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::submissions::requests::CreateSubmissionRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn create_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    project_id: i64,
    submission_data: CreateSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine
        .create_attempt(&identity, project_id, submission_data)
        .await
    {
        Ok(submission) => Ok(HttpResponse::Created().json(ApiResponse::success(
            submission,
            "Submission created successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}
