use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::submissions::requests::SubmissionListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn list_project_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    project_id: i64,
    query: SubmissionListQuery,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine
        .list_project_submissions(&identity, project_id, query)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Submissions retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}
