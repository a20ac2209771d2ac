use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ProjectService;
use crate::models::projects::requests::CreateRubricRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn list_rubrics(
    service: &ProjectService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request);

    match engine.list_rubrics(project_id).await {
        Ok(rubrics) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            rubrics,
            "Rubrics retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}

pub async fn create_rubric(
    service: &ProjectService,
    request: &HttpRequest,
    project_id: i64,
    rubric_data: CreateRubricRequest,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine.create_rubric(&identity, project_id, rubric_data).await {
        Ok(rubric) => {
            info!(
                "Rubric '{}' added to project {} by {}",
                rubric.criterion, project_id, identity.username
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(rubric, "Rubric created successfully")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}
