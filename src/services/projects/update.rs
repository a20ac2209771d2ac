use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProjectService;
use crate::models::projects::requests::UpdateProjectRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn update_project(
    service: &ProjectService,
    request: &HttpRequest,
    project_id: i64,
    update_data: UpdateProjectRequest,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine
        .update_project(&identity, project_id, update_data)
        .await
    {
        Ok(project) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            project,
            "Project updated successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}
