use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ProjectService;
use crate::models::projects::requests::CreateProjectRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, require_identity};

pub async fn create_project(
    service: &ProjectService,
    request: &HttpRequest,
    project_data: CreateProjectRequest,
) -> ActixResult<HttpResponse> {
    let identity = match require_identity(request) {
        Ok(identity) => identity,
        Err(resp) => return Ok(resp),
    };
    let engine = service.get_engine(request);

    match engine.create_project(&identity, project_data).await {
        Ok(project) => {
            info!(
                "Project {} ({}) created by {}",
                project.id, project.title, identity.username
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(project, "Project created successfully")))
        }
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}
