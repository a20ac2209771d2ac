use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ProjectService;
use crate::models::projects::requests::ProjectListQuery;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub async fn get_project(
    service: &ProjectService,
    request: &HttpRequest,
    project_id: i64,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request);

    match engine.get_project(project_id).await {
        Ok(project) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            project,
            "Project information retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}

pub async fn list_projects(
    service: &ProjectService,
    request: &HttpRequest,
    query: ProjectListQuery,
) -> ActixResult<HttpResponse> {
    let engine = service.get_engine(request);

    match engine.list_projects(query).await {
        Ok(projects) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            projects,
            "Projects retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, ErrorCode::ProjectNotFound)),
    }
}
