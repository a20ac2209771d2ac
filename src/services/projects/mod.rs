pub mod create;
pub mod get;
pub mod rubrics;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::engine::ScoringEngine;
use crate::models::projects::requests::{
    CreateProjectRequest, CreateRubricRequest, ProjectListQuery, UpdateProjectRequest,
};

pub struct ProjectService {
    engine: Option<Arc<ScoringEngine>>,
}

impl ProjectService {
    pub fn new_lazy() -> Self {
        Self { engine: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> Arc<ScoringEngine> {
        match &self.engine {
            Some(engine) => engine.clone(),
            None => super::engine_from_request(request),
        }
    }

    // 获取项目列表
    pub async fn list_projects(
        &self,
        request: &HttpRequest,
        query: ProjectListQuery,
    ) -> ActixResult<HttpResponse> {
        get::list_projects(self, request, query).await
    }

    pub async fn create_project(
        &self,
        request: &HttpRequest,
        project_data: CreateProjectRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_project(self, request, project_data).await
    }

    // 根据项目 ID 获取项目信息
    pub async fn get_project(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_project(self, request, project_id).await
    }

    // 修改项目（项目创建者或管理员）
    pub async fn update_project(
        &self,
        request: &HttpRequest,
        project_id: i64,
        update_data: UpdateProjectRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_project(self, request, project_id, update_data).await
    }

    pub async fn list_rubrics(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        rubrics::list_rubrics(self, request, project_id).await
    }

    // 添加评分标准（项目创建者或管理员）
    pub async fn create_rubric(
        &self,
        request: &HttpRequest,
        project_id: i64,
        rubric_data: CreateRubricRequest,
    ) -> ActixResult<HttpResponse> {
        rubrics::create_rubric(self, request, project_id, rubric_data).await
    }
}
