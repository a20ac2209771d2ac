pub mod create;
pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::engine::ScoringEngine;
use crate::models::submissions::requests::{CreateSubmissionRequest, SubmissionListQuery};

pub struct SubmissionService {
    engine: Option<Arc<ScoringEngine>>,
}

impl SubmissionService {
    pub fn new_lazy() -> Self {
        Self { engine: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> Arc<ScoringEngine> {
        match &self.engine {
            Some(engine) => engine.clone(),
            None => super::engine_from_request(request),
        }
    }

    // 学生提交新版本
    pub async fn create_submission(
        &self,
        request: &HttpRequest,
        project_id: i64,
        submission_data: CreateSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, request, project_id, submission_data).await
    }

    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, submission_id).await
    }

    // 当前用户在项目下的提交历史
    pub async fn list_my_submissions(
        &self,
        request: &HttpRequest,
        project_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::list_my_submissions(self, request, project_id).await
    }

    // 教师查看项目下的提交
    pub async fn list_project_submissions(
        &self,
        request: &HttpRequest,
        project_id: i64,
        query: SubmissionListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_project_submissions(self, request, project_id, query).await
    }
}
