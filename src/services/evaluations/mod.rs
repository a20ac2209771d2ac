pub mod finalize;
pub mod list;
pub mod record;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::engine::ScoringEngine;
use crate::models::evaluations::requests::RecordEvaluationRequest;

pub struct EvaluationService {
    engine: Option<Arc<ScoringEngine>>,
}

impl EvaluationService {
    pub fn new_lazy() -> Self {
        Self { engine: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> Arc<ScoringEngine> {
        match &self.engine {
            Some(engine) => engine.clone(),
            None => super::engine_from_request(request),
        }
    }

    // 记录（或覆盖）某一评分项的人工评审
    pub async fn record_evaluation(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        evaluation_data: RecordEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        record::record_evaluation(self, request, submission_id, evaluation_data).await
    }

    pub async fn list_evaluations(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        list::list_evaluations(self, request, submission_id).await
    }

    // 合成最终分数
    pub async fn finalize_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        finalize::finalize_submission(self, request, submission_id).await
    }
}
