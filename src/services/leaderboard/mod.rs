use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::engine::ScoringEngine;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::error_response;

pub struct LeaderboardService {
    engine: Option<Arc<ScoringEngine>>,
}

impl LeaderboardService {
    pub fn new_lazy() -> Self {
        Self { engine: None }
    }

    pub(crate) fn get_engine(&self, request: &HttpRequest) -> Arc<ScoringEngine> {
        match &self.engine {
            Some(engine) => engine.clone(),
            None => super::engine_from_request(request),
        }
    }

    // 全局排行榜，公开访问
    pub async fn get_leaderboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let engine = self.get_engine(request);

        match engine.get_leaderboard().await {
            Ok(leaderboard) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                leaderboard,
                "Leaderboard retrieved successfully",
            ))),
            Err(e) => Ok(error_response(&e, ErrorCode::NotFound)),
        }
    }
}
