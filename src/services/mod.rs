pub mod evaluations;
pub mod leaderboard;
pub mod projects;
pub mod submissions;

pub use evaluations::EvaluationService;
pub use leaderboard::LeaderboardService;
pub use projects::ProjectService;
pub use submissions::SubmissionService;

use actix_web::{HttpRequest, HttpResponse, http::StatusCode};
use std::sync::Arc;
use tracing::{error, warn};

use crate::engine::ScoringEngine;
use crate::errors::ProjectFlowError;
use crate::middlewares::RequireJWT;
use crate::models::users::entities::Identity;
use crate::models::{ApiResponse, ErrorCode};

/// 从 app_data 取出评分引擎
pub(crate) fn engine_from_request(request: &HttpRequest) -> Arc<ScoringEngine> {
    request
        .app_data::<actix_web::web::Data<Arc<ScoringEngine>>>()
        .expect("ScoringEngine not found in app data")
        .get_ref()
        .clone()
}

/// 从请求扩展中取出调用方身份，缺失时返回 401 响应
pub(crate) fn require_identity(request: &HttpRequest) -> Result<Identity, HttpResponse> {
    RequireJWT::extract_identity(request).ok_or_else(|| {
        HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing identity",
        ))
    })
}

/// 引擎错误到 HTTP 状态码和业务码的映射
///
/// `not_found` 指定当前资源对应的业务码。
pub(crate) fn status_and_code(
    err: &ProjectFlowError,
    not_found: ErrorCode,
) -> (StatusCode, ErrorCode) {
    match err {
        ProjectFlowError::DeadlineExpired(_) => {
            (StatusCode::BAD_REQUEST, ErrorCode::DeadlineExpired)
        }
        ProjectFlowError::AttemptLimitReached(_) => {
            (StatusCode::CONFLICT, ErrorCode::AttemptLimitReached)
        }
        ProjectFlowError::NotFound(_) => (StatusCode::NOT_FOUND, not_found),
        ProjectFlowError::RubricNotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::RubricNotFound),
        ProjectFlowError::Forbidden(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
        ProjectFlowError::NoEvaluations(_) => (StatusCode::CONFLICT, ErrorCode::NoEvaluations),
        ProjectFlowError::NoRubrics(_) => (StatusCode::CONFLICT, ErrorCode::NoRubrics),
        ProjectFlowError::MissingContent(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::MissingContent)
        }
        ProjectFlowError::ScoringFailed(_) => (StatusCode::BAD_GATEWAY, ErrorCode::ScoringFailed),
        ProjectFlowError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
        ProjectFlowError::Authentication(_) => {
            (StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized)
        }
        ProjectFlowError::StoreUnavailable(_)
        | ProjectFlowError::DatabaseConfig(_)
        | ProjectFlowError::DatabaseConnection(_)
        | ProjectFlowError::CacheConnection(_)
        | ProjectFlowError::CachePluginNotFound(_) => {
            (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::ServiceUnavailable)
        }
        ProjectFlowError::Serialization(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalServerError)
        }
    }
}

/// 错误响应辅助函数，内部细节只进日志
pub(crate) fn error_response(err: &ProjectFlowError, not_found: ErrorCode) -> HttpResponse {
    let (status, code) = status_and_code(err, not_found);
    if status.is_server_error() {
        error!("{}", err.format_simple());
    } else {
        warn!("Request rejected: {}", err.format_simple());
    }
    HttpResponse::build(status).json(ApiResponse::from_error(code, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProjectFlowError::deadline_expired("x"), StatusCode::BAD_REQUEST),
            (ProjectFlowError::attempt_limit_reached("x"), StatusCode::CONFLICT),
            (ProjectFlowError::not_found("x"), StatusCode::NOT_FOUND),
            (ProjectFlowError::forbidden("x"), StatusCode::FORBIDDEN),
            (ProjectFlowError::no_evaluations("x"), StatusCode::CONFLICT),
            (ProjectFlowError::no_rubrics("x"), StatusCode::CONFLICT),
            (ProjectFlowError::missing_content("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (ProjectFlowError::scoring_failed("x"), StatusCode::BAD_GATEWAY),
            (ProjectFlowError::validation_failed("x"), StatusCode::BAD_REQUEST),
            (ProjectFlowError::store_unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(status_and_code(&err, ErrorCode::NotFound).0, status, "{err:?}");
        }
        assert_eq!(
            status_and_code(&ProjectFlowError::not_found("x"), ErrorCode::SubmissionNotFound).1,
            ErrorCode::SubmissionNotFound
        );
        assert_eq!(
            status_and_code(
                &ProjectFlowError::rubric_not_found("x"),
                ErrorCode::SubmissionNotFound
            ),
            (StatusCode::NOT_FOUND, ErrorCode::RubricNotFound)
        );
    }
}
