use actix_web::{
    HttpRequest, HttpResponse,
    error::{InternalError, JsonPayloadError, QueryPayloadError},
};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

// JSON 请求体解析失败时返回统一格式
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("JSON payload error on {}: {}", req.path(), err);
    let message = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "Request body is too large".to_string()
        }
        _ => format!("Invalid JSON body: {err}"),
    };
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
    InternalError::from_response(err, response).into()
}

// 查询参数解析失败时返回统一格式
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!("Query string error on {}: {}", req.path(), err);
    let message = format!("Invalid query parameters: {err}");
    let response =
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message));
    InternalError::from_response(err, response).into()
}
