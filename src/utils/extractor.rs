//! 路径参数提取器
//!
//! 非法 ID 直接返回统一的 `ApiResponse` 错误体，而不是 actix 默认的纯文本 404。

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use futures_util::future::{Ready, ready};

use crate::models::{ApiResponse, ErrorCode};

fn parse_positive_id(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req.match_info().get(name).unwrap_or_default();
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => {
            let message = format!("Invalid {name}: '{raw}'");
            let response = HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::BadRequest, &message));
            Err(InternalError::from_response(message, response).into())
        }
    }
}

macro_rules! define_safe_id_extractor {
    ($name:ident, $param:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_positive_id(req, $param).map($name))
            }
        }
    };
}

define_safe_id_extractor!(SafeProjectIdI64, "project_id");
define_safe_id_extractor!(SafeSubmissionIdI64, "submission_id");
