/*!
 * JWT 认证中间件
 *
 * 校验 `Authorization: Bearer <JWT_TOKEN>`，通过后把 [`Identity`] 放入请求扩展。
 *
 * ```rust,ignore
 * web::scope("/api/v1/projects")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_projects))
 * ```
 *
 * 处理程序中通过 `RequireJWT::extract_identity(&req)` 取出调用方身份。
 * 令牌的校验由注入到 app_data 的 `Arc<dyn IdentityVerifier>` 完成。
 */

use crate::integrations::IdentityVerifier;
use crate::models::ErrorCode;
use crate::models::users::entities::Identity;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

// 辅助函数：提取并验证 JWT
fn extract_and_verify(req: &ServiceRequest) -> Result<Identity, String> {
    let token = req
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing or invalid Authorization header".to_string())?;

    let Some(verifier) = req.app_data::<web::Data<Arc<dyn IdentityVerifier>>>() else {
        error!("IdentityVerifier not found in app data");
        return Err("Authentication is not configured".to_string());
    };

    verifier.verify(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        "Invalid JWT token".to_string()
    })
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, ErrorCode::Success, "")
                        .map_into_right_body(),
                ));
            }

            match extract_and_verify(&req) {
                Ok(identity) => {
                    debug!(
                        "JWT authentication successful for {} ({})",
                        identity.username, identity.role
                    );
                    req.extensions_mut().insert(identity);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "JWT authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取身份信息
impl RequireJWT {
    /// 从请求扩展中提取调用方身份
    /// 此函数应该在应用了RequireJWT中间件的路由处理程序中使用
    pub fn extract_identity(req: &actix_web::HttpRequest) -> Option<Identity> {
        req.extensions().get::<Identity>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::jwt::JwtIdentityVerifier;
    use crate::utils::jwt::tests::{SECRET, issue_token};
    use actix_web::{App, HttpRequest, HttpResponse, test};

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match RequireJWT::extract_identity(&req) {
            Some(identity) => HttpResponse::Ok().body(identity.username),
            None => HttpResponse::InternalServerError().finish(),
        }
    }

    fn verifier() -> web::Data<Arc<dyn IdentityVerifier>> {
        let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtIdentityVerifier::new(SECRET, None));
        web::Data::new(verifier)
    }

    #[actix_web::test]
    async fn test_valid_token_passes_identity() {
        let app = test::init_service(
            App::new().app_data(verifier()).service(
                web::scope("/api")
                    .wrap(RequireJWT)
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let token = issue_token("alice", "student", None, None);
        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "alice");
    }

    #[actix_web::test]
    async fn test_missing_or_bad_token_is_unauthorized() {
        let app = test::init_service(
            App::new().app_data(verifier()).service(
                web::scope("/api")
                    .wrap(RequireJWT)
                    .route("/me", web::get().to(whoami)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/me").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
