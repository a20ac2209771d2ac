use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::evaluations::requests::RecordEvaluationRequest;
use crate::models::users::entities::UserRole;
use crate::services::{EvaluationService, SubmissionService};
use crate::utils::SafeSubmissionIdI64;

static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

pub async fn get_submission(
    req: HttpRequest,
    submission_id: SafeSubmissionIdI64,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_submission(&req, submission_id.0).await
}

pub async fn list_evaluations(
    req: HttpRequest,
    submission_id: SafeSubmissionIdI64,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .list_evaluations(&req, submission_id.0)
        .await
}

pub async fn record_evaluation(
    req: HttpRequest,
    submission_id: SafeSubmissionIdI64,
    evaluation_data: web::Json<RecordEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .record_evaluation(&req, submission_id.0, evaluation_data.into_inner())
        .await
}

pub async fn finalize_submission(
    req: HttpRequest,
    submission_id: SafeSubmissionIdI64,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE
        .finalize_submission(&req, submission_id.0)
        .await
}

// 配置路由
pub fn configure_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(middlewares::RequireJWT)
            // 提交者本人或教师可查看，由引擎判断
            .service(web::resource("/{submission_id}").route(web::get().to(get_submission)))
            .service(
                web::resource("/{submission_id}/evaluations")
                    .route(web::get().to(list_evaluations))
                    .route(
                        web::post()
                            .to(record_evaluation)
                            .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles())),
                    ),
            )
            .service(
                web::resource("/{submission_id}/finalize").route(
                    web::post()
                        .to(finalize_submission)
                        .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles())),
                ),
            ),
    );
}
