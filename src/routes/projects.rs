use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::projects::requests::{
    CreateProjectRequest, CreateRubricRequest, ProjectListQuery, UpdateProjectRequest,
};
use crate::models::submissions::requests::{CreateSubmissionRequest, SubmissionListQuery};
use crate::models::users::entities::UserRole;
use crate::services::{ProjectService, SubmissionService};
use crate::utils::SafeProjectIdI64;

// 懒加载的全局服务实例
static PROJECT_SERVICE: Lazy<ProjectService> = Lazy::new(ProjectService::new_lazy);
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// HTTP处理程序
pub async fn list_projects(
    req: HttpRequest,
    query: web::Query<ProjectListQuery>,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE.list_projects(&req, query.into_inner()).await
}

pub async fn create_project(
    req: HttpRequest,
    project_data: web::Json<CreateProjectRequest>,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE
        .create_project(&req, project_data.into_inner())
        .await
}

pub async fn get_project(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE.get_project(&req, project_id.0).await
}

pub async fn update_project(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
    update_data: web::Json<UpdateProjectRequest>,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE
        .update_project(&req, project_id.0, update_data.into_inner())
        .await
}

pub async fn list_rubrics(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE.list_rubrics(&req, project_id.0).await
}

pub async fn create_rubric(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
    rubric_data: web::Json<CreateRubricRequest>,
) -> ActixResult<HttpResponse> {
    PROJECT_SERVICE
        .create_rubric(&req, project_id.0, rubric_data.into_inner())
        .await
}

pub async fn create_submission(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
    submission_data: web::Json<CreateSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .create_submission(&req, project_id.0, submission_data.into_inner())
        .await
}

pub async fn list_project_submissions(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
    query: web::Query<SubmissionListQuery>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_project_submissions(&req, project_id.0, query.into_inner())
        .await
}

pub async fn list_my_submissions(
    req: HttpRequest,
    project_id: SafeProjectIdI64,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_my_submissions(&req, project_id.0)
        .await
}

// 配置路由
pub fn configure_projects_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/projects")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(web::get().to(list_projects)).route(
                    web::post()
                        .to(create_project)
                        // 教师和管理员可以创建项目
                        .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles())),
                ),
            )
            .service(
                web::resource("/{project_id}")
                    .route(web::get().to(get_project))
                    .route(
                        web::put()
                            .to(update_project)
                            // 是否为项目创建者由引擎判断
                            .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles())),
                    ),
            )
            .service(
                web::resource("/{project_id}/rubrics")
                    .route(web::get().to(list_rubrics))
                    .route(
                        web::post()
                            .to(create_rubric)
                            // 是否为项目创建者由引擎判断
                            .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles())),
                    ),
            )
            .service(
                web::resource("/{project_id}/submissions")
                    .route(
                        web::get()
                            .to(list_project_submissions)
                            .wrap(middlewares::RequireRole::new_any(UserRole::faculty_roles())),
                    )
                    .route(
                        web::post()
                            .to(create_submission)
                            .wrap(middlewares::RequireRole::new_any(UserRole::student_roles())),
                    ),
            )
            .service(
                web::resource("/{project_id}/submissions/my")
                    .route(web::get().to(list_my_submissions)),
            ),
    );
}
