use std::sync::Arc;

use actix_web::{App, http::StatusCode, test, web};
use serde_json::{Value, json};

use crate::cache::ObjectCache;
use crate::cache::object_cache::moka::MokaCacheWrapper;
use crate::engine::testing::StubScorer;
use crate::engine::{EngineSettings, ScoringEngine};
use crate::integrations::IdentityVerifier;
use crate::storage::Storage;
use crate::storage::memory_storage::MemoryStorage;
use crate::utils::jwt::JwtIdentityVerifier;
use crate::utils::jwt::tests::{SECRET, issue_token};
use crate::utils::{json_error_handler, query_error_handler};

fn app_data() -> (web::Data<Arc<ScoringEngine>>, web::Data<Arc<dyn IdentityVerifier>>) {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(64, 3600));
    let scorer = StubScorer::returning(json!({"quality_score": 60}));
    let engine = ScoringEngine::new(storage, scorer, cache, EngineSettings::default());
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(JwtIdentityVerifier::new(SECRET, None));
    (web::Data::new(Arc::new(engine)), web::Data::new(verifier))
}

fn bearer(username: &str, role: &str) -> (&'static str, String) {
    let email = format!("{username}@uni.edu");
    let token = issue_token(username, role, Some(email.as_str()), None);
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! init_app {
    () => {{
        let (engine, verifier) = app_data();
        test::init_service(
            App::new()
                .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                .app_data(engine)
                .app_data(verifier)
                .configure(super::configure_leaderboard_routes)
                .configure(super::configure_projects_routes)
                .configure(super::configure_submissions_routes),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_full_evaluation_flow_over_http() {
    let app = init_app!();

    // 教师创建项目与评分标准
    let req = test::TestRequest::post()
        .uri("/api/v1/projects")
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({
            "title": "Capstone",
            "start_date": "2025-01-01",
            "end_date": "2099-12-31"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let project_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/projects/{project_id}/rubrics"))
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({"criterion": "Quality", "max_points": 100}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let rubric_id = body["data"]["id"].as_i64().unwrap();

    // 学生提交
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/projects/{project_id}/submissions"))
        .insert_header(bearer("alice", "student"))
        .set_json(json!({"content": "a thorough report"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let submission_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["version"], 1);

    // 无评审时定稿
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{submission_id}/finalize"))
        .insert_header(bearer("prof", "faculty"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["error_code"], "E105");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{submission_id}/evaluations"))
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({"rubric_id": rubric_id, "points_awarded": 80}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{submission_id}/finalize"))
        .insert_header(bearer("prof", "faculty"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["overall_score"], 74.0);

    // 排行榜无需登录
    let req = test::TestRequest::get()
        .uri("/api/v1/leaderboard")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["items"][0]["rank"], 1);
    assert_eq!(body["data"]["items"][0]["student"], "alice");
    assert_eq!(body["data"]["items"][0]["submission_id"], submission_id);
}

#[actix_web::test]
async fn test_role_gates_and_visibility() {
    let app = init_app!();

    // 学生不能创建项目
    let req = test::TestRequest::post()
        .uri("/api/v1/projects")
        .insert_header(bearer("alice", "student"))
        .set_json(json!({
            "title": "Nope",
            "start_date": "2025-01-01",
            "end_date": "2099-12-31"
        }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    // 未登录
    let req = test::TestRequest::get().uri("/api/v1/projects").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // 非法 ID
    let req = test::TestRequest::get()
        .uri("/api/v1/projects/abc")
        .insert_header(bearer("alice", "student"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    // 不存在的提交
    let req = test::TestRequest::get()
        .uri("/api/v1/submissions/999")
        .insert_header(bearer("prof", "faculty"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["error_code"], "E103");
}

#[actix_web::test]
async fn test_malformed_json_uses_envelope() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/projects")
        .insert_header(bearer("prof", "faculty"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1000);
}

#[actix_web::test]
async fn test_faculty_lists_and_updates_project() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/projects")
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({
            "title": "Capstone",
            "start_date": "2025-01-01",
            "end_date": "2099-12-31"
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let project_id = body["data"]["id"].as_i64().unwrap();

    for student in ["alice", "alice", "bob"] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/projects/{project_id}/submissions"))
            .insert_header(bearer(student, "student"))
            .set_json(json!({"content": "report"}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/projects/{project_id}/submissions?latest=true&status=submitted&size=1"
        ))
        .insert_header(bearer("prof", "faculty"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["items"][0]["student"], "bob");

    // 学生不能浏览全部提交
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/projects/{project_id}/submissions"))
        .insert_header(bearer("alice", "student"))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::FORBIDDEN
    );

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/projects/{project_id}"))
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({"title": "Capstone 2025", "is_active": false}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["title"], "Capstone 2025");
    assert_eq!(body["data"]["is_active"], false);

    // 非创建者的教师
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/projects/{project_id}"))
        .insert_header(bearer("other-prof", "faculty"))
        .set_json(json!({"title": "Hijacked"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["error_code"], "E104");

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/projects/{project_id}"))
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({"end_date": "2024-01-01"}))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_web::test]
async fn test_unknown_rubric_reports_rubric_code() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/projects")
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({
            "title": "Capstone",
            "start_date": "2025-01-01",
            "end_date": "2099-12-31"
        }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let project_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/projects/{project_id}/submissions"))
        .insert_header(bearer("alice", "student"))
        .set_json(json!({"content": "report"}))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let submission_id = body["data"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/submissions/{submission_id}/evaluations"))
        .insert_header(bearer("prof", "faculty"))
        .set_json(json!({"rubric_id": 9999, "points_awarded": 10}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 2002);
    assert_eq!(body["data"]["error_type"], "Rubric Not Found");
}
