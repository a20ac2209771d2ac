//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod evaluations;
mod leaderboard;
mod projects;
mod rubrics;
mod submissions;

use crate::config::AppConfig;
use crate::errors::{ProjectFlowError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::with_connection(db).await
    }

    /// 基于已有连接创建（会执行迁移）
    pub async fn with_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| ProjectFlowError::database_connection(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成");

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ProjectFlowError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory")
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| {
                ProjectFlowError::database_connection(format!("SQLite 连接失败: {e}"))
            })?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| ProjectFlowError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ProjectFlowError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: memory://, sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

/// 把数据库错误包装成带上下文的存储错误
pub(crate) fn store_err(context: &'static str) -> impl Fn(DbErr) -> ProjectFlowError {
    move |e| {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
            return ProjectFlowError::store_unavailable(format!("{context}: 唯一约束冲突: {detail}"));
        }
        ProjectFlowError::store_unavailable(format!("{context}: {e}"))
    }
}

// Storage trait 实现
use crate::models::{
    evaluations::entities::{Evaluation, EvaluationRecord, MlMirror},
    leaderboard::responses::LeaderboardRow,
    projects::{
        entities::{Project, Rubric},
        requests::{
            CreateProjectRequest, CreateRubricRequest, ProjectListQuery, UpdateProjectRequest,
        },
        responses::ProjectListResponse,
    },
    submissions::{
        entities::{FinalScores, NewAttempt, Submission},
        requests::SubmissionListQuery,
        responses::SubmissionListResponse,
    },
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 项目模块
    async fn create_project(&self, created_by: &str, req: CreateProjectRequest) -> Result<Project> {
        self.create_project_impl(created_by, req).await
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>> {
        self.get_project_by_id_impl(id).await
    }

    async fn list_projects(&self, query: ProjectListQuery) -> Result<ProjectListResponse> {
        self.list_projects_impl(query).await
    }

    async fn update_project(
        &self,
        id: i64,
        update: UpdateProjectRequest,
    ) -> Result<Option<Project>> {
        self.update_project_impl(id, update).await
    }

    // 评分标准模块
    async fn create_rubric(&self, project_id: i64, req: CreateRubricRequest) -> Result<Rubric> {
        self.create_rubric_impl(project_id, req).await
    }

    async fn get_rubric_by_id(&self, id: i64) -> Result<Option<Rubric>> {
        self.get_rubric_by_id_impl(id).await
    }

    async fn list_rubrics_by_project(&self, project_id: i64) -> Result<Vec<Rubric>> {
        self.list_rubrics_by_project_impl(project_id).await
    }

    // 提交模块
    async fn count_attempts(&self, project_id: i64, student: &str) -> Result<i64> {
        self.count_attempts_impl(project_id, student).await
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Submission> {
        self.insert_attempt_impl(attempt).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn list_student_submissions(
        &self,
        project_id: i64,
        student: &str,
    ) -> Result<Vec<Submission>> {
        self.list_student_submissions_impl(project_id, student)
            .await
    }

    async fn list_project_submissions(
        &self,
        project_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        self.list_project_submissions_impl(project_id, query)
            .await
    }

    // 评审模块
    async fn upsert_evaluation(&self, record: EvaluationRecord) -> Result<Evaluation> {
        self.upsert_evaluation_impl(record).await
    }

    async fn list_evaluations(&self, submission_id: i64) -> Result<Vec<Evaluation>> {
        self.list_evaluations_impl(submission_id).await
    }

    async fn finalize_submission(
        &self,
        submission_id: i64,
        scores: FinalScores,
        mirrors: Vec<MlMirror>,
    ) -> Result<Submission> {
        self.finalize_submission_impl(submission_id, scores, mirrors)
            .await
    }

    // 排行榜模块
    async fn list_leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>> {
        self.list_leaderboard_rows_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{identity, sqlite_fixture, sqlite_storage};
    use crate::models::evaluations::requests::RecordEvaluationRequest;
    use crate::models::submissions::entities::SubmissionStatus;
    use crate::models::users::entities::UserRole;
    use chrono::NaiveDate;
    use serde_json::json;

    fn project_request() -> CreateProjectRequest {
        CreateProjectRequest {
            title: "Capstone".to_string(),
            description: Some("final year".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            is_active: true,
        }
    }

    fn rubric_request(criterion: &str, max_points: f64) -> CreateRubricRequest {
        CreateRubricRequest {
            criterion: criterion.to_string(),
            max_points,
            description: None,
        }
    }

    fn attempt(project_id: i64, student: &str, version: i32) -> NewAttempt {
        NewAttempt {
            project_id,
            student: student.to_string(),
            student_email: Some(format!("{student}@uni.edu")),
            version,
            content: Some("report".to_string()),
            report_path: None,
            github_link: None,
            youtube_link: None,
        }
    }

    fn record(submission_id: i64, rubric_id: i64, by: &str, points: f64) -> EvaluationRecord {
        EvaluationRecord {
            submission_id,
            rubric_id,
            evaluated_by: by.to_string(),
            points_awarded: points,
            feedback: None,
        }
    }

    #[tokio::test]
    async fn test_insert_attempt_demotes_previous_rows() {
        let storage = sqlite_storage().await;
        let project = storage.create_project("prof", project_request()).await.unwrap();

        for version in 1..=3 {
            storage
                .insert_attempt(attempt(project.id, "alice", version))
                .await
                .unwrap();
        }
        storage
            .insert_attempt(attempt(project.id, "bob", 1))
            .await
            .unwrap();

        let history = storage
            .list_student_submissions(project.id, "alice")
            .await
            .unwrap();
        let flags: Vec<(i32, bool)> = history.iter().map(|s| (s.version, s.is_latest)).collect();
        assert_eq!(flags, vec![(3, true), (2, false), (1, false)]);
        assert_eq!(storage.count_attempts(project.id, "alice").await.unwrap(), 3);

        // 其他学生的最新标记不受影响
        let bobs = storage
            .list_student_submissions(project.id, "bob")
            .await
            .unwrap();
        assert!(bobs[0].is_latest);
    }

    #[tokio::test]
    async fn test_duplicate_version_rolls_back() {
        let storage = sqlite_storage().await;
        let project = storage.create_project("prof", project_request()).await.unwrap();

        storage
            .insert_attempt(attempt(project.id, "alice", 1))
            .await
            .unwrap();
        let err = storage
            .insert_attempt(attempt(project.id, "alice", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::StoreUnavailable(_)));

        let history = storage
            .list_student_submissions(project.id, "alice")
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].is_latest);
    }

    #[tokio::test]
    async fn test_upsert_advances_status_and_finalize_writes_mirrors() {
        let storage = sqlite_storage().await;
        let project = storage.create_project("prof", project_request()).await.unwrap();
        let quality = storage
            .create_rubric(project.id, rubric_request("Quality", 50.0))
            .await
            .unwrap();
        let impact = storage
            .create_rubric(project.id, rubric_request("Impact", 50.0))
            .await
            .unwrap();
        let submission = storage
            .insert_attempt(attempt(project.id, "alice", 1))
            .await
            .unwrap();

        let first = storage
            .upsert_evaluation(record(submission.id, quality.id, "ta", 30.0))
            .await
            .unwrap();
        let stored = storage.get_submission_by_id(submission.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::UnderEvaluation);

        // 同一评分项由另一位评审覆盖
        let second = storage
            .upsert_evaluation(record(submission.id, quality.id, "prof", 45.0))
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        let impact_eval = storage
            .upsert_evaluation(record(submission.id, impact.id, "prof", 35.0))
            .await
            .unwrap();

        let evaluations = storage.list_evaluations(submission.id).await.unwrap();
        let rows: Vec<(i64, f64, &str)> = evaluations
            .iter()
            .map(|e| (e.rubric_id, e.points_awarded, e.evaluated_by.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![(quality.id, 45.0, "prof"), (impact.id, 35.0, "prof")]
        );

        let scores = FinalScores {
            manual_score: 80.0,
            ml_score: 60.0,
            overall_score: 74.0,
        };
        let finalized = storage
            .finalize_submission(
                submission.id,
                scores,
                vec![
                    MlMirror {
                        evaluation_id: first.id,
                        points: 25.0,
                        feedback: Some("well argued".to_string()),
                    },
                    MlMirror {
                        evaluation_id: impact_eval.id,
                        points: 35.0,
                        feedback: None,
                    },
                ],
            )
            .await
            .unwrap();
        assert_eq!(finalized.status, SubmissionStatus::Evaluated);
        assert_eq!(finalized.overall_score, Some(74.0));

        let mirrors: Vec<Option<f64>> = storage
            .list_evaluations(submission.id)
            .await
            .unwrap()
            .iter()
            .map(|e| e.ml_points_awarded)
            .collect();
        assert_eq!(mirrors, vec![Some(25.0), Some(35.0)]);

        // 定稿后的评审不回退状态
        storage
            .upsert_evaluation(record(submission.id, impact.id, "prof", 40.0))
            .await
            .unwrap();
        let stored = storage.get_submission_by_id(submission.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubmissionStatus::Evaluated);

        let err = storage
            .upsert_evaluation(record(999, quality.id, "prof", 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_leaderboard_rows_only_latest_scored() {
        let storage = sqlite_storage().await;
        let project = storage.create_project("prof", project_request()).await.unwrap();
        let scores = |overall_score| FinalScores {
            manual_score: overall_score,
            ml_score: 0.0,
            overall_score,
        };

        let alice_first = storage
            .insert_attempt(attempt(project.id, "alice", 1))
            .await
            .unwrap();
        storage
            .finalize_submission(alice_first.id, scores(90.0), Vec::new())
            .await
            .unwrap();
        storage
            .insert_attempt(attempt(project.id, "alice", 2))
            .await
            .unwrap();

        let bob = storage
            .insert_attempt(attempt(project.id, "bob", 1))
            .await
            .unwrap();
        storage
            .finalize_submission(bob.id, scores(70.0), Vec::new())
            .await
            .unwrap();

        let rows = storage.list_leaderboard_rows().await.unwrap();
        assert_eq!(
            rows,
            vec![LeaderboardRow {
                submission_id: bob.id,
                student: "bob".to_string(),
                project_title: "Capstone".to_string(),
                overall_score: 70.0,
            }]
        );
    }

    #[tokio::test]
    async fn test_update_project_and_list_submissions() {
        let storage = sqlite_storage().await;
        let project = storage.create_project("prof", project_request()).await.unwrap();

        let updated = storage
            .update_project(
                project.id,
                UpdateProjectRequest {
                    title: Some("Capstone II".to_string()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Capstone II");
        assert!(!updated.is_active);
        assert_eq!(updated.description.as_deref(), Some("final year"));
        assert_eq!(updated.end_date, project.end_date);
        assert!(
            storage
                .update_project(999, UpdateProjectRequest::default())
                .await
                .unwrap()
                .is_none()
        );

        let first = storage
            .insert_attempt(attempt(project.id, "alice", 1))
            .await
            .unwrap();
        let second = storage
            .insert_attempt(attempt(project.id, "alice", 2))
            .await
            .unwrap();
        let bob = storage
            .insert_attempt(attempt(project.id, "bob", 1))
            .await
            .unwrap();
        storage
            .finalize_submission(
                bob.id,
                FinalScores {
                    manual_score: 50.0,
                    ml_score: 50.0,
                    overall_score: 50.0,
                },
                Vec::new(),
            )
            .await
            .unwrap();

        let all = storage
            .list_project_submissions(project.id, SubmissionListQuery::default())
            .await
            .unwrap();
        let ids: Vec<i64> = all.items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![bob.id, second.id, first.id]);
        assert_eq!(all.pagination.total, 3);

        let pending_latest = storage
            .list_project_submissions(
                project.id,
                SubmissionListQuery {
                    latest: Some(true),
                    status: Some(SubmissionStatus::Submitted),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(pending_latest.items.len(), 1);
        assert_eq!(pending_latest.items[0].id, second.id);

        let page_two = storage
            .list_project_submissions(
                project.id,
                SubmissionListQuery {
                    page: Some(2),
                    size: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page_two.items.len(), 1);
        assert_eq!(page_two.items[0].id, first.id);
        assert_eq!(page_two.pagination.total_pages, 2);
    }

    #[tokio::test]
    async fn test_engine_flow_on_database_store() {
        let fx = sqlite_fixture(json!({
            "quality_score": {"value": 25, "feedback": "well argued"},
            "impact_score": 35
        }))
        .await;
        let project = fx.project().await;
        let quality = fx.rubric(project.id, "Quality", 50.0).await;
        let impact = fx.rubric(project.id, "Impact", 50.0).await;

        fx.submit(project.id).await;
        fx.submit(project.id).await;
        let latest = fx.submit(project.id).await;
        assert_eq!(latest.version, 3);
        let err = fx
            .engine
            .create_attempt(
                &fx.student,
                project.id,
                crate::engine::testing::content("one more"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::AttemptLimitReached(_)));

        // 未评审的最新提交不上榜
        assert!(fx.engine.get_leaderboard().await.unwrap().items.is_empty());

        let err = fx.engine.finalize(&fx.faculty, latest.id).await.unwrap_err();
        assert!(matches!(err, ProjectFlowError::NoEvaluations(_)));
        let stored = fx.engine.get_submission(&fx.faculty, latest.id).await.unwrap();
        assert_eq!(stored.status, SubmissionStatus::Submitted);

        let ta = identity("ta", UserRole::Faculty);
        for (who, rubric_id, points) in [(&ta, quality.id, 45.0), (&fx.faculty, impact.id, 35.0)] {
            fx.engine
                .record_evaluation(
                    who,
                    latest.id,
                    RecordEvaluationRequest {
                        rubric_id,
                        points_awarded: points,
                        feedback: None,
                    },
                )
                .await
                .unwrap();
        }

        let result = fx.engine.finalize(&fx.faculty, latest.id).await.unwrap();
        assert_eq!(result.status, SubmissionStatus::Evaluated);
        assert_eq!(
            result.scores,
            FinalScores {
                manual_score: 80.0,
                ml_score: 60.0,
                overall_score: 74.0,
            }
        );

        let listed = fx
            .engine
            .list_evaluations(&fx.faculty, latest.id)
            .await
            .unwrap();
        let mirrors: Vec<Option<f64>> = listed.items.iter().map(|e| e.ml_points_awarded).collect();
        assert_eq!(mirrors, vec![Some(25.0), Some(35.0)]);
    }

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("projectflow.db").unwrap(),
            "sqlite://projectflow.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/pf").unwrap(),
            "postgres://u:p@localhost/pf"
        );
        assert!(SeaOrmStorage::build_database_url("ftp://nope").is_err());
    }
}
