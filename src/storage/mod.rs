use std::sync::Arc;

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

use crate::config::AppConfig;
use crate::errors::Result;

pub mod memory_storage;
pub mod sea_orm_storage;

/// 内存存储的连接串
pub const MEMORY_STORAGE_URL: &str = "memory://";

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 项目管理方法
    // 创建项目
    async fn create_project(&self, created_by: &str, req: CreateProjectRequest) -> Result<Project>;
    // 通过ID获取项目
    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>>;
    // 分页列出项目
    async fn list_projects(&self, query: ProjectListQuery) -> Result<ProjectListResponse>;
    // 只更新提供的字段，项目不存在时返回 None
    async fn update_project(
        &self,
        id: i64,
        update: UpdateProjectRequest,
    ) -> Result<Option<Project>>;

    /// 评分标准方法
    async fn create_rubric(&self, project_id: i64, req: CreateRubricRequest) -> Result<Rubric>;
    async fn get_rubric_by_id(&self, id: i64) -> Result<Option<Rubric>>;
    // 按 id 升序返回
    async fn list_rubrics_by_project(&self, project_id: i64) -> Result<Vec<Rubric>>;

    /// 提交管理方法
    // 统计学生在项目下的提交次数（含历史版本）
    async fn count_attempts(&self, project_id: i64, student: &str) -> Result<i64>;
    // 在同一事务中把旧提交降级并写入新提交
    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    // 学生在项目下的全部提交，新版本在前
    async fn list_student_submissions(
        &self,
        project_id: i64,
        student: &str,
    ) -> Result<Vec<Submission>>;
    // 项目下的提交分页列表，新提交在前
    async fn list_project_submissions(
        &self,
        project_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse>;

    /// 评审方法
    // 按 (submission_id, rubric_id) 覆盖写入，并推进提交状态
    async fn upsert_evaluation(&self, record: EvaluationRecord) -> Result<Evaluation>;
    // 按 rubric_id 升序返回
    async fn list_evaluations(&self, submission_id: i64) -> Result<Vec<Evaluation>>;
    // 在同一事务中写入最终分数、状态和自动评分对照
    async fn finalize_submission(
        &self,
        submission_id: i64,
        scores: FinalScores,
        mirrors: Vec<MlMirror>,
    ) -> Result<Submission>;

    /// 排行榜方法
    // 最新且已定稿的提交，按 id 升序
    async fn list_leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let config = AppConfig::get();
    if config.database.url == MEMORY_STORAGE_URL {
        tracing::warn!("使用内存存储，数据不会持久化");
        return Ok(Arc::new(memory_storage::MemoryStorage::new()));
    }

    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
