//! 提交评审与评分引擎
//!
//! - versioner: 多次提交的版本管理
//! - aggregator: 人工评审的记录与汇总
//! - scorer: 自动评分结果的校验与归一化
//! - fusion: 加权合成最终分数并定稿
//! - leaderboard: 带缓存的排行榜
//!
//! 引擎不依赖 HTTP 层，所有协作方都通过构造参数注入。

pub mod aggregator;
pub mod catalog;
pub mod fusion;
pub mod leaderboard;
pub mod scorer;
pub mod versioner;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::errors::{ProjectFlowError, Result};
use crate::integrations::{
    AutoScorer, ContentExtractor, EmailMessage, FileContentExtractor, LogNotifier, Notifier,
};
use crate::models::submissions::entities::Submission;
use crate::models::users::entities::Identity;
use crate::storage::Storage;

pub use fusion::fuse_scores;
pub use leaderboard::{LEADERBOARD_CACHE_KEY, LeaderboardCache, rank_rows};
pub use scorer::{CriterionScore, NormalizedScores, ScoreValue, ScorerAdapter};

/// 保留两位小数，0.5 远离零舍入
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 评分项名称规范化：小写，连续的非字母数字字符替换为单个下划线
pub fn rubric_key(criterion: &str) -> String {
    let mut key = String::with_capacity(criterion.len());
    let mut in_separator = false;
    for c in criterion.chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
            in_separator = false;
        } else if !in_separator {
            key.push('_');
            in_separator = true;
        }
    }
    key
}

/// 引擎参数
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub ml_weight: f64,
    pub max_attempts: i64,
    pub scorer_timeout: Duration,
    pub leaderboard_ttl: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            ml_weight: 0.3,
            max_attempts: 3,
            scorer_timeout: Duration::from_millis(15000),
            leaderboard_ttl: Duration::from_secs(300),
        }
    }
}

impl EngineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ml_weight: config.scoring.ml_weight,
            max_attempts: config.scoring.max_attempts,
            scorer_timeout: Duration::from_millis(config.scoring.timeout_ms),
            leaderboard_ttl: Duration::from_secs(config.leaderboard.ttl_secs),
        }
    }
}

type AttemptKey = (i64, String);

pub struct ScoringEngine {
    storage: Arc<dyn Storage>,
    scorer: ScorerAdapter,
    leaderboard: LeaderboardCache,
    notifier: Arc<dyn Notifier>,
    extractor: Arc<dyn ContentExtractor>,
    settings: EngineSettings,
    // 同一 (项目, 学生) 的提交串行执行
    attempt_locks: DashMap<AttemptKey, Arc<Mutex<()>>>,
}

impl ScoringEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        scorer: Arc<dyn AutoScorer>,
        cache: Arc<dyn ObjectCache>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            storage,
            scorer: ScorerAdapter::new(scorer, settings.scorer_timeout),
            leaderboard: LeaderboardCache::new(cache, settings.leaderboard_ttl),
            notifier: Arc::new(LogNotifier::new(false, "")),
            extractor: Arc::new(FileContentExtractor::new("uploads")),
            settings,
            attempt_locks: DashMap::new(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ContentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    fn attempt_lock(&self, key: &AttemptKey) -> Arc<Mutex<()>> {
        self.attempt_locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 没有其他等待者时移除锁条目
    fn release_attempt_lock(&self, key: &AttemptKey, lock: Arc<Mutex<()>>) {
        drop(lock);
        self.attempt_locks
            .remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// 异步发送邮件，结果只记录日志
    fn notify(&self, message: EmailMessage) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let subject = message.subject.clone();
            if !notifier.send(message).await {
                debug!("Email \"{}\" was not sent", subject);
            }
        });
    }

    /// 读取提交，不存在时返回 NotFound
    async fn load_submission(&self, submission_id: i64) -> Result<Submission> {
        self.storage
            .get_submission_by_id(submission_id)
            .await?
            .ok_or_else(|| ProjectFlowError::not_found(format!("提交不存在: {submission_id}")))
    }

    fn ensure_evaluator(identity: &Identity, action: &str) -> Result<()> {
        if identity.role.is_evaluator() {
            Ok(())
        } else {
            Err(ProjectFlowError::forbidden(format!(
                "只有教师或管理员可以{action}"
            )))
        }
    }

    /// 提交者本人或评审人可见
    fn ensure_can_view(identity: &Identity, submission: &Submission) -> Result<()> {
        if identity.role.is_evaluator() || identity.username == submission.student {
            Ok(())
        } else {
            Err(ProjectFlowError::forbidden("无权查看该提交"))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::mpsc;

    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;
    use crate::models::projects::{
        entities::{Project, Rubric},
        requests::{CreateProjectRequest, CreateRubricRequest},
    };
    use crate::models::submissions::requests::CreateSubmissionRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::memory_storage::MemoryStorage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use sea_orm::{ConnectOptions, Database};

    /// 返回固定 JSON 的评分器，记录调用次数
    pub struct StubScorer {
        pub response: std::sync::Mutex<serde_json::Value>,
        pub calls: AtomicUsize,
        pub delay: Option<Duration>,
    }

    impl StubScorer {
        pub fn returning(response: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                response: std::sync::Mutex::new(response),
                calls: AtomicUsize::new(0),
                delay: None,
            })
        }

        pub fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                response: std::sync::Mutex::new(serde_json::json!({})),
                calls: AtomicUsize::new(0),
                delay: Some(delay),
            })
        }

        pub fn set_response(&self, response: serde_json::Value) {
            *self.response.lock().unwrap() = response;
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AutoScorer for StubScorer {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn score(&self, _text: &str, _rubrics: &[Rubric]) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.response.lock().unwrap().clone())
        }
    }

    /// 把邮件转发到通道里的通知器
    pub struct ChannelNotifier {
        pub tx: mpsc::UnboundedSender<EmailMessage>,
    }

    #[async_trait]
    impl Notifier for ChannelNotifier {
        async fn send(&self, message: EmailMessage) -> bool {
            self.tx.send(message).is_ok()
        }
    }

    pub struct Fixture {
        pub engine: ScoringEngine,
        pub scorer: Arc<StubScorer>,
        pub faculty: Identity,
        pub student: Identity,
    }

    pub fn identity(username: &str, role: UserRole) -> Identity {
        Identity {
            username: username.to_string(),
            role,
            email: Some(format!("{username}@uni.edu")),
        }
    }

    pub fn fixture_on(
        storage: Arc<dyn Storage>,
        scorer: Arc<StubScorer>,
        settings: EngineSettings,
    ) -> Fixture {
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::with_settings(64, 3600));
        let engine = ScoringEngine::new(storage, scorer.clone(), cache, settings);

        Fixture {
            engine,
            scorer,
            faculty: identity("prof", UserRole::Faculty),
            student: identity("alice", UserRole::Student),
        }
    }

    pub fn fixture_with(scorer: Arc<StubScorer>, settings: EngineSettings) -> Fixture {
        fixture_on(Arc::new(MemoryStorage::new()), scorer, settings)
    }

    pub fn fixture(response: serde_json::Value) -> Fixture {
        fixture_with(StubScorer::returning(response), EngineSettings::default())
    }

    /// 单连接的 SQLite 内存库，连接关闭即丢弃数据
    pub async fn sqlite_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        SeaOrmStorage::with_connection(db).await.unwrap()
    }

    pub async fn sqlite_fixture(response: serde_json::Value) -> Fixture {
        fixture_on(
            Arc::new(sqlite_storage().await),
            StubScorer::returning(response),
            EngineSettings::default(),
        )
    }

    pub fn open_project_request() -> CreateProjectRequest {
        CreateProjectRequest {
            title: "Capstone".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2099, 12, 31).unwrap(),
            is_active: true,
        }
    }

    pub fn content(text: &str) -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            content: Some(text.to_string()),
            ..Default::default()
        }
    }

    impl Fixture {
        pub async fn project(&self) -> Project {
            self.engine
                .storage()
                .create_project(&self.faculty.username, open_project_request())
                .await
                .unwrap()
        }

        pub async fn rubric(&self, project_id: i64, criterion: &str, max_points: f64) -> Rubric {
            self.engine
                .storage()
                .create_rubric(
                    project_id,
                    CreateRubricRequest {
                        criterion: criterion.to_string(),
                        max_points,
                        description: None,
                    },
                )
                .await
                .unwrap()
        }

        pub async fn submit_as(&self, student: &Identity, project_id: i64) -> Submission {
            self.engine
                .create_attempt(student, project_id, content("a thorough report"))
                .await
                .unwrap()
        }

        pub async fn submit(&self, project_id: i64) -> Submission {
            self.submit_as(&self.student, project_id).await
        }
    }
}
