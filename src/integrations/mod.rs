//! 外部协作方
//!
//! 评审引擎只通过这里的 trait 与外部交互：身份校验、正文提取、
//! 自动评分和邮件通知。每个 trait 都有一个内置实现。

pub mod content;
pub mod http_scorer;
pub mod keyword_scorer;
pub mod notifier;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ScoringConfig;
use crate::errors::{ProjectFlowError, Result};
use crate::models::projects::entities::Rubric;
use crate::models::users::entities::Identity;

pub use content::FileContentExtractor;
pub use http_scorer::HttpScorer;
pub use keyword_scorer::KeywordScorer;
pub use notifier::{EmailMessage, LogNotifier};

/// 自动评分服务
///
/// 返回原始的 JSON 结果，由评分适配器负责校验和归一化。
#[async_trait]
pub trait AutoScorer: Send + Sync {
    fn name(&self) -> &'static str;
    async fn score(&self, text: &str, rubrics: &[Rubric]) -> Result<serde_json::Value>;
}

/// 令牌校验
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity>;
}

/// 报告正文提取，失败时返回空字符串
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, path: &str) -> String;
}

/// 邮件发送，返回是否成功
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> bool;
}

/// 按配置选择自动评分后端
pub fn create_scorer(config: &ScoringConfig) -> Result<Arc<dyn AutoScorer>> {
    match config.backend.as_str() {
        "keyword" => Ok(Arc::new(KeywordScorer::new())),
        "http" => Ok(Arc::new(HttpScorer::new(&config.endpoint)?)),
        other => Err(ProjectFlowError::validation_failed(format!(
            "未知的评分后端: {other}. 支持: keyword, http"
        ))),
    }
}
