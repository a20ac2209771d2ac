//! 邮件通知

use async_trait::async_trait;
use tracing::{info, warn};

use super::Notifier;
use crate::config::NotificationConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    /// 提交确认
    pub fn submission_received(recipient: &str, project_title: &str, version: i32) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: format!("Submission received: {project_title}"),
            body: format!(
                "Your attempt #{version} for \"{project_title}\" has been received and is awaiting evaluation."
            ),
        }
    }

    /// 评分结果可查看
    pub fn results_available(recipient: &str, project_title: &str, overall_score: f64) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: format!("Results available: {project_title}"),
            body: format!(
                "Your submission for \"{project_title}\" has been evaluated. Overall score: {overall_score:.2}."
            ),
        }
    }
}

/// 只把邮件写入日志的通知器
pub struct LogNotifier {
    enabled: bool,
    sender: String,
}

impl LogNotifier {
    pub fn new(enabled: bool, sender: impl Into<String>) -> Self {
        Self {
            enabled,
            sender: sender.into(),
        }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        Self::new(config.enabled, config.sender.clone())
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> bool {
        if !self.enabled {
            return false;
        }
        if message.recipient.trim().is_empty() {
            warn!("Skipping email \"{}\": empty recipient", message.subject);
            return false;
        }

        info!(
            from = %self.sender,
            to = %message.recipient,
            subject = %message.subject,
            "email: {}",
            message.body
        );
        true
    }
}
