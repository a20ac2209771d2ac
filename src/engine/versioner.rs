//! 提交版本管理

use tracing::{info, warn};

use super::ScoringEngine;
use crate::errors::{ProjectFlowError, Result};
use crate::integrations::EmailMessage;
use crate::models::projects::entities::Project;
use crate::models::submissions::{
    entities::{NewAttempt, Submission},
    requests::{CreateSubmissionRequest, SubmissionListQuery},
    responses::{SubmissionHistoryResponse, SubmissionListResponse},
};
use crate::models::users::entities::{Identity, UserRole};
use crate::utils::validate::{normalize_optional, validate_github_link, validate_youtube_link};

impl ScoringEngine {
    /// 创建一次新提交
    ///
    /// 同一 (项目, 学生) 的调用在进程内串行；旧版本降级和新版本写入
    /// 在存储层的同一事务中完成。
    pub async fn create_attempt(
        &self,
        identity: &Identity,
        project_id: i64,
        req: CreateSubmissionRequest,
    ) -> Result<Submission> {
        if identity.role != UserRole::Student {
            return Err(ProjectFlowError::forbidden("只有学生可以提交作品"));
        }

        let github_link = normalize_optional(req.github_link);
        if let Some(link) = &github_link {
            validate_github_link(link).map_err(ProjectFlowError::validation_failed)?;
        }
        let youtube_link = normalize_optional(req.youtube_link);
        if let Some(link) = &youtube_link {
            validate_youtube_link(link).map_err(ProjectFlowError::validation_failed)?;
        }

        let project = self.load_project(project_id).await?;
        if !project.is_active {
            return Err(ProjectFlowError::validation_failed(format!(
                "项目已停止接受提交: {}",
                project.title
            )));
        }
        let today = chrono::Utc::now().date_naive();
        if project.is_past_deadline(today) {
            return Err(ProjectFlowError::deadline_expired(format!(
                "项目截止日期为 {}，已无法提交",
                project.end_date
            )));
        }

        let key = (project_id, identity.username.clone());
        let lock = self.attempt_lock(&key);
        let result = {
            let _guard = lock.lock().await;

            let prior = self
                .storage
                .count_attempts(project_id, &identity.username)
                .await?;
            if prior >= self.settings.max_attempts {
                Err(ProjectFlowError::attempt_limit_reached(format!(
                    "已达到最大提交次数 {}",
                    self.settings.max_attempts
                )))
            } else {
                let report_path = normalize_optional(req.report_path);
                let content = self
                    .resolve_content(req.content, report_path.as_deref())
                    .await;

                self.storage
                    .insert_attempt(NewAttempt {
                        project_id,
                        student: identity.username.clone(),
                        student_email: identity.email.clone(),
                        version: (prior + 1) as i32,
                        content,
                        report_path,
                        github_link,
                        youtube_link,
                    })
                    .await
            }
        };
        self.release_attempt_lock(&key, lock);

        let submission = result?;
        info!(
            "Student {} submitted attempt #{} for project {} (submission {})",
            submission.student, submission.version, project_id, submission.id
        );

        if let Some(email) = &submission.student_email {
            self.notify(EmailMessage::submission_received(
                email,
                &project.title,
                submission.version,
            ));
        }

        Ok(submission)
    }

    /// 内联正文优先，否则从报告文件提取
    async fn resolve_content(
        &self,
        inline: Option<String>,
        report_path: Option<&str>,
    ) -> Option<String> {
        if let Some(text) = inline.filter(|t| !t.trim().is_empty()) {
            return Some(text);
        }
        let path = report_path?;
        let text = self.extractor.extract(path).await;
        if text.trim().is_empty() {
            warn!("Report {} yielded no text; submission cannot be finalized until it has content", path);
            None
        } else {
            Some(text)
        }
    }

    /// 提交详情：提交者本人或评审人可见
    pub async fn get_submission(&self, identity: &Identity, submission_id: i64) -> Result<Submission> {
        let submission = self.load_submission(submission_id).await?;
        Self::ensure_can_view(identity, &submission)?;
        Ok(submission)
    }

    /// 当前用户在项目下的全部提交，新版本在前
    pub async fn submission_history(
        &self,
        identity: &Identity,
        project_id: i64,
    ) -> Result<SubmissionHistoryResponse> {
        self.load_project(project_id).await?;

        let items = self
            .storage
            .list_student_submissions(project_id, &identity.username)
            .await?;

        Ok(SubmissionHistoryResponse {
            project_id,
            attempts_used: items.len() as i64,
            attempts_allowed: self.settings.max_attempts,
            items,
        })
    }

    /// 项目下全部学生的提交，供评审人挑选待评审的提交
    pub async fn list_project_submissions(
        &self,
        identity: &Identity,
        project_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        Self::ensure_evaluator(identity, "查看项目提交列表")?;
        self.load_project(project_id).await?;
        self.storage.list_project_submissions(project_id, query).await
    }

    pub(crate) async fn load_project(&self, project_id: i64) -> Result<Project> {
        self.storage
            .get_project_by_id(project_id)
            .await?
            .ok_or_else(|| ProjectFlowError::not_found(format!("项目不存在: {project_id}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::engine::testing::{ChannelNotifier, content, fixture, identity, open_project_request};
    use crate::integrations::FileContentExtractor;
    use crate::models::projects::requests::CreateProjectRequest;
    use crate::models::submissions::entities::SubmissionStatus;

    fn assert_single_latest(items: &[Submission]) {
        let latest: Vec<_> = items.iter().filter(|s| s.is_latest).collect();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].version as usize, items.len());
    }

    #[tokio::test]
    async fn test_attempts_keep_single_latest_row() {
        let fx = fixture(json!({}));
        let project = fx.project().await;

        for expected_version in 1..=3 {
            let submission = fx.submit(project.id).await;
            assert_eq!(submission.version, expected_version);
            assert_eq!(submission.status, SubmissionStatus::Submitted);
            assert!(submission.overall_score.is_none());

            let history = fx
                .engine
                .submission_history(&fx.student, project.id)
                .await
                .unwrap();
            assert_eq!(history.attempts_used, expected_version as i64);
            assert_single_latest(&history.items);
        }
    }

    #[tokio::test]
    async fn test_fourth_attempt_is_rejected_without_changes() {
        let fx = fixture(json!({}));
        let project = fx.project().await;
        for _ in 0..3 {
            fx.submit(project.id).await;
        }
        let before = fx
            .engine
            .submission_history(&fx.student, project.id)
            .await
            .unwrap()
            .items;

        let err = fx
            .engine
            .create_attempt(&fx.student, project.id, content("one more"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::AttemptLimitReached(_)));

        let after = fx
            .engine
            .submission_history(&fx.student, project.id)
            .await
            .unwrap()
            .items;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_concurrent_attempts_are_serialized() {
        let fx = Arc::new(fixture(json!({})));
        let project = fx.project().await;

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let fx = fx.clone();
                tokio::spawn(async move {
                    fx.engine
                        .create_attempt(&fx.student, project.id, content("race"))
                        .await
                })
            })
            .collect();

        let mut ok = 0;
        let mut limited = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(ProjectFlowError::AttemptLimitReached(_)) => limited += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!((ok, limited), (3, 2));

        let history = fx
            .engine
            .submission_history(&fx.student, project.id)
            .await
            .unwrap();
        assert_single_latest(&history.items);
        assert!(fx.engine.attempt_locks.is_empty());
    }

    #[tokio::test]
    async fn test_attempt_preconditions() {
        let fx = fixture(json!({}));

        let err = fx
            .engine
            .create_attempt(&fx.student, 404, content("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::NotFound(_)));

        let inactive = fx
            .engine
            .storage()
            .create_project(
                "prof",
                CreateProjectRequest {
                    is_active: false,
                    ..open_project_request()
                },
            )
            .await
            .unwrap();
        let err = fx
            .engine
            .create_attempt(&fx.student, inactive.id, content("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::ValidationFailed(_)));

        let closed = fx
            .engine
            .storage()
            .create_project(
                "prof",
                CreateProjectRequest {
                    end_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                    ..open_project_request()
                },
            )
            .await
            .unwrap();
        let err = fx
            .engine
            .create_attempt(&fx.student, closed.id, content("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::DeadlineExpired(_)));

        let project = fx.project().await;
        let err = fx
            .engine
            .create_attempt(&fx.faculty, project.id, content("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_rejects_invalid_links() {
        let fx = fixture(json!({}));
        let project = fx.project().await;

        let err = fx
            .engine
            .create_attempt(
                &fx.student,
                project.id,
                CreateSubmissionRequest {
                    github_link: Some("https://example.com/repo".to_string()),
                    ..content("x")
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectFlowError::ValidationFailed(_)));

        let submission = fx
            .engine
            .create_attempt(
                &fx.student,
                project.id,
                CreateSubmissionRequest {
                    github_link: Some(" https://github.com/alice/capstone ".to_string()),
                    youtube_link: Some(String::new()),
                    ..content("x")
                },
            )
            .await
            .unwrap();
        assert_eq!(
            submission.github_link.as_deref(),
            Some("https://github.com/alice/capstone")
        );
        assert_eq!(submission.youtube_link, None);
    }

    #[tokio::test]
    async fn test_content_from_report_and_empty_content_allowed() {
        let dir = std::env::temp_dir().join(format!("projectflow-versioner-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("report.txt"), "novel and robust").unwrap();

        let fx = fixture(json!({}));
        let engine = fx
            .engine
            .with_extractor(Arc::new(FileContentExtractor::new(&dir)));
        let project = engine
            .storage()
            .create_project("prof", open_project_request())
            .await
            .unwrap();
        let student = identity("bob", UserRole::Student);

        let from_report = engine
            .create_attempt(
                &student,
                project.id,
                CreateSubmissionRequest {
                    report_path: Some("report.txt".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(from_report.content.as_deref(), Some("novel and robust"));

        let empty = engine
            .create_attempt(&student, project.id, CreateSubmissionRequest::default())
            .await
            .unwrap();
        assert_eq!(empty.content, None);
        assert_eq!(empty.version, 2);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_submission_visibility_and_confirmation_email() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fx = fixture(json!({}));
        let engine = fx.engine.with_notifier(Arc::new(ChannelNotifier { tx }));
        let project = engine
            .storage()
            .create_project("prof", open_project_request())
            .await
            .unwrap();

        let submission = engine
            .create_attempt(&fx.student, project.id, content("report"))
            .await
            .unwrap();

        let email = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(email.recipient, "alice@uni.edu");
        assert!(email.subject.contains("Capstone"));

        assert!(engine.get_submission(&fx.student, submission.id).await.is_ok());
        assert!(engine.get_submission(&fx.faculty, submission.id).await.is_ok());
        let other = identity("mallory", UserRole::Student);
        assert!(matches!(
            engine.get_submission(&other, submission.id).await,
            Err(ProjectFlowError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_evaluators_list_project_submissions() {
        let fx = fixture(json!({}));
        let project = fx.project().await;

        fx.submit(project.id).await;
        let alice_latest = fx.submit(project.id).await;
        let bob = fx
            .submit_as(&identity("bob", UserRole::Student), project.id)
            .await;

        let latest = fx
            .engine
            .list_project_submissions(
                &fx.faculty,
                project.id,
                SubmissionListQuery {
                    latest: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let ids: Vec<i64> = latest.items.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![bob.id, alice_latest.id]);

        let everything = fx
            .engine
            .list_project_submissions(&fx.faculty, project.id, SubmissionListQuery::default())
            .await
            .unwrap();
        assert_eq!(everything.pagination.total, 3);

        assert!(matches!(
            fx.engine
                .list_project_submissions(&fx.student, project.id, SubmissionListQuery::default())
                .await,
            Err(ProjectFlowError::Forbidden(_))
        ));
        assert!(matches!(
            fx.engine
                .list_project_submissions(&fx.faculty, 999, SubmissionListQuery::default())
                .await,
            Err(ProjectFlowError::NotFound(_))
        ));
    }
}
