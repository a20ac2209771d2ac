//! 内存存储实现
//!
//! 单进程、非持久化；所有写操作在一把写锁内完成，
//! 因此与数据库实现一样具备事务语义。主要用于测试和本地演示。

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::errors::{ProjectFlowError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    evaluations::entities::{Evaluation, EvaluationKey, EvaluationRecord, MlMirror},
    leaderboard::responses::LeaderboardRow,
    projects::{
        entities::{Project, Rubric},
        requests::{
            CreateProjectRequest, CreateRubricRequest, ProjectListQuery, UpdateProjectRequest,
        },
        responses::ProjectListResponse,
    },
    submissions::{
        entities::{FinalScores, NewAttempt, Submission, SubmissionStatus},
        requests::SubmissionListQuery,
        responses::SubmissionListResponse,
    },
};
use crate::storage::Storage;

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    projects: BTreeMap<i64, Project>,
    rubrics: BTreeMap<i64, Rubric>,
    submissions: BTreeMap<i64, Submission>,
    evaluations: HashMap<EvaluationKey, Evaluation>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    state: RwLock<MemoryState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_project(&self, created_by: &str, req: CreateProjectRequest) -> Result<Project> {
        let mut state = self.state.write().await;
        let now = chrono::Utc::now();
        let project = Project {
            id: state.allocate_id(),
            title: req.title,
            description: req.description,
            created_by: created_by.to_string(),
            start_date: req.start_date,
            end_date: req.end_date,
            is_active: req.is_active,
            created_at: now,
            updated_at: now,
        };
        state.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project_by_id(&self, id: i64) -> Result<Option<Project>> {
        Ok(self.state.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self, query: ProjectListQuery) -> Result<ProjectListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let state = self.state.read().await;
        let mut matching: Vec<&Project> = state
            .projects
            .values()
            .filter(|p| query.active.is_none_or(|active| p.is_active == active))
            .collect();
        // 新项目在前
        matching.reverse();

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .cloned()
            .collect();

        Ok(ProjectListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    async fn update_project(
        &self,
        id: i64,
        update: UpdateProjectRequest,
    ) -> Result<Option<Project>> {
        let mut state = self.state.write().await;
        let Some(project) = state.projects.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = update.title {
            project.title = title;
        }
        if let Some(description) = update.description {
            project.description = Some(description);
        }
        if let Some(start_date) = update.start_date {
            project.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            project.end_date = end_date;
        }
        if let Some(is_active) = update.is_active {
            project.is_active = is_active;
        }
        project.updated_at = chrono::Utc::now();

        Ok(Some(project.clone()))
    }

    async fn create_rubric(&self, project_id: i64, req: CreateRubricRequest) -> Result<Rubric> {
        let mut state = self.state.write().await;
        if !state.projects.contains_key(&project_id) {
            return Err(ProjectFlowError::not_found(format!("项目不存在: {project_id}")));
        }
        let rubric = Rubric {
            id: state.allocate_id(),
            project_id,
            criterion: req.criterion,
            max_points: req.max_points,
            description: req.description,
        };
        state.rubrics.insert(rubric.id, rubric.clone());
        Ok(rubric)
    }

    async fn get_rubric_by_id(&self, id: i64) -> Result<Option<Rubric>> {
        Ok(self.state.read().await.rubrics.get(&id).cloned())
    }

    async fn list_rubrics_by_project(&self, project_id: i64) -> Result<Vec<Rubric>> {
        Ok(self
            .state
            .read()
            .await
            .rubrics
            .values()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn count_attempts(&self, project_id: i64, student: &str) -> Result<i64> {
        Ok(self
            .state
            .read()
            .await
            .submissions
            .values()
            .filter(|s| s.project_id == project_id && s.student == student)
            .count() as i64)
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<Submission> {
        let mut state = self.state.write().await;

        let duplicate = state.submissions.values().any(|s| {
            s.project_id == attempt.project_id
                && s.student == attempt.student
                && s.version == attempt.version
        });
        if duplicate {
            return Err(ProjectFlowError::store_unavailable(format!(
                "版本冲突: project={} student={} version={}",
                attempt.project_id, attempt.student, attempt.version
            )));
        }

        for existing in state.submissions.values_mut().filter(|s| {
            s.project_id == attempt.project_id && s.student == attempt.student
        }) {
            existing.is_latest = false;
        }

        let submission = Submission {
            id: state.allocate_id(),
            project_id: attempt.project_id,
            student: attempt.student,
            student_email: attempt.student_email,
            version: attempt.version,
            is_latest: true,
            status: SubmissionStatus::Submitted,
            manual_score: None,
            ml_score: None,
            overall_score: None,
            content: attempt.content,
            report_path: attempt.report_path,
            github_link: attempt.github_link,
            youtube_link: attempt.youtube_link,
            submitted_at: chrono::Utc::now(),
        };
        state.submissions.insert(submission.id, submission.clone());
        Ok(submission)
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        Ok(self.state.read().await.submissions.get(&id).cloned())
    }

    async fn list_student_submissions(
        &self,
        project_id: i64,
        student: &str,
    ) -> Result<Vec<Submission>> {
        let state = self.state.read().await;
        let mut items: Vec<Submission> = state
            .submissions
            .values()
            .filter(|s| s.project_id == project_id && s.student == student)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(items)
    }

    async fn list_project_submissions(
        &self,
        project_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let state = self.state.read().await;
        let matching: Vec<&Submission> = state
            .submissions
            .values()
            .rev()
            .filter(|s| s.project_id == project_id)
            .filter(|s| query.latest.is_none_or(|latest| s.is_latest == latest))
            .filter(|s| query.status.is_none_or(|status| s.status == status))
            .collect();

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .cloned()
            .collect();

        Ok(SubmissionListResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        })
    }

    async fn upsert_evaluation(&self, record: EvaluationRecord) -> Result<Evaluation> {
        let mut state = self.state.write().await;
        if !state.submissions.contains_key(&record.submission_id) {
            return Err(ProjectFlowError::not_found(format!(
                "提交不存在: {}",
                record.submission_id
            )));
        }

        let now = chrono::Utc::now();
        let key = record.key();
        let saved = match state.evaluations.get(&key).cloned() {
            Some(mut existing) => {
                existing.evaluated_by = record.evaluated_by;
                existing.points_awarded = record.points_awarded;
                existing.feedback = record.feedback;
                existing.evaluated_at = now;
                existing
            }
            None => Evaluation {
                id: state.allocate_id(),
                submission_id: record.submission_id,
                rubric_id: record.rubric_id,
                evaluated_by: record.evaluated_by,
                points_awarded: record.points_awarded,
                feedback: record.feedback,
                evaluated_at: now,
                ml_points_awarded: None,
                ml_feedback: None,
            },
        };
        state.evaluations.insert(key, saved.clone());

        if let Some(submission) = state.submissions.get_mut(&record.submission_id) {
            submission.status = submission.status.after_evaluation();
        }

        Ok(saved)
    }

    async fn list_evaluations(&self, submission_id: i64) -> Result<Vec<Evaluation>> {
        let state = self.state.read().await;
        let mut items: Vec<Evaluation> = state
            .evaluations
            .values()
            .filter(|e| e.submission_id == submission_id)
            .cloned()
            .collect();
        items.sort_by_key(|e| e.rubric_id);
        Ok(items)
    }

    async fn finalize_submission(
        &self,
        submission_id: i64,
        scores: FinalScores,
        mirrors: Vec<MlMirror>,
    ) -> Result<Submission> {
        let mut state = self.state.write().await;

        let submission = state
            .submissions
            .get_mut(&submission_id)
            .ok_or_else(|| ProjectFlowError::not_found(format!("提交不存在: {submission_id}")))?;
        submission.manual_score = Some(scores.manual_score);
        submission.ml_score = Some(scores.ml_score);
        submission.overall_score = Some(scores.overall_score);
        submission.status = SubmissionStatus::Evaluated;
        let updated = submission.clone();

        for mirror in mirrors {
            if let Some(evaluation) = state
                .evaluations
                .values_mut()
                .find(|e| e.id == mirror.evaluation_id)
            {
                evaluation.ml_points_awarded = Some(mirror.points);
                evaluation.ml_feedback = mirror.feedback;
            }
        }

        Ok(updated)
    }

    async fn list_leaderboard_rows(&self) -> Result<Vec<LeaderboardRow>> {
        let state = self.state.read().await;
        Ok(state
            .submissions
            .values()
            .filter(|s| s.is_latest)
            .filter_map(|s| {
                Some(LeaderboardRow {
                    submission_id: s.id,
                    student: s.student.clone(),
                    project_title: state.projects.get(&s.project_id)?.title.clone(),
                    overall_score: s.overall_score?,
                })
            })
            .collect())
    }
}
