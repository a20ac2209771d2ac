//! 人工评审的记录与汇总

use std::collections::HashMap;

use tracing::info;

use super::{ScoringEngine, round_score};
use crate::errors::{ProjectFlowError, Result};
use crate::models::evaluations::{
    entities::{Evaluation, EvaluationRecord},
    requests::RecordEvaluationRequest,
    responses::{EvaluationDetail, EvaluationListResponse},
};
use crate::models::users::entities::Identity;

impl ScoringEngine {
    /// 记录或覆盖一条评审
    ///
    /// 以 (submission, rubric) 为键，后写入者覆盖先写入者。
    pub async fn record_evaluation(
        &self,
        identity: &Identity,
        submission_id: i64,
        req: RecordEvaluationRequest,
    ) -> Result<Evaluation> {
        Self::ensure_evaluator(identity, "评审提交")?;

        if !req.points_awarded.is_finite() || req.points_awarded < 0.0 {
            return Err(ProjectFlowError::validation_failed(format!(
                "评分必须是非负数: {}",
                req.points_awarded
            )));
        }

        let submission = self.load_submission(submission_id).await?;
        let rubric = self
            .storage
            .get_rubric_by_id(req.rubric_id)
            .await?
            .ok_or_else(|| {
                ProjectFlowError::rubric_not_found(format!("评分标准不存在: {}", req.rubric_id))
            })?;
        if rubric.project_id != submission.project_id {
            return Err(ProjectFlowError::validation_failed(format!(
                "评分标准 {} 不属于项目 {}",
                rubric.id, submission.project_id
            )));
        }

        let evaluation = self
            .storage
            .upsert_evaluation(EvaluationRecord {
                submission_id,
                rubric_id: rubric.id,
                evaluated_by: identity.username.clone(),
                points_awarded: req.points_awarded,
                feedback: req.feedback,
            })
            .await?;

        info!(
            "{} evaluated submission {} on '{}': {} / {}",
            identity.username, submission_id, rubric.criterion, evaluation.points_awarded, rubric.max_points
        );
        Ok(evaluation)
    }

    /// 列出提交的全部评审，附带评分标准信息
    pub async fn list_evaluations(
        &self,
        identity: &Identity,
        submission_id: i64,
    ) -> Result<EvaluationListResponse> {
        let submission = self.load_submission(submission_id).await?;
        Self::ensure_can_view(identity, &submission)?;

        let rubrics: HashMap<i64, _> = self
            .storage
            .list_rubrics_by_project(submission.project_id)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();
        let evaluations = self.storage.list_evaluations(submission_id).await?;

        let manual_total = round_score(evaluations.iter().map(|e| e.points_awarded).sum());
        let items = evaluations
            .into_iter()
            .filter_map(|e| {
                let rubric = rubrics.get(&e.rubric_id)?;
                Some(EvaluationDetail {
                    id: e.id,
                    submission_id: e.submission_id,
                    rubric_id: e.rubric_id,
                    criterion: rubric.criterion.clone(),
                    max_points: rubric.max_points,
                    evaluated_by: e.evaluated_by,
                    points_awarded: e.points_awarded,
                    feedback: e.feedback,
                    evaluated_at: e.evaluated_at,
                    ml_points_awarded: e.ml_points_awarded,
                    ml_feedback: e.ml_feedback,
                })
            })
            .collect();

        Ok(EvaluationListResponse {
            submission_id,
            items,
            manual_total,
        })
    }
}
