//! 分数合成与定稿

use std::collections::HashMap;

use tracing::info;

use super::{NormalizedScores, ScoringEngine, round_score, rubric_key};
use crate::errors::{ProjectFlowError, Result};
use crate::integrations::EmailMessage;
use crate::models::evaluations::entities::{Evaluation, MlMirror};
use crate::models::projects::entities::Rubric;
use crate::models::submissions::{entities::FinalScores, responses::FinalizeResponse};
use crate::models::users::entities::Identity;

/// overall = manual * (1 - W) + ml * W，三个分数都保留两位小数
pub fn fuse_scores(manual: f64, ml: f64, ml_weight: f64) -> FinalScores {
    FinalScores {
        manual_score: round_score(manual),
        ml_score: round_score(ml),
        overall_score: round_score(manual * (1.0 - ml_weight) + ml * ml_weight),
    }
}

/// 评分项名称与自动评分维度匹配的评审，写入对照分数
fn ml_mirrors(
    evaluations: &[Evaluation],
    rubrics: &[Rubric],
    scores: &NormalizedScores,
) -> Vec<MlMirror> {
    let keys: HashMap<i64, String> = rubrics
        .iter()
        .map(|r| (r.id, rubric_key(&r.criterion)))
        .collect();

    evaluations
        .iter()
        .filter_map(|e| {
            let criterion = scores.criteria.get(keys.get(&e.rubric_id)?)?;
            Some(MlMirror {
                evaluation_id: e.id,
                points: round_score(criterion.score),
                feedback: criterion.feedback.clone(),
            })
        })
        .collect()
}

impl ScoringEngine {
    /// 定稿：合成人工与自动评分并写入
    ///
    /// 评分器调用失败时不写入任何数据；重复定稿会重新计算并覆盖。
    pub async fn finalize(&self, identity: &Identity, submission_id: i64) -> Result<FinalizeResponse> {
        Self::ensure_evaluator(identity, "定稿")?;

        let submission = self.load_submission(submission_id).await?;

        let evaluations = self.storage.list_evaluations(submission_id).await?;
        if evaluations.is_empty() {
            return Err(ProjectFlowError::no_evaluations(format!(
                "提交 {submission_id} 还没有任何评审"
            )));
        }
        let manual: f64 = evaluations.iter().map(|e| e.points_awarded).sum();

        let rubrics = self
            .storage
            .list_rubrics_by_project(submission.project_id)
            .await?;
        if rubrics.is_empty() {
            return Err(ProjectFlowError::no_rubrics(format!(
                "项目 {} 没有评分标准",
                submission.project_id
            )));
        }

        let text = submission.scoring_text().ok_or_else(|| {
            ProjectFlowError::missing_content(format!("提交 {submission_id} 没有可评分的正文"))
        })?;

        let normalized = self.scorer.score_submission(text, &rubrics).await?;
        let scores = fuse_scores(manual, normalized.total, self.settings.ml_weight);
        let mirrors = ml_mirrors(&evaluations, &rubrics, &normalized);

        let updated = self
            .storage
            .finalize_submission(submission_id, scores, mirrors)
            .await?;

        info!(
            "Submission {} finalized by {}: manual={} ml={} overall={}",
            submission_id,
            identity.username,
            scores.manual_score,
            scores.ml_score,
            scores.overall_score
        );

        if let Some(email) = &updated.student_email {
            let title = match self.storage.get_project_by_id(updated.project_id).await {
                Ok(Some(project)) => project.title,
                _ => format!("project #{}", updated.project_id),
            };
            self.notify(EmailMessage::results_available(
                email,
                &title,
                scores.overall_score,
            ));
        }

        Ok(FinalizeResponse {
            submission_id,
            status: updated.status,
            scores,
        })
    }
}
