//! 评审存储操作

use super::{SeaOrmStorage, store_err};
use crate::entity::evaluations::{ActiveModel, Column, Entity as Evaluations};
use crate::entity::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions,
};
use crate::errors::{ProjectFlowError, Result};
use crate::models::{
    evaluations::entities::{Evaluation, EvaluationRecord, MlMirror},
    submissions::entities::{FinalScores, Submission, SubmissionStatus},
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 写入或覆盖评审
    ///
    /// 同一事务内推进提交状态：已定稿的提交保持 evaluated。
    pub async fn upsert_evaluation_impl(&self, record: EvaluationRecord) -> Result<Evaluation> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(store_err("开启事务失败"))?;

        let submission = Submissions::find_by_id(record.submission_id)
            .one(&txn)
            .await
            .map_err(store_err("查询提交失败"))?
            .ok_or_else(|| {
                ProjectFlowError::not_found(format!("提交不存在: {}", record.submission_id))
            })?;

        let now = chrono::Utc::now().timestamp();
        let existing = Evaluations::find()
            .filter(Column::SubmissionId.eq(record.submission_id))
            .filter(Column::RubricId.eq(record.rubric_id))
            .one(&txn)
            .await
            .map_err(store_err("查询评审失败"))?;

        let saved = match existing {
            Some(model) => {
                let mut active: ActiveModel = model.into();
                active.evaluated_by = Set(record.evaluated_by);
                active.points_awarded = Set(record.points_awarded);
                active.feedback = Set(record.feedback);
                active.evaluated_at = Set(now);
                active
                    .update(&txn)
                    .await
                    .map_err(store_err("更新评审失败"))?
            }
            None => ActiveModel {
                submission_id: Set(record.submission_id),
                rubric_id: Set(record.rubric_id),
                evaluated_by: Set(record.evaluated_by),
                points_awarded: Set(record.points_awarded),
                feedback: Set(record.feedback),
                evaluated_at: Set(now),
                ml_points_awarded: Set(None),
                ml_feedback: Set(None),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(store_err("写入评审失败"))?,
        };

        let current = submission
            .status
            .parse::<SubmissionStatus>()
            .unwrap_or(SubmissionStatus::Submitted);
        let next = current.after_evaluation();
        if next != current {
            let mut active: SubmissionActiveModel = submission.into();
            active.status = Set(next.to_string());
            active
                .update(&txn)
                .await
                .map_err(store_err("更新提交状态失败"))?;
        }

        txn.commit().await.map_err(store_err("提交事务失败"))?;

        Ok(saved.into_evaluation())
    }

    pub async fn list_evaluations_impl(&self, submission_id: i64) -> Result<Vec<Evaluation>> {
        let evaluations = Evaluations::find()
            .filter(Column::SubmissionId.eq(submission_id))
            .order_by_asc(Column::RubricId)
            .all(&self.db)
            .await
            .map_err(store_err("查询评审列表失败"))?;

        Ok(evaluations
            .into_iter()
            .map(|m| m.into_evaluation())
            .collect())
    }

    /// 定稿：分数、状态与自动评分对照一次写入
    pub async fn finalize_submission_impl(
        &self,
        submission_id: i64,
        scores: FinalScores,
        mirrors: Vec<MlMirror>,
    ) -> Result<Submission> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(store_err("开启事务失败"))?;

        let submission = Submissions::find_by_id(submission_id)
            .one(&txn)
            .await
            .map_err(store_err("查询提交失败"))?
            .ok_or_else(|| ProjectFlowError::not_found(format!("提交不存在: {submission_id}")))?;

        let mut active: SubmissionActiveModel = submission.into();
        active.manual_score = Set(Some(scores.manual_score));
        active.ml_score = Set(Some(scores.ml_score));
        active.overall_score = Set(Some(scores.overall_score));
        active.status = Set(SubmissionStatus::Evaluated.to_string());
        let updated = active
            .update(&txn)
            .await
            .map_err(store_err("写入最终分数失败"))?;

        for mirror in mirrors {
            Evaluations::update_many()
                .col_expr(Column::MlPointsAwarded, Expr::value(Some(mirror.points)))
                .col_expr(Column::MlFeedback, Expr::value(mirror.feedback))
                .filter(Column::Id.eq(mirror.evaluation_id))
                .exec(&txn)
                .await
                .map_err(store_err("写入自动评分对照失败"))?;
        }

        txn.commit().await.map_err(store_err("提交事务失败"))?;

        Ok(updated.into_submission())
    }
}
