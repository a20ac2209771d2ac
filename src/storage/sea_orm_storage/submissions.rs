//! 提交存储操作

use super::{SeaOrmStorage, store_err};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    submissions::{
        entities::{NewAttempt, Submission, SubmissionStatus},
        requests::SubmissionListQuery,
        responses::SubmissionListResponse,
    },
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::debug;

impl SeaOrmStorage {
    /// 统计提交次数（含已降级的历史版本）
    pub async fn count_attempts_impl(&self, project_id: i64, student: &str) -> Result<i64> {
        let count = Submissions::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Student.eq(student))
            .count(&self.db)
            .await
            .map_err(store_err("统计提交次数失败"))?;

        Ok(count as i64)
    }

    /// 降级旧版本并写入新版本
    ///
    /// 两步在同一事务内完成；(project_id, student, version) 唯一索引
    /// 保证跨进程并发时只有一个写入者成功。
    pub async fn insert_attempt_impl(&self, attempt: NewAttempt) -> Result<Submission> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(store_err("开启事务失败"))?;

        let demoted = Submissions::update_many()
            .col_expr(Column::IsLatest, Expr::value(false))
            .filter(Column::ProjectId.eq(attempt.project_id))
            .filter(Column::Student.eq(attempt.student.as_str()))
            .filter(Column::IsLatest.eq(true))
            .exec(&txn)
            .await
            .map_err(store_err("降级旧提交失败"))?;
        debug!(
            "Demoted {} previous attempt(s) of {} in project {}",
            demoted.rows_affected, attempt.student, attempt.project_id
        );

        let model = ActiveModel {
            project_id: Set(attempt.project_id),
            student: Set(attempt.student),
            student_email: Set(attempt.student_email),
            version: Set(attempt.version),
            is_latest: Set(true),
            status: Set(SubmissionStatus::Submitted.to_string()),
            manual_score: Set(None),
            ml_score: Set(None),
            overall_score: Set(None),
            content: Set(attempt.content),
            report_path: Set(attempt.report_path),
            github_link: Set(attempt.github_link),
            youtube_link: Set(attempt.youtube_link),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(store_err("写入提交失败"))?;

        txn.commit().await.map_err(store_err("提交事务失败"))?;

        Ok(inserted.into_submission())
    }

    pub async fn get_submission_by_id_impl(&self, id: i64) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err("查询提交失败"))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn list_student_submissions_impl(
        &self,
        project_id: i64,
        student: &str,
    ) -> Result<Vec<Submission>> {
        let submissions = Submissions::find()
            .filter(Column::ProjectId.eq(project_id))
            .filter(Column::Student.eq(student))
            .order_by_desc(Column::Version)
            .all(&self.db)
            .await
            .map_err(store_err("查询提交历史失败"))?;

        Ok(submissions
            .into_iter()
            .map(|m| m.into_submission())
            .collect())
    }

    /// 项目下的提交分页列表
    pub async fn list_project_submissions_impl(
        &self,
        project_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Submissions::find().filter(Column::ProjectId.eq(project_id));

        if let Some(latest) = query.latest {
            select = select.filter(Column::IsLatest.eq(latest));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::Id)
            .paginate(&self.db, size as u64);
        let total = paginator
            .num_items()
            .await
            .map_err(store_err("查询提交总数失败"))?;

        let submissions = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(store_err("查询提交列表失败"))?;

        Ok(SubmissionListResponse {
            items: submissions
                .into_iter()
                .map(|m| m.into_submission())
                .collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
        })
    }
}
