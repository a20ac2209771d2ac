//! 排行榜查询

use super::{SeaOrmStorage, store_err};
use crate::entity::projects::Entity as Projects;
use crate::entity::submissions::{Column, Entity as Submissions};
use crate::errors::Result;
use crate::models::leaderboard::responses::LeaderboardRow;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

impl SeaOrmStorage {
    /// 最新且已定稿的提交，附带项目标题
    pub async fn list_leaderboard_rows_impl(&self) -> Result<Vec<LeaderboardRow>> {
        let rows = Submissions::find()
            .filter(Column::IsLatest.eq(true))
            .filter(Column::OverallScore.is_not_null())
            .order_by_asc(Column::Id)
            .find_also_related(Projects)
            .all(&self.db)
            .await
            .map_err(store_err("查询排行榜失败"))?;

        Ok(rows
            .into_iter()
            .filter_map(|(submission, project)| {
                Some(LeaderboardRow {
                    submission_id: submission.id,
                    student: submission.student,
                    project_title: project?.title,
                    overall_score: submission.overall_score?,
                })
            })
            .collect())
    }
}
