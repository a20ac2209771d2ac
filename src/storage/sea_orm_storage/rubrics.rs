//! 评分标准存储操作

use super::{SeaOrmStorage, store_err};
use crate::entity::rubrics::{ActiveModel, Column, Entity as Rubrics};
use crate::errors::Result;
use crate::models::projects::{entities::Rubric, requests::CreateRubricRequest};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    pub async fn create_rubric_impl(
        &self,
        project_id: i64,
        req: CreateRubricRequest,
    ) -> Result<Rubric> {
        let model = ActiveModel {
            project_id: Set(project_id),
            criterion: Set(req.criterion),
            max_points: Set(req.max_points),
            description: Set(req.description),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(store_err("创建评分标准失败"))?;

        Ok(result.into_rubric())
    }

    pub async fn get_rubric_by_id_impl(&self, id: i64) -> Result<Option<Rubric>> {
        let result = Rubrics::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err("查询评分标准失败"))?;

        Ok(result.map(|m| m.into_rubric()))
    }

    pub async fn list_rubrics_by_project_impl(&self, project_id: i64) -> Result<Vec<Rubric>> {
        let rubrics = Rubrics::find()
            .filter(Column::ProjectId.eq(project_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(store_err("查询评分标准列表失败"))?;

        Ok(rubrics.into_iter().map(|m| m.into_rubric()).collect())
    }
}
