//! 项目存储操作

use super::{SeaOrmStorage, store_err};
use crate::entity::projects::{ActiveModel, Column, Entity as Projects};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    projects::{
        entities::Project,
        requests::{CreateProjectRequest, ProjectListQuery, UpdateProjectRequest},
        responses::ProjectListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建项目
    pub async fn create_project_impl(
        &self,
        created_by: &str,
        req: CreateProjectRequest,
    ) -> Result<Project> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title),
            description: Set(req.description),
            created_by: Set(created_by.to_string()),
            start_date: Set(req.start_date),
            end_date: Set(req.end_date),
            is_active: Set(req.is_active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(store_err("创建项目失败"))?;

        Ok(result.into_project())
    }

    /// 通过 ID 获取项目
    pub async fn get_project_by_id_impl(&self, id: i64) -> Result<Option<Project>> {
        let result = Projects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err("查询项目失败"))?;

        Ok(result.map(|m| m.into_project()))
    }

    /// 分页列出项目
    pub async fn list_projects_impl(&self, query: ProjectListQuery) -> Result<ProjectListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Projects::find();

        if let Some(active) = query.active {
            select = select.filter(Column::IsActive.eq(active));
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size as u64);
        let total = paginator
            .num_items()
            .await
            .map_err(store_err("查询项目总数失败"))?;

        let projects = paginator
            .fetch_page((page - 1) as u64)
            .await
            .map_err(store_err("查询项目列表失败"))?;

        Ok(ProjectListResponse {
            items: projects.into_iter().map(|m| m.into_project()).collect(),
            pagination: PaginationInfo::new(page, size, total as i64),
        })
    }

    /// 更新项目，只写入提供的字段
    pub async fn update_project_impl(
        &self,
        id: i64,
        update: UpdateProjectRequest,
    ) -> Result<Option<Project>> {
        let Some(existing) = Projects::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_err("查询项目失败"))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }
        if let Some(start_date) = update.start_date {
            model.start_date = Set(start_date);
        }
        if let Some(end_date) = update.end_date {
            model.end_date = Set(end_date);
        }
        if let Some(is_active) = update.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(store_err("更新项目失败"))?;

        Ok(Some(updated.into_project()))
    }
}
