//! 项目与评分标准

use tracing::info;

use super::ScoringEngine;
use crate::errors::{ProjectFlowError, Result};
use crate::models::projects::{
    entities::{Project, Rubric},
    requests::{CreateProjectRequest, CreateRubricRequest, ProjectListQuery, UpdateProjectRequest},
    responses::ProjectListResponse,
};
use crate::models::users::entities::Identity;

impl ScoringEngine {
    pub async fn create_project(
        &self,
        identity: &Identity,
        mut req: CreateProjectRequest,
    ) -> Result<Project> {
        Self::ensure_evaluator(identity, "创建项目")?;

        req.title = req.title.trim().to_string();
        if req.title.is_empty() {
            return Err(ProjectFlowError::validation_failed("项目标题不能为空"));
        }
        if req.end_date < req.start_date {
            return Err(ProjectFlowError::validation_failed(format!(
                "截止日期 {} 早于开始日期 {}",
                req.end_date, req.start_date
            )));
        }

        let project = self.storage.create_project(&identity.username, req).await?;
        info!("Project {} ({}) created by {}", project.id, project.title, identity.username);
        Ok(project)
    }

    pub async fn get_project(&self, project_id: i64) -> Result<Project> {
        self.load_project(project_id).await
    }

    pub async fn list_projects(&self, query: ProjectListQuery) -> Result<ProjectListResponse> {
        self.storage.list_projects(query).await
    }

    /// 修改项目，仅项目创建者或管理员
    ///
    /// 日期按合并后的值重新校验。
    pub async fn update_project(
        &self,
        identity: &Identity,
        project_id: i64,
        mut req: UpdateProjectRequest,
    ) -> Result<Project> {
        Self::ensure_evaluator(identity, "修改项目")?;

        let project = self.load_project(project_id).await?;
        if !identity.is_admin() && project.created_by != identity.username {
            return Err(ProjectFlowError::forbidden("只有项目创建者可以修改项目"));
        }

        if let Some(title) = req.title.as_mut() {
            *title = title.trim().to_string();
            if title.is_empty() {
                return Err(ProjectFlowError::validation_failed("项目标题不能为空"));
            }
        }
        let start_date = req.start_date.unwrap_or(project.start_date);
        let end_date = req.end_date.unwrap_or(project.end_date);
        if end_date < start_date {
            return Err(ProjectFlowError::validation_failed(format!(
                "截止日期 {end_date} 早于开始日期 {start_date}"
            )));
        }

        let updated = self
            .storage
            .update_project(project_id, req)
            .await?
            .ok_or_else(|| ProjectFlowError::not_found(format!("项目不存在: {project_id}")))?;
        info!("Project {} updated by {}", project_id, identity.username);
        Ok(updated)
    }

    /// 添加评分标准，仅项目创建者或管理员
    pub async fn create_rubric(
        &self,
        identity: &Identity,
        project_id: i64,
        mut req: CreateRubricRequest,
    ) -> Result<Rubric> {
        Self::ensure_evaluator(identity, "添加评分标准")?;

        let project = self.load_project(project_id).await?;
        if !identity.is_admin() && project.created_by != identity.username {
            return Err(ProjectFlowError::forbidden("只有项目创建者可以添加评分标准"));
        }

        req.criterion = req.criterion.trim().to_string();
        if req.criterion.is_empty() {
            return Err(ProjectFlowError::validation_failed("评分项名称不能为空"));
        }
        if !req.max_points.is_finite() || req.max_points <= 0.0 {
            return Err(ProjectFlowError::validation_failed(format!(
                "满分必须为正数: {}",
                req.max_points
            )));
        }

        let rubric = self.storage.create_rubric(project_id, req).await?;
        info!(
            "Rubric '{}' ({} pts) added to project {}",
            rubric.criterion, rubric.max_points, project_id
        );
        Ok(rubric)
    }

    pub async fn list_rubrics(&self, project_id: i64) -> Result<Vec<Rubric>> {
        self.load_project(project_id).await?;
        self.storage.list_rubrics_by_project(project_id).await
    }
}
