use serde::Serialize;
use ts_rs::TS;

use crate::models::PaginationInfo;
use crate::models::projects::entities::Project;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct ProjectListResponse {
    pub items: Vec<Project>,
    pub pagination: PaginationInfo,
}
