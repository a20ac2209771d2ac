use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct Project {
    // 唯一 ID
    pub id: i64,
    // 项目标题
    pub title: String,
    // 项目描述
    pub description: Option<String>,
    // 创建者（教师用户名）
    pub created_by: String,
    // 提交窗口
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    // 是否接受提交
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Project {
    /// 给定日期是否已超过截止日期
    pub fn is_past_deadline(&self, today: chrono::NaiveDate) -> bool {
        today > self.end_date
    }
}

/// 评分标准
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/project.ts")]
pub struct Rubric {
    pub id: i64,
    pub project_id: i64,
    // 评分项名称
    pub criterion: String,
    // 该项满分
    pub max_points: f64,
    pub description: Option<String>,
}
