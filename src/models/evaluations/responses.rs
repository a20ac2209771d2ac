use serde::Serialize;
use ts_rs::TS;

/// 评审明细（附带评分标准信息）
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationDetail {
    pub id: i64,
    pub submission_id: i64,
    pub rubric_id: i64,
    pub criterion: String,
    pub max_points: f64,
    pub evaluated_by: String,
    pub points_awarded: f64,
    pub feedback: Option<String>,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
    pub ml_points_awarded: Option<f64>,
    pub ml_feedback: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationListResponse {
    pub submission_id: i64,
    pub items: Vec<EvaluationDetail>,
    // 当前人工总分
    pub manual_total: f64,
}
