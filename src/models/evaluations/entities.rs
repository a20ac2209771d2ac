use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 一条评审：某位评审人对某个提交的某条评分标准的打分
///
/// 以 (submission_id, rubric_id) 为自然键，重复评审覆盖旧记录。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct Evaluation {
    pub id: i64,
    pub submission_id: i64,
    pub rubric_id: i64,
    pub evaluated_by: String,
    pub points_awarded: f64,
    pub feedback: Option<String>,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
    // 自动评分的对照值，仅用于审计
    pub ml_points_awarded: Option<f64>,
    pub ml_feedback: Option<String>,
}

impl Evaluation {
    pub fn key(&self) -> EvaluationKey {
        EvaluationKey {
            submission_id: self.submission_id,
            rubric_id: self.rubric_id,
        }
    }
}

/// 评审的自然键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvaluationKey {
    pub submission_id: i64,
    pub rubric_id: i64,
}

/// 写入一次评审
#[derive(Debug, Clone)]
pub struct EvaluationRecord {
    pub submission_id: i64,
    pub rubric_id: i64,
    pub evaluated_by: String,
    pub points_awarded: f64,
    pub feedback: Option<String>,
}

impl EvaluationRecord {
    pub fn key(&self) -> EvaluationKey {
        EvaluationKey {
            submission_id: self.submission_id,
            rubric_id: self.rubric_id,
        }
    }
}

/// 定稿时回写到评审上的自动评分对照
#[derive(Debug, Clone, PartialEq)]
pub struct MlMirror {
    pub evaluation_id: i64,
    pub points: f64,
    pub feedback: Option<String>,
}
