use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct RecordEvaluationRequest {
    pub rubric_id: i64,
    pub points_awarded: f64,
    pub feedback: Option<String>,
}
