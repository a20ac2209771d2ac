use serde::Serialize;
use ts_rs::TS;

use crate::models::PaginationInfo;
use crate::models::submissions::entities::{FinalScores, Submission, SubmissionStatus};

/// 提交历史
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionHistoryResponse {
    pub project_id: i64,
    pub attempts_used: i64,
    pub attempts_allowed: i64,
    pub items: Vec<Submission>,
}

/// 项目下的提交列表（分页）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListResponse {
    pub items: Vec<Submission>,
    pub pagination: PaginationInfo,
}

/// 定稿结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct FinalizeResponse {
    pub submission_id: i64,
    pub status: SubmissionStatus,
    #[serde(flatten)]
    pub scores: FinalScores,
}
