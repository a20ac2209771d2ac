use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 排行榜原始行（只含最新且已定稿的提交）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub submission_id: i64,
    pub student: String,
    pub project_title: String,
    pub overall_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/leaderboard.ts")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub student: String,
    pub project_title: String,
    pub overall_score: f64,
    pub submission_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/leaderboard.ts")]
pub struct LeaderboardResponse {
    pub items: Vec<LeaderboardEntry>,
    // 本次结果的计算时间（缓存期内不会变化）
    pub computed_at: chrono::DateTime<chrono::Utc>,
}
