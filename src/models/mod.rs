pub mod common;
pub mod evaluations;
pub mod leaderboard;
pub mod projects;
pub mod submissions;
pub mod users;

pub use common::pagination::PaginationInfo;
pub use common::response::{ApiResponse, ErrorDetail};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 对外的业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/api.ts")]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    InternalServerError = 1005,
    ServiceUnavailable = 1006,

    // 项目与评分标准
    ProjectNotFound = 2001,
    RubricNotFound = 2002,
    NoRubrics = 2102,

    // 提交
    SubmissionNotFound = 3001,
    DeadlineExpired = 3002,
    AttemptLimitReached = 3003,
    MissingContent = 3004,

    // 评审与评分
    NoEvaluations = 4001,
    ScoringFailed = 4002,
}
