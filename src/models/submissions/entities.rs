use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 提交状态
///
/// submitted --首次评审--> under_evaluation --定稿--> evaluated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatus {
    Submitted,       // 已提交
    UnderEvaluation, // 评审中
    Evaluated,       // 已定稿
}

impl SubmissionStatus {
    pub const SUBMITTED: &'static str = "submitted";
    pub const UNDER_EVALUATION: &'static str = "under_evaluation";
    pub const EVALUATED: &'static str = "evaluated";

    /// 记录一次评审后的状态：已定稿的提交保持不变
    pub fn after_evaluation(self) -> Self {
        match self {
            SubmissionStatus::Evaluated => SubmissionStatus::Evaluated,
            _ => SubmissionStatus::UnderEvaluation,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionStatus::Submitted => write!(f, "{}", SubmissionStatus::SUBMITTED),
            SubmissionStatus::UnderEvaluation => {
                write!(f, "{}", SubmissionStatus::UNDER_EVALUATION)
            }
            SubmissionStatus::Evaluated => write!(f, "{}", SubmissionStatus::EVALUATED),
        }
    }
}

impl std::str::FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            SubmissionStatus::SUBMITTED => Ok(SubmissionStatus::Submitted),
            SubmissionStatus::UNDER_EVALUATION => Ok(SubmissionStatus::UnderEvaluation),
            SubmissionStatus::EVALUATED => Ok(SubmissionStatus::Evaluated),
            _ => Err(format!("Invalid submission status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub project_id: i64,
    // 提交者用户名
    pub student: String,
    #[serde(skip_serializing)]
    pub student_email: Option<String>,
    // 第几次提交（从 1 开始）
    pub version: i32,
    // 是否为该学生在该项目下的最新提交
    pub is_latest: bool,
    pub status: SubmissionStatus,
    pub manual_score: Option<f64>,
    pub ml_score: Option<f64>,
    pub overall_score: Option<f64>,
    // 报告正文，作为自动评分输入
    pub content: Option<String>,
    pub report_path: Option<String>,
    pub github_link: Option<String>,
    pub youtube_link: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl Submission {
    /// 非空的报告正文
    pub fn scoring_text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// 写入一次新提交所需的数据（版本号由调用方计算）
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub project_id: i64,
    pub student: String,
    pub student_email: Option<String>,
    pub version: i32,
    pub content: Option<String>,
    pub report_path: Option<String>,
    pub github_link: Option<String>,
    pub youtube_link: Option<String>,
}

/// 定稿写入的分数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct FinalScores {
    pub manual_score: f64,
    pub ml_score: f64,
    pub overall_score: f64,
}
