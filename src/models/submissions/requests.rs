use serde::Deserialize;
use ts_rs::TS;

use crate::models::submissions::entities::SubmissionStatus;

/// 创建提交请求
///
/// `report_path` 指向已上传的报告文件，未提供 `content` 时服务端会从中提取正文。
/// 正文可以为空，但空正文的提交无法定稿。
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct CreateSubmissionRequest {
    pub content: Option<String>,
    pub report_path: Option<String>,
    pub github_link: Option<String>,
    pub youtube_link: Option<String>,
}

/// 教师查看项目提交列表的查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    // 只看每个学生的最新提交
    pub latest: Option<bool>,
    pub status: Option<SubmissionStatus>,
}
