//! 提交实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub project_id: i64,
    pub student: String,
    pub student_email: Option<String>,
    pub version: i32,
    pub is_latest: bool,
    pub status: String,
    pub manual_score: Option<f64>,
    pub ml_score: Option<f64>,
    pub overall_score: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    pub report_path: Option<String>,
    pub github_link: Option<String>,
    pub youtube_link: Option<String>,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
    #[sea_orm(has_many = "super::evaluations::Entity")]
    Evaluations,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::models::submissions::entities::Submission {
        use crate::models::submissions::entities::{Submission, SubmissionStatus};
        use chrono::{DateTime, Utc};

        Submission {
            id: self.id,
            project_id: self.project_id,
            student: self.student,
            student_email: self.student_email,
            version: self.version,
            is_latest: self.is_latest,
            status: self
                .status
                .parse::<SubmissionStatus>()
                .unwrap_or(SubmissionStatus::Submitted),
            manual_score: self.manual_score,
            ml_score: self.ml_score,
            overall_score: self.overall_score,
            content: self.content,
            report_path: self.report_path,
            github_link: self.github_link,
            youtube_link: self.youtube_link,
            submitted_at: DateTime::<Utc>::from_timestamp(self.submitted_at, 0)
                .unwrap_or_default(),
        }
    }
}
