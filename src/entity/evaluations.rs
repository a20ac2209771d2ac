//! 评审实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub submission_id: i64,
    pub rubric_id: i64,
    pub evaluated_by: String,
    pub points_awarded: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub evaluated_at: i64,
    pub ml_points_awarded: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub ml_feedback: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::submissions::Entity",
        from = "Column::SubmissionId",
        to = "super::submissions::Column::Id"
    )]
    Submission,
    #[sea_orm(
        belongs_to = "super::rubrics::Entity",
        from = "Column::RubricId",
        to = "super::rubrics::Column::Id"
    )]
    Rubric,
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl Related<super::rubrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rubric.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_evaluation(self) -> crate::models::evaluations::entities::Evaluation {
        use chrono::{DateTime, Utc};

        crate::models::evaluations::entities::Evaluation {
            id: self.id,
            submission_id: self.submission_id,
            rubric_id: self.rubric_id,
            evaluated_by: self.evaluated_by,
            points_awarded: self.points_awarded,
            feedback: self.feedback,
            evaluated_at: DateTime::<Utc>::from_timestamp(self.evaluated_at, 0)
                .unwrap_or_default(),
            ml_points_awarded: self.ml_points_awarded,
            ml_feedback: self.ml_feedback,
        }
    }
}
