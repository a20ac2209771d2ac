//! 评分标准实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "rubrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub project_id: i64,
    pub criterion: String,
    pub max_points: f64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
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
    pub fn into_rubric(self) -> crate::models::projects::entities::Rubric {
        crate::models::projects::entities::Rubric {
            id: self.id,
            project_id: self.project_id,
            criterion: self.criterion,
            max_points: self.max_points,
            description: self.description,
        }
    }
}
