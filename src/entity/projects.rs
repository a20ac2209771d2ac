//! 项目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_by: String,
    pub start_date: Date,
    pub end_date: Date,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rubrics::Entity")]
    Rubrics,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::rubrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rubrics.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_project(self) -> crate::models::projects::entities::Project {
        use crate::models::projects::entities::Project;
        use chrono::{DateTime, Utc};

        Project {
            id: self.id,
            title: self.title,
            description: self.description,
            created_by: self.created_by,
            start_date: self.start_date,
            end_date: self.end_date,
            is_active: self.is_active,
            created_at: DateTime::<Utc>::from_timestamp(self.created_at, 0).unwrap_or_default(),
            updated_at: DateTime::<Utc>::from_timestamp(self.updated_at, 0).unwrap_or_default(),
        }
    }
}
