use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建项目表
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Projects::Title).string().not_null())
                    .col(ColumnDef::new(Projects::Description).text().null())
                    .col(ColumnDef::new(Projects::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Projects::StartDate).date().not_null())
                    .col(ColumnDef::new(Projects::EndDate).date().not_null())
                    .col(
                        ColumnDef::new(Projects::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Projects::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Projects::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建评分标准表
        manager
            .create_table(
                Table::create()
                    .table(Rubrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rubrics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rubrics::ProjectId).big_integer().not_null())
                    .col(ColumnDef::new(Rubrics::Criterion).string().not_null())
                    .col(ColumnDef::new(Rubrics::MaxPoints).double().not_null())
                    .col(ColumnDef::new(Rubrics::Description).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Rubrics::Table, Rubrics::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建提交表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Submissions::ProjectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::Student).string().not_null())
                    .col(ColumnDef::new(Submissions::StudentEmail).string().null())
                    .col(ColumnDef::new(Submissions::Version).integer().not_null())
                    .col(
                        ColumnDef::new(Submissions::IsLatest)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Submissions::Status).string().not_null())
                    .col(ColumnDef::new(Submissions::ManualScore).double().null())
                    .col(ColumnDef::new(Submissions::MlScore).double().null())
                    .col(ColumnDef::new(Submissions::OverallScore).double().null())
                    .col(ColumnDef::new(Submissions::Content).text().null())
                    .col(ColumnDef::new(Submissions::ReportPath).string().null())
                    .col(ColumnDef::new(Submissions::GithubLink).string().null())
                    .col(ColumnDef::new(Submissions::YoutubeLink).string().null())
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一学生同一项目的版本号唯一，作为并发提交的乐观锁
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_project_student_version")
                    .table(Submissions::Table)
                    .col(Submissions::ProjectId)
                    .col(Submissions::Student)
                    .col(Submissions::Version)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // 排行榜查询
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_is_latest")
                    .table(Submissions::Table)
                    .col(Submissions::IsLatest)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // 创建评审表
        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Evaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::SubmissionId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::RubricId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Evaluations::EvaluatedBy).string().not_null())
                    .col(
                        ColumnDef::new(Evaluations::PointsAwarded)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Evaluations::Feedback).text().null())
                    .col(
                        ColumnDef::new(Evaluations::EvaluatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::MlPointsAwarded)
                            .double()
                            .null(),
                    )
                    .col(ColumnDef::new(Evaluations::MlFeedback).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Evaluations::Table, Evaluations::SubmissionId)
                            .to(Submissions::Table, Submissions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Evaluations::Table, Evaluations::RubricId)
                            .to(Rubrics::Table, Rubrics::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个提交的每条评分标准只保留一条评审
        manager
            .create_index(
                Index::create()
                    .name("idx_evaluations_submission_rubric")
                    .table(Evaluations::Table)
                    .col(Evaluations::SubmissionId)
                    .col(Evaluations::RubricId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Rubrics::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Projects {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    Title,
    Description,
    CreatedBy,
    StartDate,
    EndDate,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Rubrics {
    #[sea_orm(iden = "rubrics")]
    Table,
    Id,
    ProjectId,
    Criterion,
    MaxPoints,
    Description,
}

#[derive(DeriveIden)]
enum Submissions {
    #[sea_orm(iden = "submissions")]
    Table,
    Id,
    ProjectId,
    Student,
    StudentEmail,
    Version,
    IsLatest,
    Status,
    ManualScore,
    MlScore,
    OverallScore,
    Content,
    ReportPath,
    GithubLink,
    YoutubeLink,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum Evaluations {
    #[sea_orm(iden = "evaluations")]
    Table,
    Id,
    SubmissionId,
    RubricId,
    EvaluatedBy,
    PointsAwarded,
    Feedback,
    EvaluatedAt,
    MlPointsAwarded,
    MlFeedback,
}
