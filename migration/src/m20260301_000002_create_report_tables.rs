use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_task_tables::{TaskAssigns, Tasks};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 布置维度的预计算统计
        manager
            .create_table(
                Table::create()
                    .table(TaskReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskReports::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskReports::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TaskReports::AssignId).big_integer().not_null())
                    .col(
                        ColumnDef::new(TaskReports::StudentCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TaskReports::FinishedCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TaskReports::CompletionRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(TaskReports::AccuracyRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(TaskReports::AvgTime)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TaskReports::AttentionCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TaskReports::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskReports::Table, TaskReports::AssignId)
                            .to(TaskAssigns::Table, TaskAssigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 学生维度的预计算统计
        manager
            .create_table(
                Table::create()
                    .table(TaskStudentReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskStudentReports::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::TaskId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::AssignId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::AnswerCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::CorrectCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::IncorrectCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::TotalTime)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::AccuracyRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::CompletionRate)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(TaskStudentReports::FinishedAt)
                            .big_integer()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 作答记录
        manager
            .create_table(
                Table::create()
                    .table(TaskAnswers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskAnswers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskAnswers::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TaskAnswers::AssignId).big_integer().not_null())
                    .col(ColumnDef::new(TaskAnswers::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(TaskAnswers::ResourceId).string().not_null())
                    .col(ColumnDef::new(TaskAnswers::ResourceType).integer().not_null())
                    .col(ColumnDef::new(TaskAnswers::QuestionId).string().not_null())
                    .col(ColumnDef::new(TaskAnswers::Answer).text().not_null())
                    .col(ColumnDef::new(TaskAnswers::Correct).boolean().not_null())
                    .col(
                        ColumnDef::new(TaskAnswers::CostTime)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(TaskAnswers::AnsweredAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAnswers::Table, TaskAnswers::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 课堂行为事件（表扬 / 提醒关注）
        manager
            .create_table(
                Table::create()
                    .table(BehaviorEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BehaviorEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BehaviorEvents::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(BehaviorEvents::AssignId).big_integer().not_null())
                    .col(ColumnDef::new(BehaviorEvents::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(BehaviorEvents::Kind).string().not_null())
                    .col(ColumnDef::new(BehaviorEvents::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_reports_assign_id")
                    .table(TaskReports::Table)
                    .col(TaskReports::AssignId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_student_reports_assign_student")
                    .table(TaskStudentReports::Table)
                    .col(TaskStudentReports::AssignId)
                    .col(TaskStudentReports::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_answers_task_assign")
                    .table(TaskAnswers::Table)
                    .col(TaskAnswers::TaskId)
                    .col(TaskAnswers::AssignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_answers_student_id")
                    .table(TaskAnswers::Table)
                    .col(TaskAnswers::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_behavior_events_assign_student")
                    .table(BehaviorEvents::Table)
                    .col(BehaviorEvents::AssignId)
                    .col(BehaviorEvents::StudentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BehaviorEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskAnswers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskStudentReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskReports::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum TaskReports {
    #[sea_orm(iden = "task_reports")]
    Table,
    Id,
    TaskId,
    AssignId,
    StudentCount,
    FinishedCount,
    CompletionRate,
    AccuracyRate,
    AvgTime,
    AttentionCount,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaskStudentReports {
    #[sea_orm(iden = "task_student_reports")]
    Table,
    Id,
    TaskId,
    AssignId,
    StudentId,
    AnswerCount,
    CorrectCount,
    IncorrectCount,
    TotalTime,
    AccuracyRate,
    CompletionRate,
    FinishedAt,
}

#[derive(DeriveIden)]
enum TaskAnswers {
    #[sea_orm(iden = "task_answers")]
    Table,
    Id,
    TaskId,
    AssignId,
    StudentId,
    ResourceId,
    ResourceType,
    QuestionId,
    Answer,
    Correct,
    CostTime,
    AnsweredAt,
}

#[derive(DeriveIden)]
enum BehaviorEvents {
    #[sea_orm(iden = "behavior_events")]
    Table,
    Id,
    TaskId,
    AssignId,
    StudentId,
    Kind,
    CreatedAt,
}
