use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建任务表
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::TaskType).integer().not_null())
                    .col(ColumnDef::new(Tasks::SubjectId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::CreatorId).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::Name).string().not_null())
                    .col(ColumnDef::new(Tasks::Comment).text().null())
                    .col(ColumnDef::new(Tasks::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建任务资源表
        manager
            .create_table(
                Table::create()
                    .table(TaskResources::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskResources::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskResources::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TaskResources::ResourceId).string().not_null())
                    .col(ColumnDef::new(TaskResources::ResourceType).integer().not_null())
                    .col(ColumnDef::new(TaskResources::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskResources::Table, TaskResources::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建任务布置表
        manager
            .create_table(
                Table::create()
                    .table(TaskAssigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskAssigns::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TaskAssigns::TaskId).big_integer().not_null())
                    .col(ColumnDef::new(TaskAssigns::GroupType).integer().not_null())
                    .col(ColumnDef::new(TaskAssigns::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(TaskAssigns::StartTime).big_integer().not_null())
                    .col(ColumnDef::new(TaskAssigns::Deadline).big_integer().null())
                    .col(ColumnDef::new(TaskAssigns::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAssigns::Table, TaskAssigns::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 布置到指定学生时的学生列表
        manager
            .create_table(
                Table::create()
                    .table(TaskAssignStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TaskAssignStudents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TaskAssignStudents::AssignId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TaskAssignStudents::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TaskAssignStudents::Table, TaskAssignStudents::AssignId)
                            .to(TaskAssigns::Table, TaskAssigns::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 临时小组成员表
        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupMembers::GroupId).big_integer().not_null())
                    .col(ColumnDef::new(GroupMembers::StudentId).big_integer().not_null())
                    .col(ColumnDef::new(GroupMembers::JoinedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_creator_id")
                    .table(Tasks::Table)
                    .col(Tasks::CreatorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_resources_task_id")
                    .table(TaskResources::Table)
                    .col(TaskResources::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_assigns_task_id")
                    .table(TaskAssigns::Table)
                    .col(TaskAssigns::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_task_assign_students_assign_id")
                    .table(TaskAssignStudents::Table)
                    .col(TaskAssignStudents::AssignId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_group_members_group_id")
                    .table(GroupMembers::Table)
                    .col(GroupMembers::GroupId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskAssignStudents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskAssigns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskResources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Tasks {
    #[sea_orm(iden = "tasks")]
    Table,
    Id,
    TaskType,
    SubjectId,
    CreatorId,
    Name,
    Comment,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TaskResources {
    #[sea_orm(iden = "task_resources")]
    Table,
    Id,
    TaskId,
    ResourceId,
    ResourceType,
    CreatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum TaskAssigns {
    #[sea_orm(iden = "task_assigns")]
    Table,
    Id,
    TaskId,
    GroupType,
    GroupId,
    StartTime,
    Deadline,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TaskAssignStudents {
    #[sea_orm(iden = "task_assign_students")]
    Table,
    Id,
    AssignId,
    StudentId,
}

#[derive(DeriveIden)]
enum GroupMembers {
    #[sea_orm(iden = "group_members")]
    Table,
    Id,
    GroupId,
    StudentId,
    JoinedAt,
}
