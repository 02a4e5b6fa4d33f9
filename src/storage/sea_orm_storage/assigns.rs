//! 任务布置查询

use super::{SeaOrmStorage, db_error};
use crate::entity::group_members::{Column as MemberColumn, Entity as GroupMembers};
use crate::entity::task_assign_students::{Column as AssignStudentColumn, Entity as AssignStudents};
use crate::entity::task_assigns::{Column, Entity as TaskAssigns};
use crate::entity::tasks::{Column as TaskColumn, Entity as Tasks};
use crate::errors::Result;
use crate::models::tasks::{entities::TaskAssign, requests::TaskAssignListQuery};
use sea_orm::sea_query::Query;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

impl SeaOrmStorage {
    /// 获取某个任务下的某次布置
    pub async fn get_task_assign_info_impl(
        &self,
        task_id: i64,
        assign_id: i64,
    ) -> Result<Option<TaskAssign>> {
        let result = TaskAssigns::find_by_id(assign_id)
            .filter(Column::TaskId.eq(task_id))
            .one(&self.db)
            .await
            .map_err(db_error("查询布置"))?;

        result.map(|m| m.into_task_assign()).transpose()
    }

    /// 批量获取任务的全部布置
    pub async fn get_task_assigns_by_task_ids_impl(
        &self,
        task_ids: &[i64],
    ) -> Result<Vec<TaskAssign>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = TaskAssigns::find()
            .filter(Column::TaskId.is_in(task_ids.iter().copied()))
            .order_by_desc(Column::StartTime)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(db_error("批量查询布置"))?;

        models.into_iter().map(|m| m.into_task_assign()).collect()
    }

    /// 分页列出教师已布置的任务
    ///
    /// 任务按最近一次布置的开始时间倒序，相同时按任务 ID 倒序。
    /// 返回当前页任务的全部布置和符合条件的任务总数。
    pub async fn list_task_assigns_impl(
        &self,
        query: TaskAssignListQuery,
    ) -> Result<(Vec<TaskAssign>, i64)> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut owned = Query::select()
            .column(TaskColumn::Id)
            .from(Tasks)
            .and_where(TaskColumn::CreatorId.eq(query.creator_id))
            .to_owned();

        // 学科筛选
        if let Some(subject_id) = query.subject_id {
            owned.and_where(TaskColumn::SubjectId.eq(subject_id));
        }

        // 任务类型筛选
        if let Some(task_type) = query.task_type {
            owned.and_where(TaskColumn::TaskType.eq(task_type));
        }

        // 按任务分组取最近开始时间，只有布置过的任务才会出现
        let paginator = TaskAssigns::find()
            .select_only()
            .column(Column::TaskId)
            .column_as(Column::StartTime.max(), "latest_start")
            .filter(Column::TaskId.in_subquery(owned))
            .group_by(Column::TaskId)
            .order_by_desc(Column::StartTime.max())
            .order_by_desc(Column::TaskId)
            .into_tuple::<(i64, i64)>()
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(db_error("查询任务总数"))?;

        let task_ids: Vec<i64> = paginator
            .fetch_page(page - 1)
            .await
            .map_err(db_error("查询任务列表"))?
            .into_iter()
            .map(|(task_id, _)| task_id)
            .collect();

        let assigns = self.get_task_assigns_by_task_ids_impl(&task_ids).await?;
        Ok((assigns, total as i64))
    }

    /// 布置到指定学生时的学生 ID
    pub async fn get_task_assign_students_impl(&self, assign_id: i64) -> Result<Vec<i64>> {
        AssignStudents::find()
            .select_only()
            .column(AssignStudentColumn::StudentId)
            .filter(AssignStudentColumn::AssignId.eq(assign_id))
            .order_by_asc(AssignStudentColumn::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_error("查询布置学生"))
    }

    /// 临时小组成员 ID
    pub async fn get_group_members_impl(&self, group_id: i64) -> Result<Vec<i64>> {
        GroupMembers::find()
            .select_only()
            .column(MemberColumn::StudentId)
            .filter(MemberColumn::GroupId.eq(group_id))
            .order_by_asc(MemberColumn::JoinedAt)
            .order_by_asc(MemberColumn::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(db_error("查询小组成员"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{task_assigns, tasks};
    use crate::storage::AssignStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

    async fn task(db: &DatabaseConnection, id: i64, creator_id: i64) {
        tasks::ActiveModel {
            id: Set(id),
            task_type: Set(1),
            subject_id: Set(1),
            creator_id: Set(creator_id),
            name: Set(format!("任务{id}")),
            comment: Set(None),
            created_at: Set(0),
            updated_at: Set(0),
        }
        .insert(db)
        .await
        .unwrap();
    }

    async fn assign(db: &DatabaseConnection, id: i64, task_id: i64, start_time: i64) {
        task_assigns::ActiveModel {
            id: Set(id),
            task_id: Set(task_id),
            group_type: Set(1),
            group_id: Set(100),
            start_time: Set(start_time),
            deadline: Set(None),
            created_at: Set(0),
        }
        .insert(db)
        .await
        .unwrap();
    }

    fn page(page: i64, size: i64) -> TaskAssignListQuery {
        TaskAssignListQuery {
            page: Some(page),
            size: Some(size),
            creator_id: 1,
            subject_id: None,
            task_type: None,
        }
    }

    fn task_ids(assigns: &[TaskAssign]) -> Vec<i64> {
        let mut ids: Vec<i64> = assigns.iter().map(|a| a.task_id).collect();
        ids.dedup();
        ids
    }

    #[tokio::test]
    async fn test_list_pages_by_latest_assign_start() {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        task(&db, 1, 1).await;
        task(&db, 2, 1).await;
        task(&db, 3, 1).await;
        // 其他教师的任务和未布置的任务不出现
        task(&db, 4, 2).await;
        task(&db, 5, 1).await;
        assign(&db, 10, 1, 1000).await;
        assign(&db, 11, 1, 5).await;
        assign(&db, 20, 2, 10).await;
        assign(&db, 30, 3, 10).await;
        assign(&db, 40, 4, 9999).await;
        let storage = SeaOrmStorage::from_connection(db);

        let (first, total) = storage.list_task_assigns(page(1, 1)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(task_ids(&first), vec![1]);
        // 当前页任务的全部布置都返回
        assert_eq!(first.len(), 2);

        // 开始时间相同按任务 ID 倒序
        let (second, _) = storage.list_task_assigns(page(2, 1)).await.unwrap();
        assert_eq!(task_ids(&second), vec![3]);
        let (third, _) = storage.list_task_assigns(page(3, 1)).await.unwrap();
        assert_eq!(task_ids(&third), vec![2]);
        let (beyond, _) = storage.list_task_assigns(page(4, 1)).await.unwrap();
        assert!(beyond.is_empty());
    }
}
