//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。
//! 报告引擎只读取这些表，写入由业务系统负责。

mod assigns;
mod behaviors;
mod stats;
mod tasks;

use crate::config::AppConfig;
use crate::errors::{ReportError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;
use tracing::info;

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        // 运行迁移
        Migrator::up(&db, None)
            .await
            .map_err(|e| ReportError::database_connection(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM 存储初始化完成，数据库: {}", db_url);

        Ok(Self { db })
    }

    /// 直接包装已有连接（测试用内存库）
    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| ReportError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| ReportError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        Database::connect(opt)
            .await
            .map_err(|e| ReportError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite://") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") || url == ":memory:" {
            Ok(format!("sqlite://{}?mode=rwc", url))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(ReportError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }
}

// 数据库错误统一视为协作方失败
fn db_error(action: &str) -> impl FnOnce(sea_orm::DbErr) -> ReportError + '_ {
    move |e| ReportError::upstream_failure(format!("{action}失败: {e}"))
}

// Storage trait 实现
use crate::models::{
    reports::entities::{
        AnswerFilter, AnswerRecord, BehaviorTally, QuestionCounter, StudentReport, TaskReport,
    },
    tasks::{
        entities::{ResourceType, Task, TaskAssign, TaskResource},
        requests::TaskAssignListQuery,
    },
};
use crate::storage::{AssignStore, BehaviorStore, StatStore, TaskStore};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
impl TaskStore for SeaOrmStorage {
    async fn get_task_by_id(&self, task_id: i64) -> Result<Option<Task>> {
        self.get_task_by_id_impl(task_id).await
    }

    async fn get_tasks_by_ids(&self, task_ids: &[i64]) -> Result<Vec<Task>> {
        self.get_tasks_by_ids_impl(task_ids).await
    }

    async fn get_latest_task(
        &self,
        creator_id: i64,
        subject_id: Option<i64>,
    ) -> Result<Option<Task>> {
        self.get_latest_task_impl(creator_id, subject_id).await
    }

    async fn get_task_resources_by_task_id(&self, task_id: i64) -> Result<Vec<TaskResource>> {
        self.get_task_resources_by_task_ids_impl(&[task_id]).await
    }

    async fn get_task_resources_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<TaskResource>> {
        self.get_task_resources_by_task_ids_impl(task_ids).await
    }
}

#[async_trait]
impl AssignStore for SeaOrmStorage {
    async fn get_task_assign_info(
        &self,
        task_id: i64,
        assign_id: i64,
    ) -> Result<Option<TaskAssign>> {
        self.get_task_assign_info_impl(task_id, assign_id).await
    }

    async fn get_task_assigns_by_task_ids(&self, task_ids: &[i64]) -> Result<Vec<TaskAssign>> {
        self.get_task_assigns_by_task_ids_impl(task_ids).await
    }

    async fn list_task_assigns(
        &self,
        query: TaskAssignListQuery,
    ) -> Result<(Vec<TaskAssign>, i64)> {
        self.list_task_assigns_impl(query).await
    }

    async fn get_task_assign_students(&self, assign_id: i64) -> Result<Vec<i64>> {
        self.get_task_assign_students_impl(assign_id).await
    }

    async fn get_assign_students(&self, group_id: i64) -> Result<Vec<i64>> {
        self.get_group_members_impl(group_id).await
    }
}

#[async_trait]
impl StatStore for SeaOrmStorage {
    async fn get_task_assigns_stats(&self, assign_ids: &[i64]) -> Result<HashMap<i64, i64>> {
        self.get_task_assigns_stats_impl(assign_ids).await
    }

    async fn get_task_reports_by_task_assign_ids(
        &self,
        assign_ids: &[i64],
    ) -> Result<Vec<TaskReport>> {
        self.get_task_reports_impl(assign_ids).await
    }

    async fn get_task_answer_accuracy_by_resource(
        &self,
        task_id: i64,
        assign_id: i64,
        resources: &[(String, ResourceType)],
    ) -> Result<Vec<QuestionCounter>> {
        self.get_answer_accuracy_impl(task_id, assign_id, resources)
            .await
    }

    async fn get_task_answer_count(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<HashMap<i64, i64>> {
        self.get_task_answer_count_impl(task_id, assign_id, student_ids)
            .await
    }

    async fn get_task_assign_student_reports(
        &self,
        task_id: i64,
        assign_id: i64,
        student_ids: &[i64],
    ) -> Result<Vec<StudentReport>> {
        self.get_student_reports_impl(task_id, assign_id, student_ids)
            .await
    }

    async fn get_task_assign_answers(
        &self,
        task_id: i64,
        assign_id: i64,
        filter: &AnswerFilter,
    ) -> Result<Vec<AnswerRecord>> {
        self.get_task_assign_answers_impl(task_id, assign_id, filter)
            .await
    }

    async fn get_task_student_answers(
        &self,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
    ) -> Result<Vec<AnswerRecord>> {
        let filter = AnswerFilter {
            student_id: Some(student_id),
            resource: None,
        };
        self.get_task_assign_answers_impl(task_id, assign_id, &filter)
            .await
    }
}

#[async_trait]
impl BehaviorStore for SeaOrmStorage {
    async fn get_behavior_tally(
        &self,
        task_id: i64,
        assign_id: i64,
        student_id: i64,
    ) -> Result<BehaviorTally> {
        self.get_behavior_tally_impl(task_id, assign_id, student_id)
            .await
    }
}
