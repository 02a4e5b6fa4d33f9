//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层只读这些表，然后转换为 models 中的业务实体。

pub mod prelude;

pub mod behavior_events;
pub mod group_members;
pub mod task_answers;
pub mod task_assign_students;
pub mod task_assigns;
pub mod task_reports;
pub mod task_resources;
pub mod task_student_reports;
pub mod tasks;
