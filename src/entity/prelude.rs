//! 预导入模块，方便使用

pub use super::behavior_events::{Entity as BehaviorEvents, Model as BehaviorEventModel};
pub use super::group_members::{Entity as GroupMembers, Model as GroupMemberModel};
pub use super::task_answers::{Entity as TaskAnswers, Model as TaskAnswerModel};
pub use super::task_assign_students::{
    Entity as TaskAssignStudents, Model as TaskAssignStudentModel,
};
pub use super::task_assigns::{Entity as TaskAssigns, Model as TaskAssignModel};
pub use super::task_reports::{Entity as TaskReports, Model as TaskReportModel};
pub use super::task_resources::{Entity as TaskResources, Model as TaskResourceModel};
pub use super::task_student_reports::{
    Entity as TaskStudentReports, Model as TaskStudentReportModel,
};
pub use super::tasks::{Entity as Tasks, Model as TaskModel};
