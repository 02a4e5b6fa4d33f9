use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::engine::keys;

// 任务类型，决定题目展示顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub enum TaskType {
    Homework, // 作业
    Course,   // 课程练习
    Paper,    // 试卷 / 练习册
    Other,    // 其他类型，按到达顺序展示
}

impl TaskType {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => TaskType::Homework,
            2 => TaskType::Course,
            3 => TaskType::Paper,
            _ => TaskType::Other,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            TaskType::Homework => 1,
            TaskType::Course => 2,
            TaskType::Paper => 3,
            TaskType::Other => 0,
        }
    }

    /// 导出文件名后缀
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Homework => "作业报告",
            TaskType::Course => "课程练习报告",
            TaskType::Paper => "练习报告",
            TaskType::Other => "任务报告",
        }
    }
}

// 任务资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub enum ResourceType {
    Question,   // 单题
    Paper,      // 题集
    CourseNode, // 课程叶子节点
}

impl ResourceType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(ResourceType::Question),
            2 => Some(ResourceType::Paper),
            3 => Some(ResourceType::CourseNode),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ResourceType::Question => 1,
            ResourceType::Paper => 2,
            ResourceType::CourseNode => 3,
        }
    }
}

// 布置对象类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub enum GroupType {
    Class,   // 班级
    Student, // 指定学生
    Temp,    // 临时小组
}

impl GroupType {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(GroupType::Class),
            2 => Some(GroupType::Student),
            3 => Some(GroupType::Temp),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            GroupType::Class => 1,
            GroupType::Student => 2,
            GroupType::Temp => 3,
        }
    }

    /// 无法从花名册取得名称时使用的对象名
    pub fn label(self) -> &'static str {
        match self {
            GroupType::Class => "班级",
            GroupType::Student => "指定学生",
            GroupType::Temp => "临时小组",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct Task {
    // 唯一 ID
    pub id: i64,
    // 任务类型
    pub task_type: TaskType,
    // 学科 ID
    pub subject_id: i64,
    // 创建者（教师）ID
    pub creator_id: i64,
    // 任务名称
    pub name: String,
    // 任务说明
    pub comment: Option<String>,
    // 创建时间
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskResource {
    // 资源记录 ID，决定资源的挂载顺序
    pub id: i64,
    pub task_id: i64,
    // 题库中的资源 ID
    pub resource_id: String,
    pub resource_type: ResourceType,
    pub created_at: DateTime<Utc>,
}

impl TaskResource {
    pub fn resource_key(&self) -> String {
        keys::resource_key(&self.resource_id, self.resource_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskAssign {
    // 布置 ID
    pub id: i64,
    pub task_id: i64,
    pub group_type: GroupType,
    // 班级 ID / 临时小组 ID；指定学生时为 0
    pub group_id: i64,
    pub start_time: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
