use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/roster.ts")]
pub struct StudentInfo {
    pub id: i64,
    pub name: String,
    pub avatar: String,
}

impl StudentInfo {
    /// 只有 ID 的学生（临时小组 / 指定学生暂无姓名头像来源）
    pub fn id_only(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/roster.ts")]
pub struct ClassInfo {
    pub id: i64,
    pub name: String,
    pub students: Vec<StudentInfo>,
}
