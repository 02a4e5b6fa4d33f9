//! 资源键 / 题目键
//!
//! 不同协作方的数据只靠这两个组合键关联，所有构造和解析都必须经过这里。
//! 题库 ID 中不会出现分隔符。

use crate::models::tasks::entities::ResourceType;

pub const KEY_SEPARATOR: char = '#';

/// `{resource_id}#{resource_type}`
pub fn resource_key(resource_id: &str, resource_type: ResourceType) -> String {
    format!("{resource_id}{KEY_SEPARATOR}{}", resource_type.code())
}

/// `{resource_key}#{question_id}`
pub fn question_key(resource_key: &str, question_id: &str) -> String {
    format!("{resource_key}{KEY_SEPARATOR}{question_id}")
}

pub fn question_key_of(resource_id: &str, resource_type: ResourceType, question_id: &str) -> String {
    question_key(&resource_key(resource_id, resource_type), question_id)
}

pub fn parse_resource_key(key: &str) -> Option<(String, ResourceType)> {
    let (resource_id, code) = key.rsplit_once(KEY_SEPARATOR)?;
    let resource_type = ResourceType::from_code(code.parse().ok()?)?;
    if resource_id.is_empty() {
        return None;
    }
    Some((resource_id.to_string(), resource_type))
}

/// 返回 (resource_key, question_id)
pub fn parse_question_key(key: &str) -> Option<(String, String)> {
    let (resource_key, question_id) = key.rsplit_once(KEY_SEPARATOR)?;
    parse_resource_key(resource_key)?;
    if question_id.is_empty() {
        return None;
    }
    Some((resource_key.to_string(), question_id.to_string()))
}
