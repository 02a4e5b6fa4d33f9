//! 查询参数反序列化辅助
//!
//! 查询串经过 `#[serde(flatten)]` 后所有值都以字符串出现，
//! 数字和布尔字段需要同时接受原始值和字符串。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue<T> {
    Value(T),
    Text(String),
}

fn parse_text<T, E>(text: &str) -> Result<T, E>
where
    T: FromStr,
    T::Err: fmt::Display,
    E: serde::de::Error,
{
    text.trim().parse().map_err(E::custom)
}

/// 必填字段：接受原始值或可解析的字符串
pub fn string_or_value<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    match RawValue::<T>::deserialize(deserializer)? {
        RawValue::Value(value) => Ok(value),
        RawValue::Text(text) => parse_text(&text),
    }
}

/// 可选字段：空字符串视为未提供，需配合 `#[serde(default)]`
pub fn option_string_or_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: fmt::Display,
{
    match Option::<RawValue<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawValue::Value(value)) => Ok(Some(value)),
        Some(RawValue::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawValue::Text(text)) => parse_text(&text).map(Some),
    }
}
