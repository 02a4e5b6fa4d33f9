//! 配置管理
//!
//! 配置文件 + 环境变量，进程内全局只读。

mod r#impl;
mod structs;

pub use structs::*;
