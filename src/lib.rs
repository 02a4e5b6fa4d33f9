//! 任务报告聚合服务
//!
//! 把任务、布置、作答统计、题目内容和班级花名册合并为教师端报告视图。
//!
//! # 架构
//! - `cache`: 缓存层（Moka/Redis）
//! - `clients`: 题目内容服务和花名册服务的 HTTP 客户端
//! - `config`: 配置管理
//! - `engine`: 报告聚合引擎（按请求的分片记忆、批量取数、组装）
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: HTTP 服务层
//! - `storage`: 数据存储层（SeaORM）
//! - `utils`: 工具函数

pub mod cache;
pub mod clients;
pub mod config;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
