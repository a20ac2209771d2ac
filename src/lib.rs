//! ProjectFlow - 学术项目提交评审与评分服务
//!
//! 基于 Actix Web 构建，负责多次提交的版本管理、人工评审、自动评分、
//! 分数合成与排行榜。
//!
//! # 架构
//! - `cache`: 缓存层（Moka/Redis）
//! - `config`: 配置管理
//! - `engine`: 评审与评分引擎
//! - `entity`: SeaORM 数据库实体
//! - `errors`: 统一错误处理
//! - `integrations`: 外部协作方（评分器、正文提取、邮件）
//! - `middlewares`: 认证授权中间件
//! - `models`: 数据模型定义
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: HTTP 业务处理层
//! - `storage`: 数据存储层（SeaORM / 内存）
//! - `utils`: 工具函数

pub mod cache;
pub mod config;
pub mod engine;
pub mod entity;
pub mod errors;
pub mod integrations;
pub mod middlewares;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;
