//! Folio - 书籍写作服务的客户端编排层
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Draft Context: 本地草稿与书籍档案
//! - Project Context: 远端项目、章节与双区元数据
//! - Run Context: 任务模式、状态机、进度与结果归一化
//!
//! 应用层 (application/):
//! - Ports: 端口定义（HttpTransport, DraftStore, WorkflowEvents）
//! - Services: 端点解析、项目/章节同步、任务轮询、传输回退
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: reqwest HTTP 传输, 导出产物落盘
//! - Persistence: Sled 草稿存储
//! - Memory: 内存草稿存储
//! - Events: broadcast 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{load_config, AppConfig};
