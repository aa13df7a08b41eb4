//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（HttpTransport、DraftStore、WorkflowEvents）
//! - services: 远端编排服务（端点解析、同步、任务轮询、传输回退）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod services;

// Re-exports
pub use commands::{
    handlers::{
        FinalizeProfileHandler, GenerateHandler, ResetDraftHandler, ResetReport,
        UpdateProfileHandler,
    },
    FinalizeProfile, Generate, ResetDraft, UpdateProfile,
};

pub use error::{ApiError, WorkflowError};

pub use ports::{
    ApiRequest, ApiResponse, DraftStorePort, HttpTransportPort, StoreError, TransportError,
    WorkflowEvent, WorkflowEventPort,
};

pub use queries::{
    handlers::{ChapterStatus, DraftSummary, GetDraftHandler},
    GetDraft,
};

pub use services::{
    ChapterSynchronizer, EndpointResolver, PollPolicy, ProgressObserver, ProjectSynchronizer,
    RemoteBookApi, RouteTable, RunLauncher, TransportFallbackCoordinator,
};
