//! Application Services - 远端编排服务
//!
//! 自底向上:
//! - endpoint_resolver: 候选路径解析
//! - remote_api: 逻辑操作与请求体
//! - project_sync / chapter_sync: 项目与章节同步
//! - run_launcher: 任务创建与轮询
//! - fallback: 传输回退

mod chapter_sync;
mod endpoint_resolver;
mod fallback;
mod project_sync;
mod remote_api;
mod run_launcher;

pub use chapter_sync::{ChapterSyncReport, ChapterSynchronizer};
pub use endpoint_resolver::EndpointResolver;
pub use fallback::TransportFallbackCoordinator;
pub use project_sync::{project_payload, ProjectSynchronizer};
pub use remote_api::{
    operation, ChapterCreate, ChapterUpdate, CreateRun, ProjectPayload, RemoteBookApi, RouteTable,
};
pub use run_launcher::{PollPolicy, ProgressObserver, RunLauncher};
