//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod draft_store;
mod http_transport;
mod workflow_events;

pub use draft_store::{DraftStorePort, StoreError};
pub use http_transport::{ApiRequest, ApiResponse, HttpTransportPort, TransportError};
pub use workflow_events::{WorkflowEvent, WorkflowEventPort};
