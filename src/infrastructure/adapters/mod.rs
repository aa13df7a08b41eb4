//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod api_client;
pub mod storage;

pub use api_client::*;
pub use storage::*;
