//! Memory Layer - In-Memory State Management
//!
//! 实现 DraftStorePort 的内存版本

mod draft_store;

pub use draft_store::InMemoryDraftStore;
