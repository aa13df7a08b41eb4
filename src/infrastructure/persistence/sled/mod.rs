//! Sled 本地存储

mod draft_store;

pub use draft_store::{SledDraftStore, SledDraftStoreConfig, DRAFT_RECORD_VERSION};
