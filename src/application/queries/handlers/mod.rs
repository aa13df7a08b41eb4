//! Query Handlers 实现

mod draft_handlers;

pub use draft_handlers::*;
