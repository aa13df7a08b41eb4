//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod draft_handlers;
mod generate_handler;

pub use draft_handlers::*;
pub use generate_handler::*;
