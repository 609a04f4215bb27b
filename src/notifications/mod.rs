//! Notifications module
//!
//! Provides:
//! - Discord webhook message model and formatting
//! - Webhook delivery with exponential backoff

mod discord;
mod dispatch;

pub use discord::*;
pub use dispatch::Dispatcher;
