//! Discord alert resource for Concourse
//!
//! A library and binary implementing a Concourse resource type whose `put`
//! step posts a build alert to a Discord webhook:
//! - Alert types with default colors, icons and messages
//! - `fixed`/`broke` alerts that only fire when the job's status changed
//! - Message and text overrides read from files in the build's inputs
//! - Webhook delivery with exponential backoff

pub mod alert;
pub mod config;
pub mod error;
pub mod history;
pub mod logging;
pub mod notifications;
pub mod out;
pub mod resource;
pub mod retry;
pub mod suppression;

#[cfg(test)]
mod testing;

pub use alert::{Alert, AlertType, Color};
pub use config::BuildMetadata;
pub use error::{DeliveryError, HistoryError, OutError};
pub use history::{BuildCoordinates, BuildStatusSource, ConcourseClient};
pub use notifications::{build_message, Dispatcher, Message};
pub use out::{out, OutContext};
pub use resource::{CheckResponse, InResponse, OutRequest, OutResponse};
