//! Alert resolution
//!
//! Provides:
//! - The closed set of alert types with their default color, icon and message
//! - Hex color parsing with catalog fallback
//! - Merging of `put` params and message/text files into an [`Alert`]

mod catalog;
mod resolver;

pub use catalog::{lookup, AlertType, CatalogEntry, Color, InvalidColor};
pub use resolver::Alert;
