use std::fs;
use std::path::Path;

use tracing::warn;

use super::catalog::{AlertType, Color};
use crate::resource::OutRequest;

/// The notification a `put` step asked for, after defaults and overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub alert_type: AlertType,
    pub color: Color,
    pub icon_url: String,
    pub message: String,
    pub text: String,
    pub suppressed: bool,
    /// Discord role ID to mention
    pub mention: Option<String>,
}

impl Alert {
    /// Resolve an alert from a request. `sources_dir` anchors `message_file`
    /// and `text_file`. Unreadable files fall back to the inline values.
    pub fn resolve(request: &OutRequest, sources_dir: &Path) -> Self {
        let params = &request.params;
        let alert_type = AlertType::parse(&params.alert_type);
        let entry = alert_type.catalog_entry();

        let color = if params.color.is_empty() {
            entry.color
        } else {
            params.color.parse::<Color>().unwrap_or_else(|e| {
                warn!(error = %e, fallback = %entry.color, "invalid color override");
                entry.color
            })
        };

        let mut message = if params.message.is_empty() {
            entry.default_message.to_string()
        } else {
            params.message.clone()
        };
        if let Some(contents) = read_override(sources_dir, &params.message_file, "message_file") {
            message = contents;
        }

        let mut text = params.text.clone();
        if let Some(contents) = read_override(sources_dir, &params.text_file, "text_file") {
            text = contents;
        }

        Self {
            alert_type,
            color,
            icon_url: entry.icon_url,
            message,
            text,
            suppressed: params.disable || request.source.disable,
            mention: Some(params.role.clone()).filter(|r| !r.is_empty()),
        }
    }
}

fn read_override(dir: &Path, file: &str, field: &str) -> Option<String> {
    if file.is_empty() {
        return None;
    }

    let path = dir.join(file);
    match fs::read_to_string(&path) {
        Ok(contents) => Some(contents.trim().to_string()),
        Err(e) => {
            warn!(
                field,
                path = %path.display(),
                error = %e,
                "could not read {}, falling back to inline value", field
            );
            None
        }
    }
}
