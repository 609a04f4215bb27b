//! Discord webhook message model and formatting

use serde::{Deserialize, Serialize};

use crate::alert::Alert;
use crate::config::BuildMetadata;

const USERNAME: &str = "Concourse";

/// Payload of a Discord webhook execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Plain text above the embeds
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

/// Rich embed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Decimal RGB
    #[serde(default)]
    pub color: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// Render an alert for a build as a webhook message. Pure and deterministic.
pub fn build_message(alert: &Alert, metadata: &BuildMetadata) -> Message {
    let embed = Embed {
        title: format!("{}{}", alert.message, alert.text),
        description: format!(
            "The execution of task `{}` in pipeline `{}` ended with status `{}`.",
            metadata.job_name, metadata.pipeline_name, alert.alert_type
        ),
        url: metadata.url.clone(),
        color: alert.color.value(),
        fields: vec![
            Field {
                name: "Step".to_string(),
                value: format!("`{}/{}`", metadata.pipeline_name, metadata.job_name),
                inline: true,
            },
            Field {
                name: "Build".to_string(),
                value: format!("`{}`", metadata.build_name),
                inline: true,
            },
        ],
    };

    Message {
        content: alert
            .mention
            .as_ref()
            .map(|role| format!("<@&{}>", role))
            .unwrap_or_default(),
        username: USERNAME.to_string(),
        avatar_url: alert.icon_url.clone(),
        tts: false,
        embeds: vec![embed],
    }
}
