//! Concourse resource protocol types
//!
//! Concourse talks to a resource over stdin/stdout with JSON documents.
//! Only `out` does real work here; `check` and `in` answer with static values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version reported for every `in`/`out` call. The resource has no history.
pub const STATIC_VERSION: (&str, &str) = ("ver", "static");

/// Resource `source` configuration, shared by every step of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Source {
    /// Discord webhook URL
    #[serde(default)]
    pub url: String,
    /// Basic-auth credentials for the Concourse API (fixed/broke only)
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Overrides `ATC_EXTERNAL_URL`
    #[serde(default)]
    pub concourse_url: String,
    #[serde(default)]
    pub disable: bool,
}

/// `put` step parameters
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OutParams {
    #[serde(default)]
    pub alert_type: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub message: String,
    /// Path relative to the sources directory
    #[serde(default)]
    pub message_file: String,
    #[serde(default)]
    pub text: String,
    /// Path relative to the sources directory
    #[serde(default)]
    pub text_file: String,
    #[serde(default)]
    pub disable: bool,
    /// Discord role ID to mention
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OutRequest {
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub params: OutParams,
}

impl OutRequest {
    pub fn from_reader<R: std::io::Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

pub type Version = BTreeMap<String, String>;

fn static_version() -> Version {
    let (key, value) = STATIC_VERSION;
    Version::from([(key.to_string(), value.to_string())])
}

/// Key/value pair shown in the Concourse UI next to the step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Metadata {
    pub name: String,
    pub value: String,
}

impl Metadata {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Output of `out`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutResponse {
    pub version: Version,
    pub metadata: Vec<Metadata>,
}

impl OutResponse {
    pub fn new(alert_type: &str, alerted: bool) -> Self {
        Self {
            version: static_version(),
            metadata: vec![
                Metadata::new("type", alert_type),
                Metadata::new("alerted", alerted.to_string()),
            ],
        }
    }
}

/// Output of `in`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InResponse {
    pub version: Version,
    pub metadata: Vec<Metadata>,
}

impl Default for InResponse {
    fn default() -> Self {
        Self {
            version: static_version(),
            metadata: Vec::new(),
        }
    }
}

/// Output of `check`: never any versions
pub type CheckResponse = Vec<Version>;
