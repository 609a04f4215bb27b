use std::collections::BTreeMap;
use std::env;

use tracing::warn;
use url::Url;

use crate::history::BuildCoordinates;

const ENV_EXTERNAL_URL: &str = "ATC_EXTERNAL_URL";
const ENV_BUILD_ID: &str = "BUILD_ID";
const ENV_TEAM_NAME: &str = "BUILD_TEAM_NAME";
const ENV_PIPELINE_NAME: &str = "BUILD_PIPELINE_NAME";
const ENV_JOB_NAME: &str = "BUILD_JOB_NAME";
const ENV_BUILD_NAME: &str = "BUILD_NAME";
const ENV_INSTANCE_VARS: &str = "BUILD_PIPELINE_INSTANCE_VARS";

/// Build metadata exposed by Concourse to `put` steps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildMetadata {
    pub host: String,
    pub id: String,
    pub team_name: String,
    pub pipeline_name: String,
    pub job_name: String,
    pub build_name: String,
    /// Encoded `vars.<key>=<json>` query, without the leading `?`
    pub instance_vars: String,
    /// Web UI link to the build
    pub url: String,
}

impl BuildMetadata {
    /// Read metadata from the process environment.
    ///
    /// A non-empty `concourse_url` replaces `ATC_EXTERNAL_URL`.
    pub fn from_env(concourse_url: &str) -> Self {
        Self::from_lookup(concourse_url, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(concourse_url: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        let host = if concourse_url.is_empty() {
            get(ENV_EXTERNAL_URL)
        } else {
            concourse_url.to_string()
        };

        let mut metadata = Self {
            host: host.trim_end_matches('/').to_string(),
            id: get(ENV_BUILD_ID),
            team_name: get(ENV_TEAM_NAME),
            pipeline_name: get(ENV_PIPELINE_NAME),
            job_name: get(ENV_JOB_NAME),
            build_name: get(ENV_BUILD_NAME),
            instance_vars: encode_instance_vars(&get(ENV_INSTANCE_VARS)),
            url: String::new(),
        };
        metadata.url = metadata.build_url();
        metadata
    }

    fn build_url(&self) -> String {
        let segments = [
            "teams",
            self.team_name.as_str(),
            "pipelines",
            self.pipeline_name.as_str(),
            "jobs",
            self.job_name.as_str(),
            "builds",
            self.build_name.as_str(),
        ];
        join_url(&self.host, &segments, &self.instance_vars)
    }

    /// Coordinates used to look up sibling builds of this job
    pub fn coordinates(&self) -> BuildCoordinates {
        BuildCoordinates {
            host: self.host.clone(),
            team: self.team_name.clone(),
            pipeline: self.pipeline_name.clone(),
            job: self.job_name.clone(),
            build_name: self.build_name.clone(),
            instance_vars: if self.instance_vars.is_empty() {
                String::new()
            } else {
                format!("?{}", self.instance_vars)
            },
        }
    }
}

/// Append percent-encoded path segments and an optional query to `base`.
///
/// Falls back to plain concatenation when `base` is not an absolute URL.
pub(crate) fn join_url(base: &str, segments: &[&str], query: &str) -> String {
    if let Ok(mut url) = Url::parse(base) {
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some(query) = query.strip_prefix('?').or(Some(query)).filter(|q| !q.is_empty()) {
            url.set_query(Some(query));
        }
        if !url.cannot_be_a_base() {
            return url.to_string();
        }
    }

    let mut joined = format!("{}/{}", base, segments.join("/"));
    let query = query.trim_start_matches('?');
    if !query.is_empty() {
        joined.push('?');
        joined.push_str(query);
    }
    joined
}

/// Turn the instance vars JSON object into `vars.<key>=<json value>` pairs.
fn encode_instance_vars(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let vars: BTreeMap<String, serde_json::Value> = match serde_json::from_str(raw) {
        Ok(vars) => vars,
        Err(e) => {
            warn!(error = %e, "ignoring unparsable {}", ENV_INSTANCE_VARS);
            return String::new();
        }
    };

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in &vars {
        query.append_pair(&format!("vars.{}", key), &value.to_string());
    }
    query.finish()
}
