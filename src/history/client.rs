//! Concourse API client for build status lookups

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{BuildCoordinates, BuildStatusSource};
use crate::config::join_url;
use crate::error::HistoryError;

/// Upper bound for one build lookup; the lookup is not retried.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Queries `GET /api/v1/teams/.../builds/<name>` with basic auth.
pub struct ConcourseClient {
    client: reqwest::Client,
    username: String,
    password: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct Build {
    status: String,
}

impl ConcourseClient {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            username: username.to_string(),
            password: password.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    fn build_url(coords: &BuildCoordinates, build_name: &str) -> String {
        let segments = [
            "api",
            "v1",
            "teams",
            coords.team.as_str(),
            "pipelines",
            coords.pipeline.as_str(),
            "jobs",
            coords.job.as_str(),
            "builds",
            build_name,
        ];
        join_url(&coords.host, &segments, &coords.instance_vars)
    }
}

#[async_trait]
impl BuildStatusSource for ConcourseClient {
    async fn build_status(
        &self,
        coords: &BuildCoordinates,
        build_name: &str,
    ) -> Result<String, HistoryError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(HistoryError::MissingCredentials);
        }

        let url = Self::build_url(coords, build_name);
        debug!(%url, "requesting build status");

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(HistoryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let build: Build = serde_json::from_str(&body)?;
        debug!(build = build_name, status = %build.status, "previous build status");
        Ok(build.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::spawn_server;
    use axum::extract::{Path, RawQuery};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    const AUTH: &str = "Basic Y2k6c2VjcmV0"; // ci:secret

    async fn build_handler(
        Path((team, pipeline, job, build)): Path<(String, String, String, String)>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
    ) -> axum::response::Response {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(AUTH) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        if (team.as_str(), pipeline.as_str(), job.as_str()) != ("main", "demo", "test") {
            return StatusCode::NOT_FOUND.into_response();
        }

        let status = match (build.as_str(), query.as_deref()) {
            ("5", None) => "failed",
            ("5", Some("vars.branch=%22main%22")) => "errored",
            ("6.1", None) => "succeeded",
            ("7", None) => return Json(json!({"id": 7})).into_response(),
            ("8", None) => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                "succeeded"
            }
            _ => return StatusCode::NOT_FOUND.into_response(),
        };
        Json(json!({"id": 42, "name": build, "status": status})).into_response()
    }

    async fn concourse() -> String {
        let app = Router::new().route(
            "/api/v1/teams/:team/pipelines/:pipeline/jobs/:job/builds/:build",
            get(build_handler),
        );
        spawn_server(app).await
    }

    fn coords(host: &str) -> BuildCoordinates {
        BuildCoordinates {
            host: host.to_string(),
            team: "main".to_string(),
            pipeline: "demo".to_string(),
            job: "test".to_string(),
            build_name: "6".to_string(),
            instance_vars: String::new(),
        }
    }

    #[tokio::test]
    async fn test_requires_credentials() {
        let host = concourse().await;
        for (username, password) in [("", ""), ("ci", ""), ("", "secret")] {
            let client = ConcourseClient::new(username, password);
            let err = client.build_status(&coords(&host), "5").await.unwrap_err();
            assert!(matches!(err, HistoryError::MissingCredentials));
        }
    }

    #[test]
    fn test_build_url() {
        let mut c = coords("https://ci.example.com");
        assert_eq!(
            ConcourseClient::build_url(&c, "5"),
            "https://ci.example.com/api/v1/teams/main/pipelines/demo/jobs/test/builds/5"
        );

        c.instance_vars = "?vars.branch=%22main%22".to_string();
        assert_eq!(
            ConcourseClient::build_url(&c, "5.1"),
            "https://ci.example.com/api/v1/teams/main/pipelines/demo/jobs/test/builds/5.1?vars.branch=%22main%22"
        );
    }

    #[tokio::test]
    async fn test_fetches_status() {
        let host = concourse().await;
        let client = ConcourseClient::new("ci", "secret");

        assert_eq!(client.build_status(&coords(&host), "5").await.unwrap(), "failed");
        assert_eq!(client.build_status(&coords(&host), "6.1").await.unwrap(), "succeeded");
    }

    #[tokio::test]
    async fn test_forwards_instance_vars() {
        let host = concourse().await;
        let client = ConcourseClient::new("ci", "secret");
        let mut c = coords(&host);
        c.instance_vars = "?vars.branch=%22main%22".to_string();

        assert_eq!(client.build_status(&c, "5").await.unwrap(), "errored");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let host = concourse().await;
        let client = ConcourseClient::new("ci", "wrong");

        let err = client.build_status(&coords(&host), "5").await.unwrap_err();
        assert!(matches!(err, HistoryError::Status { status: 401, .. }), "{}", err);
    }

    #[tokio::test]
    async fn test_missing_build_and_malformed_body() {
        let host = concourse().await;
        let client = ConcourseClient::new("ci", "secret");

        let err = client.build_status(&coords(&host), "99").await.unwrap_err();
        assert!(matches!(err, HistoryError::Status { status: 404, .. }));

        let err = client.build_status(&coords(&host), "7").await.unwrap_err();
        assert!(matches!(err, HistoryError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_hung_server_times_out() {
        let host = concourse().await;
        let client = ConcourseClient {
            timeout: Duration::from_millis(100),
            ..ConcourseClient::new("ci", "secret")
        };

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            client.build_status(&coords(&host), "8"),
        )
        .await;

        let err = result.expect("lookup ignored its timeout").unwrap_err();
        assert!(matches!(&err, HistoryError::Http(e) if e.is_timeout()), "{}", err);
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = ConcourseClient::new("ci", "secret");
        let err = client
            .build_status(&coords("http://127.0.0.1:1"), "5")
            .await
            .unwrap_err();
        assert!(matches!(err, HistoryError::Http(_)));
    }
}
