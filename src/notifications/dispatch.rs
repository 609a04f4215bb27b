//! Webhook delivery with retry

use std::time::Instant;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use super::discord::Message;
use crate::error::DeliveryError;
use crate::retry::{retry, Backoff};

/// Posts messages to a webhook, retrying under a [`Backoff`] budget.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    backoff: Backoff,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Backoff::default())
    }
}

impl Dispatcher {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            client: reqwest::Client::new(),
            backoff,
        }
    }

    /// Send `message` to `url`. Any transport error or status >= 400 is retried.
    ///
    /// Each attempt times out when the backoff budget runs out, so a webhook
    /// that never answers cannot hold the process past `max_elapsed_time`.
    pub async fn send(&self, url: &str, message: &Message) -> Result<(), DeliveryError> {
        let payload = serde_json::to_string(message)?;
        let payload = payload.as_str();
        let deadline = Instant::now() + self.backoff.max_elapsed_time;

        retry(&self.backoff, move || self.post(url, payload, deadline)).await?;
        info!("discord message sent");
        Ok(())
    }

    async fn post(
        &self,
        url: &str,
        payload: &str,
        deadline: Instant,
    ) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .timeout(deadline.saturating_duration_since(Instant::now()))
            .body(payload.to_string())
            .send()
            .await
            .map_err(|source| DeliveryError::Transport {
                source,
                payload: payload.to_string(),
            })?;

        let status = response.status();
        debug!(status = status.as_u16(), "webhook responded");
        if status.as_u16() > 399 {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
                payload: payload.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::discord::Embed;
    use crate::testing::{spawn_server, StubWebhook};
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use std::time::Duration;

    fn fast() -> Dispatcher {
        Dispatcher::new(Backoff {
            initial_interval: Duration::from_millis(5),
            multiplier: 1.5,
            max_interval: Duration::from_millis(20),
            max_elapsed_time: Duration::from_millis(100),
        })
    }

    fn message() -> Message {
        Message {
            username: "Concourse".to_string(),
            embeds: vec![Embed {
                title: "Success".to_string(),
                color: 0x32cd32,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_success_sends_once() {
        let webhook = StubWebhook::start(StatusCode::NO_CONTENT).await;

        fast().send(&webhook.url, &message()).await.unwrap();

        assert_eq!(webhook.hits(), 1);
        let sent: Message = serde_json::from_str(&webhook.bodies()[0]).unwrap();
        assert_eq!(sent, message());
    }

    #[tokio::test]
    async fn test_3xx_status_counts_as_delivered() {
        let webhook = StubWebhook::start(StatusCode::NOT_MODIFIED).await;
        fast().send(&webhook.url, &message()).await.unwrap();
        assert_eq!(webhook.hits(), 1);
    }

    #[tokio::test]
    async fn test_error_status_is_retried_until_budget() {
        let webhook = StubWebhook::start(StatusCode::NOT_FOUND).await;

        let err = fast().send(&webhook.url, &message()).await.unwrap_err();

        assert!(webhook.hits() > 1, "hits = {}", webhook.hits());
        match err {
            DeliveryError::Status { status, payload, .. } => {
                assert_eq!(status, 404);
                assert_eq!(payload, serde_json::to_string(&message()).unwrap());
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_error_keeps_response_body() {
        let app = Router::new().route(
            "/webhook",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    r#"{"message": "Invalid Form Body", "code": 50035}"#,
                )
            }),
        );
        let url = format!("{}/webhook", spawn_server(app).await);

        let err = fast().send(&url, &message()).await.unwrap_err();

        match &err {
            DeliveryError::Status { status, body, .. } => {
                assert_eq!(*status, 400);
                assert!(body.contains("Invalid Form Body"), "body = {}", body);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.to_string().contains("Invalid Form Body"));
        assert!(err.to_string().contains("Payload: {"));
    }

    #[tokio::test]
    async fn test_hung_webhook_is_bounded_by_budget() {
        let app = Router::new().route(
            "/webhook",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                StatusCode::OK
            }),
        );
        let url = format!("{}/webhook", spawn_server(app).await);

        let started = std::time::Instant::now();
        let result =
            tokio::time::timeout(Duration::from_secs(5), fast().send(&url, &message())).await;

        let err = result.expect("send outlived its backoff budget").unwrap_err();
        assert!(
            matches!(&err, DeliveryError::Transport { source, .. } if source.is_timeout()),
            "{}",
            err
        );
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_unreachable_webhook() {
        let err = fast()
            .send("http://127.0.0.1:1/webhook", &message())
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Transport { .. }));
        assert!(err.to_string().contains("Payload: {"));
    }
}
