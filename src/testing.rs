//! Stub HTTP servers for tests

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Webhook endpoint that answers every POST with a fixed status
pub struct StubWebhook {
    pub url: String,
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl StubWebhook {
    pub async fn start(status: StatusCode) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let app = {
            let hits = Arc::clone(&hits);
            let bodies = Arc::clone(&bodies);
            Router::new().route(
                "/webhook",
                post(move |body: String| {
                    let hits = Arc::clone(&hits);
                    let bodies = Arc::clone(&bodies);
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        bodies.lock().unwrap().push(body);
                        status
                    }
                }),
            )
        };

        let base = spawn_server(app).await;
        Self {
            url: format!("{}/webhook", base),
            hits,
            bodies,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}
