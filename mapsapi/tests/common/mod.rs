//! Local HTTP server that stands in for the Maps web services.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::extract::{RawQuery, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use mapsapi::{Context, ContextBuilder, Credentials, RetryPolicy};
use tokio::sync::oneshot;

pub const API_KEY: &str = "AIzaNotReallyAnAPIKey";

struct MockState {
    responses: Vec<(u16, String)>,
    hits: AtomicUsize,
    requests: Mutex<Vec<(String, String)>>,
}

/// Serves canned responses in order, repeating the last one.
pub struct MockServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    /// Always answer with `status` and `body`.
    pub fn start(status: u16, body: &str) -> Self {
        Self::sequence(&[(status, body)])
    }

    /// Answer the n-th request with the n-th response.
    pub fn sequence(responses: &[(u16, &str)]) -> Self {
        assert!(!responses.is_empty(), "need at least one response");
        let state = Arc::new(MockState {
            responses: responses
                .iter()
                .map(|(s, b)| (*s, b.to_string()))
                .collect(),
            hits: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        });

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();

        let app = Router::new().fallback(respond).with_state(state.clone());
        let (tx, rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        Self {
            addr,
            state,
            shutdown: Some(tx),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// `(path, raw query)` of every request received so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Decoded query parameters of the n-th request.
    pub fn query(&self, n: usize) -> Vec<(String, String)> {
        let (_, query) = &self.requests()[n];
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    /// Context with an API key and a fast retry policy.
    pub fn context(&self, max_attempts: u32) -> Context {
        self.builder(Credentials::api_key(API_KEY), max_attempts)
            .build()
            .unwrap()
    }

    pub fn builder(&self, credentials: Credentials, max_attempts: u32) -> ContextBuilder {
        ContextBuilder::new(credentials)
            .base_url(self.url())
            .timeout(Duration::from_secs(5))
            .retry_policy(fast_retry(max_attempts))
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(max_attempts)
        .with_initial_backoff(Duration::from_millis(1))
        .with_max_backoff(Duration::from_millis(10))
}

async fn respond(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    let n = state.hits.fetch_add(1, Ordering::SeqCst);
    state
        .requests
        .lock()
        .unwrap()
        .push((uri.path().to_string(), query.unwrap_or_default()));

    let (status, body) = &state.responses[n.min(state.responses.len() - 1)];
    (
        StatusCode::from_u16(*status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body.clone(),
    )
}
