//! HTTP transport abstraction.
//!
//! The dispatcher only needs "GET this URL, give me status, headers and
//! body". [`ReqwestTransport`] provides that over a pooled blocking
//! `reqwest` client; tests plug in their own [`Transport`].

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::error::{MapsError, Result};

/// Default per-attempt timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("mapsapi-rust/", env!("CARGO_PKG_VERSION"));

/// A received HTTP response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lower-cased.
    pub headers: HashMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends HTTP GET requests.
///
/// Implementations must be safe to share between threads; connection
/// pooling, TLS and proxies are their concern.
pub trait Transport: Send + Sync {
    /// Perform a GET request.
    ///
    /// `timeout` bounds this single attempt. An `Err` means no response was
    /// received at all; any HTTP status, including 4xx/5xx, is `Ok`.
    fn get(&self, url: &Url, timeout: Option<Duration>) -> Result<HttpResponse>;
}

/// [`Transport`] backed by `reqwest::blocking::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Create a transport with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MapsError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &Url, timeout: Option<Duration>) -> Result<HttpResponse> {
        let mut request = self.client.get(url.clone());
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().map_err(|e| MapsError::Transport {
            status: None,
            message: format!("Request failed: {}", e.without_url()),
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response.bytes().map_err(|e| MapsError::Transport {
            status: Some(status),
            message: format!("Failed to read response: {}", e.without_url()),
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_success() {
        let mut response = HttpResponse {
            status: 200,
            ..Default::default()
        };
        assert!(response.is_success());

        response.status = 204;
        assert!(response.is_success());

        response.status = 302;
        assert!(!response.is_success());

        response.status = 500;
        assert!(!response.is_success());
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new().is_ok());
        assert!(ReqwestTransport::with_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        // Grab a free port, then close it so nothing is listening
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(2)).unwrap();
        let url = Url::parse(&format!("http://127.0.0.1:{}/maps/api/elevation/json", port)).unwrap();
        let err = transport.get(&url, None).unwrap_err();
        assert!(matches!(err, MapsError::Transport { status: None, .. }));
    }
}
