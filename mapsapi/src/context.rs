//! Shared, read-only configuration for calls to the Maps web services.
//!
//! A [`Context`] bundles credentials, the HTTP transport, the base URL and
//! the resilience settings. Build one per credential set and pass it to
//! every call; it is `Send + Sync` and never mutated after construction.
//!
//! ```ignore
//! use mapsapi::{Context, ContextBuilder, Credentials, ElevationRequest, LatLng};
//!
//! let ctx = ContextBuilder::new(Credentials::api_key("AIza..."))
//!     .max_attempts(5)
//!     .rate_limit(50)
//!     .build()?;
//!
//! let request = ElevationRequest::for_locations(vec![LatLng::new(39.7391536, -104.9847034)]);
//! let results = request.get(&ctx)?;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use url::Url;

use crate::error::{MapsError, Result};
use crate::ratelimit::RateLimiter;
use crate::retry::RetryPolicy;
use crate::transport::{ReqwestTransport, Transport, DEFAULT_TIMEOUT_SECS};

/// Production endpoint of the Maps web services.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Client secrets are URL-safe base64; accept them with or without padding.
const SECRET_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How requests are authenticated.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Send `key=<api key>` with every request.
    ApiKey(String),
    /// Send `client=<id>` and sign every URL with the shared secret.
    ClientSecret {
        client_id: String,
        /// URL-safe base64 signing secret.
        secret: String,
    },
}

impl Credentials {
    /// API-key credentials.
    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey(key.into())
    }

    /// Client-id and signing-secret credentials.
    pub fn client_secret(client_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Credentials::ClientSecret {
            client_id: client_id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
            Credentials::ClientSecret { client_id, .. } => f
                .debug_struct("ClientSecret")
                .field("client_id", client_id)
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Credentials in the form the encoder consumes.
#[derive(Clone)]
pub(crate) enum Auth {
    ApiKey(String),
    Signed {
        client_id: String,
        key: Vec<u8>,
        channel: Option<String>,
    },
}

impl Auth {
    fn from_credentials(credentials: Credentials, channel: Option<String>) -> Result<Self> {
        match credentials {
            Credentials::ApiKey(key) => {
                if key.trim().is_empty() {
                    return Err(MapsError::Config("API key is empty".to_string()));
                }
                Ok(Auth::ApiKey(key))
            }
            Credentials::ClientSecret { client_id, secret } => {
                if client_id.trim().is_empty() {
                    return Err(MapsError::Config("client id is empty".to_string()));
                }
                let key = SECRET_ENGINE.decode(secret.trim()).map_err(|e| {
                    MapsError::Config(format!("client secret is not URL-safe base64: {}", e))
                })?;
                if key.is_empty() {
                    return Err(MapsError::Config("client secret is empty".to_string()));
                }
                Ok(Auth::Signed {
                    client_id,
                    key,
                    channel,
                })
            }
        }
    }
}

/// Everything a call needs besides the request itself.
///
/// Construct with [`Context::new`], [`Context::with_base_url`] or
/// [`ContextBuilder`].
pub struct Context {
    pub(crate) auth: Auth,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
    pub(crate) retry: RetryPolicy,
    pub(crate) rate_limiter: Option<RateLimiter>,
}

impl Context {
    /// Create a context for the production endpoint.
    pub fn new(credentials: Credentials, transport: impl Transport + 'static) -> Result<Self> {
        ContextBuilder::new(credentials).transport(transport).build()
    }

    /// Create a context that talks to `base_url` instead of the production
    /// endpoint, e.g. a local test server. Behaves identically otherwise.
    pub fn with_base_url(
        credentials: Credentials,
        transport: impl Transport + 'static,
        base_url: &str,
    ) -> Result<Self> {
        ContextBuilder::new(credentials)
            .transport(transport)
            .base_url(base_url)
            .build()
    }

    /// Start building a context.
    pub fn builder(credentials: Credentials) -> ContextBuilder {
        ContextBuilder::new(credentials)
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry policy applied to transient failures.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Whether URLs are signed (client-id credentials) rather than keyed.
    pub fn is_signing(&self) -> bool {
        matches!(self.auth, Auth::Signed { .. })
    }

    /// Minimum spacing between requests, if rate limiting is on.
    pub fn rate_limit_interval(&self) -> Option<Duration> {
        self.rate_limiter.as_ref().map(RateLimiter::interval)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("base_url", &self.base_url.as_str())
            .field("signing", &self.is_signing())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("rate_limit_interval", &self.rate_limit_interval())
            .finish()
    }
}

/// Builder for [`Context`].
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use mapsapi::{ContextBuilder, Credentials};
///
/// let ctx = ContextBuilder::new(Credentials::client_secret("gme-acme", "vNIXE0xscrmjlyV-12Nj_BvUPaw="))
///     .timeout(Duration::from_secs(10))
///     .max_attempts(4)
///     .build()?;
/// ```
pub struct ContextBuilder {
    credentials: Credentials,
    base_url: String,
    transport: Option<Arc<dyn Transport>>,
    timeout: Duration,
    retry: RetryPolicy,
    rate_limit: u32,
    channel: Option<String>,
}

impl ContextBuilder {
    /// Create a builder with default settings for the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            rate_limit: 0,
            channel: None,
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `MAPS_API_KEY` | API key | - |
    /// | `MAPS_CLIENT_ID` | Client id for signed requests | - |
    /// | `MAPS_CLIENT_SECRET` | URL-safe base64 signing secret | - |
    /// | `MAPS_BASE_URL` | Service endpoint | `https://maps.googleapis.com` |
    /// | `MAPS_TIMEOUT_SECS` | Per-attempt timeout | 30 |
    /// | `MAPS_MAX_ATTEMPTS` | Attempts per call | 3 |
    /// | `MAPS_RATE_LIMIT` | Requests per second, 0 disables | 0 |
    ///
    /// An API key wins over client-id credentials when both are set.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Config`] if no credentials are set.
    pub fn from_env() -> Result<Self> {
        let credentials = match std::env::var("MAPS_API_KEY") {
            Ok(key) if !key.is_empty() => Credentials::ApiKey(key),
            _ => match (
                std::env::var("MAPS_CLIENT_ID"),
                std::env::var("MAPS_CLIENT_SECRET"),
            ) {
                (Ok(client_id), Ok(secret)) => Credentials::ClientSecret { client_id, secret },
                _ => {
                    return Err(MapsError::Config(
                        "set MAPS_API_KEY or MAPS_CLIENT_ID and MAPS_CLIENT_SECRET".to_string(),
                    ))
                }
            },
        };

        let mut builder = Self::new(credentials);

        if let Ok(base_url) = std::env::var("MAPS_BASE_URL") {
            builder = builder.base_url(base_url);
        }
        if let Some(secs) = env_parse::<u64>("MAPS_TIMEOUT_SECS") {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(attempts) = env_parse::<u32>("MAPS_MAX_ATTEMPTS") {
            builder = builder.max_attempts(attempts);
        }
        if let Some(qps) = env_parse::<u32>("MAPS_RATE_LIMIT") {
            builder = builder.rate_limit(qps);
        }

        Ok(builder)
    }

    /// Send requests to `base_url` instead of the production endpoint.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a custom transport. Defaults to a [`ReqwestTransport`].
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a transport that is already shared elsewhere.
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Per-attempt timeout. Default is 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Total attempts per call, including the first.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    /// Limit request starts to `requests_per_second`; 0 disables.
    pub fn rate_limit(mut self, requests_per_second: u32) -> Self {
        self.rate_limit = requests_per_second;
        self
    }

    /// Usage-reporting channel sent with client-id credentials.
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Build the [`Context`].
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Config`] if the credentials are unusable, the
    /// base URL is not an absolute http(s) URL, or the default transport
    /// cannot be created.
    pub fn build(self) -> Result<Context> {
        let auth = Auth::from_credentials(self.credentials, self.channel)?;

        let base_url = Url::parse(&self.base_url)
            .map_err(|e| MapsError::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(MapsError::Config(format!(
                "base URL must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_timeout(self.timeout)?),
        };

        Ok(Context {
            auth,
            transport,
            base_url,
            timeout: self.timeout,
            retry: self.retry,
            rate_limiter: RateLimiter::new(self.rate_limit),
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}
