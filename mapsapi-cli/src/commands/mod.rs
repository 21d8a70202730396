pub mod batch;
pub mod elevation;
pub mod geocode;
pub mod timezone;

use anyhow::{bail, Context as _, Result};
use clap::Args;
use mapsapi::{Context, ContextBuilder, Credentials, LatLng};
use std::time::Duration;
use tracing::debug;

/// Credentials and connection settings shared by every command.
#[derive(Args)]
pub struct ConnectionArgs {
    /// API key
    #[arg(long, env = "MAPS_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Client id for signed requests
    #[arg(long, env = "MAPS_CLIENT_ID", global = true)]
    client_id: Option<String>,

    /// URL-safe base64 signing secret
    #[arg(long, env = "MAPS_CLIENT_SECRET", hide_env_values = true, global = true)]
    client_secret: Option<String>,

    /// Service endpoint
    #[arg(
        long,
        env = "MAPS_BASE_URL",
        default_value = mapsapi::DEFAULT_BASE_URL,
        global = true
    )]
    base_url: String,

    /// Per-attempt timeout in seconds
    #[arg(long, env = "MAPS_TIMEOUT_SECS", default_value_t = mapsapi::DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    /// Attempts per request, including the first
    #[arg(long, env = "MAPS_MAX_ATTEMPTS", default_value_t = mapsapi::DEFAULT_MAX_ATTEMPTS, global = true)]
    max_attempts: u32,

    /// Requests per second, 0 disables limiting
    #[arg(long, env = "MAPS_RATE_LIMIT", default_value_t = 0, global = true)]
    rate_limit: u32,
}

impl ConnectionArgs {
    /// Build a context from the flags. An API key wins over client credentials.
    pub fn context(&self) -> Result<Context> {
        let credentials = match (&self.api_key, &self.client_id, &self.client_secret) {
            (Some(key), _, _) if !key.is_empty() => Credentials::api_key(key),
            (_, Some(id), Some(secret)) => Credentials::client_secret(id, secret),
            _ => bail!(
                "No credentials. Use --api-key (MAPS_API_KEY) or --client-id and --client-secret"
            ),
        };

        debug!(
            base_url = %self.base_url,
            signed = !self.api_key.as_deref().is_some_and(|k| !k.is_empty()),
            timeout_secs = self.timeout,
            max_attempts = self.max_attempts,
            rate_limit = self.rate_limit,
            "Creating client"
        );
        ContextBuilder::new(credentials)
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(self.timeout))
            .max_attempts(self.max_attempts)
            .rate_limit(self.rate_limit)
            .build()
            .context("Failed to create client")
    }
}

/// Parse every `LAT,LNG` argument.
pub fn parse_points(values: &[String]) -> Result<Vec<LatLng>> {
    values
        .iter()
        .map(|v| {
            v.parse::<LatLng>()
                .with_context(|| format!("Invalid coordinate '{}'", v))
        })
        .collect()
}
