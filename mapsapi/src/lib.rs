//! # mapsapi - Maps Web Services Client
//!
//! Typed, blocking client for the Maps web service APIs. Every operation
//! goes through one shared pipeline:
//!
//! 1. **Validate** the request locally; invalid requests never hit the network
//! 2. **Encode** it into a canonical query, adding an API key or an HMAC signature
//! 3. **Dispatch** it, retrying transient failures with capped exponential backoff
//! 4. **Decode** the JSON envelope into typed results or a typed error
//!
//! ## Quick Start
//!
//! ```ignore
//! use mapsapi::{Context, Credentials, ElevationRequest, LatLng, ReqwestTransport};
//!
//! let ctx = Context::new(Credentials::api_key("AIza..."), ReqwestTransport::new()?)?;
//!
//! let request = ElevationRequest::for_locations(vec![LatLng::new(39.7391536, -104.9847034)]);
//! let results = request.get(&ctx)?;
//! println!("Elevation: {}m", results[0].elevation);
//! ```
//!
//! ## Operations
//!
//! - [`ElevationRequest`]: elevation at points or sampled along a path
//! - [`GeocodingRequest`]: forward, reverse and place-id geocoding
//! - [`TimezoneRequest`]: time zone of a point at a given time
//!
//! New operations implement [`ApiRequest`] and reuse the pipeline through
//! [`Context::request`].
//!
//! ## Errors
//!
//! Transport failures, HTTP 5xx and the `OVER_QUERY_LIMIT`/`UNKNOWN_ERROR`
//! statuses are retried up to [`RetryPolicy::max_attempts`] times. Every
//! other failure is returned immediately. See [`MapsError`].

pub mod cancel;
pub mod context;
mod decode;
mod dispatch;
pub mod elevation;
mod encode;
pub mod error;
pub mod geocoding;
pub mod latlng;
pub mod polyline;
pub mod ratelimit;
pub mod request;
pub mod retry;
pub mod timezone;
pub mod transport;

#[cfg(feature = "geojson")]
pub mod geojson;

// Re-export main types at crate root for convenience
pub use cancel::CancelToken;
pub use context::{Context, ContextBuilder, Credentials, DEFAULT_BASE_URL};
pub use elevation::{
    get_elevations, get_elevations_with_progress, ElevationRequest, ElevationResult,
    MAX_LOCATIONS_PER_REQUEST,
};
pub use encode::Params;
pub use error::{MapsError, Result};
pub use geocoding::{AddressComponent, Geometry, GeocodingRequest, GeocodingResult};
pub use latlng::{LatLng, LatLngBounds};
pub use request::ApiRequest;
pub use retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
pub use timezone::{TimezoneRequest, TimezoneResult};
pub use transport::{HttpResponse, ReqwestTransport, Transport, DEFAULT_TIMEOUT_SECS};
