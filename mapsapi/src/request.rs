//! The contract every web-service operation implements.

use serde::de::DeserializeOwned;

use crate::encode::Params;
use crate::error::Result;

/// A request to one of the Maps web services.
///
/// Implementors describe where the request goes, how it validates and
/// encodes, and how the decoded payload becomes the caller-facing output.
/// [`Context::request`](crate::Context::request) does the rest.
pub trait ApiRequest {
    /// Payload of an `OK` response.
    type Response: DeserializeOwned;

    /// What the caller receives. `Default` is returned for `ZERO_RESULTS`.
    type Output: Default;

    /// Path of the JSON endpoint, e.g. `/maps/api/elevation/json`.
    const PATH: &'static str;

    /// Reject requests that must not reach the network.
    fn validate(&self) -> Result<()>;

    /// Query parameters, without credentials.
    fn params(&self) -> Params;

    /// Turn a decoded payload into the output.
    fn into_output(&self, response: Self::Response) -> Result<Self::Output>;
}
