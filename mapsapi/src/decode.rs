//! Interprets the service's JSON envelope.
//!
//! Every response carries a top-level `status`. `OK` means the rest of the
//! object is the payload; `ZERO_RESULTS` is a successful empty answer;
//! `OVER_QUERY_LIMIT` and `UNKNOWN_ERROR` are transient; anything else is a
//! terminal service error, optionally explained by `error_message`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{MapsError, Result};
use crate::transport::HttpResponse;

/// Status strings the service uses for transient conditions.
const RETRYABLE_STATUSES: [&str; 2] = ["OVER_QUERY_LIMIT", "UNKNOWN_ERROR"];

/// Decode a response into its payload.
///
/// Returns `Ok(None)` for `ZERO_RESULTS`.
pub(crate) fn decode_response<T: DeserializeOwned>(response: &HttpResponse) -> Result<Option<T>> {
    if response.status >= 500 {
        return Err(MapsError::Transport {
            status: Some(response.status),
            message: format!("server error: {}", body_excerpt(&response.body)),
        });
    }

    let value: Value = match serde_json::from_slice(&response.body) {
        Ok(value) => value,
        Err(e) if response.is_success() => {
            return Err(MapsError::Decode(format!("response is not JSON: {}", e)))
        }
        Err(_) => return Err(unparsable(response)),
    };

    let status = match value.get("status").and_then(Value::as_str) {
        Some(status) => status.to_string(),
        None if response.is_success() => {
            return Err(MapsError::Decode(
                "response has no string 'status' field".to_string(),
            ))
        }
        None => return Err(unparsable(response)),
    };
    let message = value
        .get("error_message")
        .and_then(Value::as_str)
        .map(str::to_string);

    match status.as_str() {
        "OK" if response.is_success() => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| MapsError::Decode(e.to_string())),
        "OK" => Err(unparsable(response)),
        "ZERO_RESULTS" if response.is_success() => Ok(None),
        "ZERO_RESULTS" => Err(unparsable(response)),
        s if RETRYABLE_STATUSES.contains(&s) => {
            Err(MapsError::RetryableService { status, message })
        }
        _ => Err(MapsError::Service { status, message }),
    }
}

fn unparsable(response: &HttpResponse) -> MapsError {
    MapsError::Transport {
        status: Some(response.status),
        message: format!("unexpected response: {}", body_excerpt(&response.body)),
    }
}

fn body_excerpt(body: &[u8]) -> String {
    const LIMIT: usize = 200;
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();
    if trimmed.chars().count() > LIMIT {
        format!("{}...", trimmed.chars().take(LIMIT).collect::<String>())
    } else if trimmed.is_empty() {
        "<empty body>".to_string()
    } else {
        trimmed.to_string()
    }
}
