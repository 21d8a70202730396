//! The shared request pipeline: validate, encode, send, retry, decode.

use std::time::Instant;

use tracing::{debug, warn};
use url::Url;

use crate::cancel::CancelToken;
use crate::context::Context;
use crate::decode::decode_response;
use crate::encode::{build_url, redact};
use crate::error::{MapsError, Result};
use crate::request::ApiRequest;

impl Context {
    /// Run `request` through the pipeline with no cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Validation`] without touching the network if
    /// the request is invalid, otherwise whatever the last attempt failed
    /// with once retries are exhausted or a terminal error occurs.
    pub fn request<R: ApiRequest>(&self, request: &R) -> Result<R::Output> {
        self.request_with_cancel(request, &CancelToken::new())
    }

    /// Run `request` through the pipeline, stopping when `cancel` fires.
    ///
    /// Cancellation is checked before each attempt and interrupts backoff
    /// and rate-limit waits. An attempt already in flight is bounded by the
    /// time left until the token's deadline.
    pub fn request_with_cancel<R: ApiRequest>(
        &self,
        request: &R,
        cancel: &CancelToken,
    ) -> Result<R::Output> {
        request.validate()?;
        let url = build_url(self, R::PATH, request.params())?;

        match self.send::<R>(&url, cancel)? {
            Some(response) => request.into_output(response),
            None => {
                debug!(path = R::PATH, "No results");
                Ok(R::Output::default())
            }
        }
    }

    /// Bounded retry loop around a single URL.
    fn send<R: ApiRequest>(
        &self,
        url: &Url,
        cancel: &CancelToken,
    ) -> Result<Option<R::Response>> {
        let attempts = self.retry.attempts();
        let mut rng = rand::rng();
        let mut attempt = 1;

        loop {
            cancel.check()?;
            if let Some(limiter) = &self.rate_limiter {
                limiter.acquire(cancel)?;
            }

            let timeout = match cancel.remaining() {
                Some(left) if left.is_zero() => return Err(MapsError::Cancelled),
                Some(left) => left.min(self.timeout),
                None => self.timeout,
            };

            debug!(path = R::PATH, attempt, attempts, "Sending request");
            let started = Instant::now();
            let result = self
                .transport
                .get(url, Some(timeout))
                .and_then(|response| decode_response::<R::Response>(&response));

            let err = match result {
                Ok(payload) => {
                    debug!(
                        path = R::PATH,
                        attempt,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Request succeeded"
                    );
                    return Ok(payload);
                }
                Err(e) => e,
            };

            if !err.is_retryable() || attempt >= attempts {
                if err.is_retryable() {
                    warn!(url = %redact(url), attempts, error = %err, "Giving up after retries");
                }
                return Err(err.into_terminal());
            }

            let delay = self.retry.delay(attempt, &mut rng);
            warn!(
                url = %redact(url),
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying request"
            );
            cancel.sleep(delay)?;
            attempt += 1;
        }
    }
}
