//! Time Zone API.

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::context::Context;
use crate::encode::Params;
use crate::error::Result;
use crate::latlng::LatLng;
use crate::request::ApiRequest;

/// A time zone lookup for a point at a moment in time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimezoneRequest {
    pub location: LatLng,
    /// Seconds since the Unix epoch; determines whether DST applies.
    pub timestamp: u64,
    pub language: Option<String>,
}

/// Time zone of a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneResult {
    /// Daylight saving offset in seconds.
    pub dst_offset: i64,
    /// Offset from UTC in seconds, without DST.
    pub raw_offset: i64,
    /// IANA zone id, e.g. `America/Los_Angeles`.
    pub time_zone_id: String,
    /// Localized long name, e.g. `Pacific Daylight Time`.
    pub time_zone_name: String,
}

impl TimezoneResult {
    /// Total offset from UTC in seconds.
    pub fn utc_offset(&self) -> i64 {
        self.raw_offset + self.dst_offset
    }
}

impl TimezoneRequest {
    pub fn new(location: LatLng, timestamp: u64) -> Self {
        Self {
            location,
            timestamp,
            language: None,
        }
    }

    /// Send the request. `Ok(None)` when the point has no time zone (e.g. open sea).
    pub fn get(&self, ctx: &Context) -> Result<Option<TimezoneResult>> {
        ctx.request(self)
    }

    /// Send the request, giving up when `cancel` fires.
    pub fn get_with_cancel(
        &self,
        ctx: &Context,
        cancel: &CancelToken,
    ) -> Result<Option<TimezoneResult>> {
        ctx.request_with_cancel(self, cancel)
    }
}

impl ApiRequest for TimezoneRequest {
    // The payload sits at the top level, next to `status`
    type Response = TimezoneResult;
    type Output = Option<TimezoneResult>;
    const PATH: &'static str = "/maps/api/timezone/json";

    fn validate(&self) -> Result<()> {
        self.location.validate()
    }

    fn params(&self) -> Params {
        let mut params = vec![
            ("location", self.location.to_string()),
            ("timestamp", self.timestamp.to_string()),
        ];
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params
    }

    fn into_output(&self, response: TimezoneResult) -> Result<Option<TimezoneResult>> {
        Ok(Some(response))
    }
}
