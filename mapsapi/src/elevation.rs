//! Elevation API.
//!
//! Look up the elevation of discrete points, or sample it at evenly spaced
//! points along a path.
//!
//! # Example
//!
//! ```ignore
//! use mapsapi::{ElevationRequest, LatLng};
//!
//! let request = ElevationRequest::for_locations(vec![LatLng::new(39.7391536, -104.9847034)]);
//! for result in request.get(&ctx)? {
//!     println!("{}: {:.1}m", result.location, result.elevation);
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::context::Context;
use crate::encode::Params;
use crate::error::{MapsError, Result};
use crate::latlng::{join_pipe, LatLng};
use crate::polyline;
use crate::request::ApiRequest;

/// A request for elevation data.
///
/// Set either `locations`, or `path` together with `samples`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElevationRequest {
    /// Discrete points to look up.
    pub locations: Vec<LatLng>,
    /// Path along which to sample.
    pub path: Vec<LatLng>,
    /// Number of samples along `path`, including both endpoints.
    pub samples: u32,
}

/// Elevation at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationResult {
    /// Elevation in meters above sea level.
    pub elevation: f64,
    /// Point the elevation was computed for.
    pub location: LatLng,
    /// Distance in meters between the data points interpolated from.
    pub resolution: f64,
}

/// Payload of an elevation response.
#[derive(Debug, Deserialize)]
pub struct ElevationResponse {
    pub results: Vec<ElevationResult>,
}

impl ElevationRequest {
    /// Elevation at each of `locations`.
    pub fn for_locations(locations: Vec<LatLng>) -> Self {
        Self {
            locations,
            ..Default::default()
        }
    }

    /// `samples` evenly spaced elevations along `path`.
    pub fn for_path(path: Vec<LatLng>, samples: u32) -> Self {
        Self {
            path,
            samples,
            ..Default::default()
        }
    }

    /// Send the request.
    pub fn get(&self, ctx: &Context) -> Result<Vec<ElevationResult>> {
        ctx.request(self)
    }

    /// Send the request, giving up when `cancel` fires.
    pub fn get_with_cancel(
        &self,
        ctx: &Context,
        cancel: &CancelToken,
    ) -> Result<Vec<ElevationResult>> {
        ctx.request_with_cancel(self, cancel)
    }
}

/// Most locations sent in one request by [`get_elevations`].
pub const MAX_LOCATIONS_PER_REQUEST: usize = 256;

/// Elevation for any number of points, split into requests of at most
/// [`MAX_LOCATIONS_PER_REQUEST`] locations.
///
/// Results come back in input order, one per point. Chunks are sent one
/// after another; the first failing chunk aborts the whole lookup. A chunk
/// answered with `ZERO_RESULTS` fails as [`MapsError::Service`] with that
/// status, since every point must get an elevation.
pub fn get_elevations(ctx: &Context, points: &[LatLng]) -> Result<Vec<ElevationResult>> {
    get_elevations_with_progress(ctx, points, |_| {})
}

/// Like [`get_elevations`], calling `progress` with the number of points
/// completed after each chunk.
pub fn get_elevations_with_progress<F>(
    ctx: &Context,
    points: &[LatLng],
    mut progress: F,
) -> Result<Vec<ElevationResult>>
where
    F: FnMut(usize),
{
    let mut results = Vec::with_capacity(points.len());

    for chunk in points.chunks(MAX_LOCATIONS_PER_REQUEST) {
        let batch = ElevationRequest::for_locations(chunk.to_vec()).get(ctx)?;
        if batch.is_empty() {
            return Err(MapsError::Service {
                status: "ZERO_RESULTS".to_string(),
                message: Some(format!("no elevations for {} locations", chunk.len())),
            });
        }
        if batch.len() != chunk.len() {
            return Err(MapsError::Decode(format!(
                "expected {} elevations, got {}",
                chunk.len(),
                batch.len()
            )));
        }
        results.extend(batch);
        progress(results.len());
    }

    Ok(results)
}

impl ApiRequest for ElevationRequest {
    type Response = ElevationResponse;
    type Output = Vec<ElevationResult>;
    const PATH: &'static str = "/maps/api/elevation/json";

    fn validate(&self) -> Result<()> {
        match (self.locations.is_empty(), self.path.is_empty()) {
            (true, true) => Err(MapsError::Validation("missing locations".to_string())),
            (false, false) => Err(MapsError::Validation(
                "locations and path are mutually exclusive".to_string(),
            )),
            (false, true) => self.locations.iter().try_for_each(LatLng::validate),
            (true, false) => {
                if self.samples == 0 {
                    return Err(MapsError::Validation(
                        "path requires samples > 0".to_string(),
                    ));
                }
                if self.path.len() < 2 {
                    return Err(MapsError::Validation(
                        "path needs at least two points".to_string(),
                    ));
                }
                self.path.iter().try_for_each(LatLng::validate)
            }
        }
    }

    fn params(&self) -> Params {
        if self.path.is_empty() {
            vec![("locations", join_pipe(&self.locations))]
        } else {
            vec![
                ("path", format!("enc:{}", polyline::encode(&self.path))),
                ("samples", self.samples.to_string()),
            ]
        }
    }

    fn into_output(&self, response: ElevationResponse) -> Result<Vec<ElevationResult>> {
        if !self.path.is_empty() && response.results.len() != self.samples as usize {
            return Err(MapsError::Decode(format!(
                "expected {} samples, got {}",
                self.samples,
                response.results.len()
            )));
        }
        Ok(response.results)
    }
}
