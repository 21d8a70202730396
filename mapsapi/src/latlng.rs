//! Coordinate value types shared by requests and results.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MapsError, Result};

/// A latitude/longitude pair in decimal degrees (WGS84).
///
/// Valid latitudes are in `[-90, 90]`, longitudes in `[-180, 180]`.
/// Values decoded from a response are kept exactly as the service sent them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl LatLng {
    /// Create a new coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Check that both components are finite and within range.
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(MapsError::Validation(format!(
                "latitude {} out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(MapsError::Validation(format!(
                "longitude {} out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }
}

/// Formats as `lat,lng` using the shortest representation that round-trips.
impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

impl FromStr for LatLng {
    type Err = MapsError;

    /// Parse a `lat,lng` pair, e.g. `"39.7391536,-104.9847034"`.
    fn from_str(s: &str) -> Result<Self> {
        let (lat, lng) = s.split_once(',').ok_or_else(|| {
            MapsError::Validation(format!("expected 'lat,lng', got '{}'", s))
        })?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|e| MapsError::Validation(format!("invalid coordinate '{}': {}", v, e)))
        };
        Ok(Self::new(parse(lat)?, parse(lng)?))
    }
}

/// Join coordinates as `lat,lng|lat,lng|...`.
pub(crate) fn join_pipe(points: &[LatLng]) -> String {
    points
        .iter()
        .map(LatLng::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// A rectangle given by its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

impl LatLngBounds {
    pub fn new(southwest: LatLng, northeast: LatLng) -> Self {
        Self {
            northeast,
            southwest,
        }
    }
}

/// Formats as `sw_lat,sw_lng|ne_lat,ne_lng`.
impl fmt::Display for LatLngBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.southwest, self.northeast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_round_trips() {
        let p = LatLng::new(39.7391536, -104.9847034);
        assert_eq!(p.to_string(), "39.7391536,-104.9847034");

        let parsed: LatLng = p.to_string().parse().unwrap();
        assert_eq!(parsed.lat.to_bits(), p.lat.to_bits());
        assert_eq!(parsed.lng.to_bits(), p.lng.to_bits());
    }

    #[test]
    fn test_parse() {
        let p: LatLng = "36.578581, -118.291994".parse().unwrap();
        assert_eq!(p, LatLng::new(36.578581, -118.291994));

        assert!("36.5".parse::<LatLng>().is_err());
        assert!("north,east".parse::<LatLng>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(LatLng::new(0.0, 0.0).validate().is_ok());
        assert!(LatLng::new(90.0, 180.0).validate().is_ok());
        assert!(LatLng::new(-90.0, -180.0).validate().is_ok());

        assert!(LatLng::new(90.1, 0.0).validate().is_err());
        assert!(LatLng::new(0.0, -180.5).validate().is_err());
        assert!(LatLng::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_join_pipe() {
        let points = [
            LatLng::new(36.578581, -118.291994),
            LatLng::new(36.23998, -116.83171),
        ];
        assert_eq!(
            join_pipe(&points),
            "36.578581,-118.291994|36.23998,-116.83171"
        );
        assert_eq!(join_pipe(&[]), "");
    }

    #[test]
    fn test_bounds_display() {
        let bounds = LatLngBounds::new(LatLng::new(34.17, -118.6), LatLng::new(34.24, -118.5));
        assert_eq!(bounds.to_string(), "34.17,-118.6|34.24,-118.5");
    }

    #[test]
    fn test_deserialize() {
        let p: LatLng = serde_json::from_str(r#"{"lat": 39.73915360, "lng": -104.98470340}"#)
            .unwrap();
        assert_eq!(p, LatLng::new(39.7391536, -104.9847034));
    }
}
