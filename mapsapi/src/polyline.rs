//! Encoded polyline format (precision 1e5).
//!
//! Each coordinate is stored as the delta from the previous one, scaled by
//! 1e5, zig-zag encoded, and emitted in 5-bit chunks offset by 63 so the
//! result is printable ASCII. Requests send it with an `enc:` prefix.

use crate::error::{MapsError, Result};
use crate::latlng::LatLng;

const PRECISION: f64 = 1e5;

/// Encode a sequence of coordinates as a polyline string.
///
/// # Example
///
/// ```
/// use mapsapi::{polyline, LatLng};
///
/// let path = [
///     LatLng::new(38.5, -120.2),
///     LatLng::new(40.7, -120.95),
///     LatLng::new(43.252, -126.453),
/// ];
/// assert_eq!(polyline::encode(&path), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
pub fn encode(points: &[LatLng]) -> String {
    let mut out = String::with_capacity(points.len() * 8);
    let (mut prev_lat, mut prev_lng) = (0i64, 0i64);

    for p in points {
        let lat = scale(p.lat);
        let lng = scale(p.lng);
        encode_value(lat - prev_lat, &mut out);
        encode_value(lng - prev_lng, &mut out);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

/// Decode a polyline string back into coordinates.
///
/// Returns a [`MapsError::Decode`] if the string is truncated or contains
/// characters outside the polyline alphabet.
pub fn decode(encoded: &str) -> Result<Vec<LatLng>> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut pos = 0;
    let (mut lat, mut lng) = (0i64, 0i64);

    while pos < bytes.len() {
        lat += decode_value(bytes, &mut pos)?;
        lng += decode_value(bytes, &mut pos)?;
        points.push(LatLng::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

fn scale(v: f64) -> i64 {
    // Round half up, matching the reference encoder.
    (v * PRECISION + 0.5).floor() as i64
}

fn encode_value(delta: i64, out: &mut String) {
    let zigzag = if delta < 0 { !(delta << 1) } else { delta << 1 };
    let mut v = zigzag as u64;
    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}

fn decode_value(bytes: &[u8], pos: &mut usize) -> Result<i64> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let b = *bytes
            .get(*pos)
            .ok_or_else(|| MapsError::Decode("truncated polyline".to_string()))?;
        if !(63..=126).contains(&b) {
            return Err(MapsError::Decode(format!(
                "invalid polyline character '{}'",
                b as char
            )));
        }
        if shift > 60 {
            return Err(MapsError::Decode("polyline value overflow".to_string()));
        }
        *pos += 1;

        let chunk = (b - 63) as u64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }

    let value = (result >> 1) as i64;
    Ok(if result & 1 != 0 { !value } else { value })
}
