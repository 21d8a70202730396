//! GeoJSON elevation enrichment.
//!
//! Adds the elevation as third coordinate to every position of a GeoJSON
//! geometry. Enable the `geojson` feature to use this module.
//!
//! # Example
//!
//! ```ignore
//! use mapsapi::geojson::add_elevations_to_geometry;
//! use geojson::Geometry;
//!
//! let geometry: Geometry = r#"{"type": "Point", "coordinates": [-104.9847034, 39.7391536]}"#
//!     .parse()
//!     .unwrap();
//!
//! let enriched = add_elevations_to_geometry(&ctx, geometry)?;
//! // Result: {"type": "Point", "coordinates": [-104.9847034, 39.7391536, 1608.6]}
//! ```

use geojson::{Geometry, Value as GeoJsonValue};

use crate::context::Context;
use crate::elevation::get_elevations;
use crate::error::{MapsError, Result};
use crate::latlng::LatLng;

/// Add elevations to all positions in a GeoJSON geometry.
///
/// Positions are in GeoJSON order, `[lng, lat]` or `[lng, lat, alt]`; an
/// existing altitude is replaced. All positions of the geometry, including
/// nested collections, are looked up together in as few requests as
/// possible.
///
/// # Errors
///
/// Returns [`MapsError::Validation`] if a position has fewer than two
/// elements, or any error from the elevation lookup.
pub fn add_elevations_to_geometry(ctx: &Context, mut geometry: Geometry) -> Result<Geometry> {
    let mut points = Vec::new();
    visit_positions(&mut geometry.value, &mut |position| {
        points.push(to_latlng(position)?);
        Ok(())
    })?;

    let elevations = get_elevations(ctx, &points)?;

    let mut next = elevations.iter();
    visit_positions(&mut geometry.value, &mut |position| {
        let result = next
            .next()
            .ok_or_else(|| MapsError::Decode("fewer elevations than positions".to_string()))?;
        position.truncate(2);
        position.push(result.elevation);
        Ok(())
    })?;

    Ok(geometry)
}

/// Add elevation to a single position, returning `[lng, lat, elevation]`.
pub fn add_elevation_to_coord(ctx: &Context, coord: &[f64]) -> Result<Vec<f64>> {
    let point = to_latlng(coord)?;
    let elevations = get_elevations(ctx, &[point])?;
    let elevation = elevations
        .first()
        .map(|r| r.elevation)
        .ok_or_else(|| MapsError::Decode("no elevation returned".to_string()))?;
    Ok(vec![coord[0], coord[1], elevation])
}

fn to_latlng(position: &[f64]) -> Result<LatLng> {
    match position {
        [lng, lat, ..] => Ok(LatLng::new(*lat, *lng)),
        _ => Err(MapsError::Validation(
            "coordinate must have at least 2 elements (lng, lat)".to_string(),
        )),
    }
}

/// Call `f` on every position of `value`, depth first, in document order.
fn visit_positions<F>(value: &mut GeoJsonValue, f: &mut F) -> Result<()>
where
    F: FnMut(&mut Vec<f64>) -> Result<()>,
{
    match value {
        GeoJsonValue::Point(coord) => f(coord),
        GeoJsonValue::MultiPoint(coords) | GeoJsonValue::LineString(coords) => {
            coords.iter_mut().try_for_each(|c| f(c))
        }
        GeoJsonValue::MultiLineString(lines) | GeoJsonValue::Polygon(lines) => lines
            .iter_mut()
            .flat_map(|line| line.iter_mut())
            .try_for_each(|c| f(c)),
        GeoJsonValue::MultiPolygon(polygons) => polygons
            .iter_mut()
            .flat_map(|polygon| polygon.iter_mut())
            .flat_map(|ring| ring.iter_mut())
            .try_for_each(|c| f(c)),
        GeoJsonValue::GeometryCollection(geometries) => geometries
            .iter_mut()
            .try_for_each(|g| visit_positions(&mut g.value, f)),
    }
}
