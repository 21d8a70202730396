//! Geocoding API: addresses to coordinates and back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::context::Context;
use crate::encode::Params;
use crate::error::{MapsError, Result};
use crate::latlng::{LatLng, LatLngBounds};
use crate::request::ApiRequest;

/// A geocoding request.
///
/// Exactly one lookup mode must be used: forward (`address` and/or
/// `components`), reverse (`latlng`), or `place_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodingRequest {
    /// Street address to geocode.
    pub address: Option<String>,
    /// Component filters such as `country` or `postal_code`.
    pub components: BTreeMap<String, String>,
    /// Viewport to bias results towards.
    pub bounds: Option<LatLngBounds>,
    /// Region code (ccTLD) to bias results towards.
    pub region: Option<String>,
    /// Point to reverse geocode.
    pub latlng: Option<LatLng>,
    /// Reverse geocoding: keep only these address types.
    pub result_type: Vec<String>,
    /// Reverse geocoding: keep only these location types.
    pub location_type: Vec<String>,
    /// Place to look up.
    pub place_id: Option<String>,
    /// Language of the results.
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    /// `ROOFTOP`, `RANGE_INTERPOLATED`, `GEOMETRIC_CENTER` or `APPROXIMATE`.
    pub location_type: String,
    pub viewport: LatLngBounds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<LatLngBounds>,
}

/// One geocoding match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingResult {
    pub address_components: Vec<AddressComponent>,
    pub formatted_address: String,
    pub geometry: Geometry,
    pub place_id: String,
    #[serde(default)]
    pub types: Vec<String>,
    /// The match is partial, e.g. a misspelled street.
    #[serde(default)]
    pub partial_match: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postcode_localities: Vec<String>,
}

/// Payload of a geocoding response.
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Vec<GeocodingResult>,
}

impl GeocodingRequest {
    /// Forward geocode an address.
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    /// Reverse geocode a point.
    pub fn reverse(latlng: LatLng) -> Self {
        Self {
            latlng: Some(latlng),
            ..Default::default()
        }
    }

    /// Look up a place id.
    pub fn place(place_id: impl Into<String>) -> Self {
        Self {
            place_id: Some(place_id.into()),
            ..Default::default()
        }
    }

    /// Add a component filter.
    pub fn component(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(name.into(), value.into());
        self
    }

    /// Set the result language.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Send the request.
    pub fn get(&self, ctx: &Context) -> Result<Vec<GeocodingResult>> {
        ctx.request(self)
    }

    /// Send the request, giving up when `cancel` fires.
    pub fn get_with_cancel(
        &self,
        ctx: &Context,
        cancel: &CancelToken,
    ) -> Result<Vec<GeocodingResult>> {
        ctx.request_with_cancel(self, cancel)
    }

    fn is_forward(&self) -> bool {
        self.address.is_some() || !self.components.is_empty()
    }
}

impl ApiRequest for GeocodingRequest {
    type Response = GeocodingResponse;
    type Output = Vec<GeocodingResult>;
    const PATH: &'static str = "/maps/api/geocode/json";

    fn validate(&self) -> Result<()> {
        let modes = [
            self.is_forward(),
            self.latlng.is_some(),
            self.place_id.is_some(),
        ];
        match modes.iter().filter(|m| **m).count() {
            0 => {
                return Err(MapsError::Validation(
                    "missing address, components, latlng or place_id".to_string(),
                ))
            }
            1 => {}
            _ => {
                return Err(MapsError::Validation(
                    "address/components, latlng and place_id are mutually exclusive".to_string(),
                ))
            }
        }

        if matches!(&self.address, Some(a) if a.trim().is_empty()) {
            return Err(MapsError::Validation("address is empty".to_string()));
        }
        if matches!(&self.place_id, Some(p) if p.trim().is_empty()) {
            return Err(MapsError::Validation("place_id is empty".to_string()));
        }
        if let Some(latlng) = &self.latlng {
            latlng.validate()?;
        }
        if let Some(bounds) = &self.bounds {
            bounds.southwest.validate()?;
            bounds.northeast.validate()?;
        }
        if self.latlng.is_none() && !(self.result_type.is_empty() && self.location_type.is_empty())
        {
            return Err(MapsError::Validation(
                "result_type and location_type only apply to reverse geocoding".to_string(),
            ));
        }
        Ok(())
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        if let Some(address) = &self.address {
            params.push(("address", address.clone()));
        }
        if !self.components.is_empty() {
            let components = self
                .components
                .iter()
                .map(|(k, v)| format!("{}:{}", k, v))
                .collect::<Vec<_>>()
                .join("|");
            params.push(("components", components));
        }
        if let Some(bounds) = &self.bounds {
            params.push(("bounds", bounds.to_string()));
        }
        if let Some(region) = &self.region {
            params.push(("region", region.clone()));
        }
        if let Some(latlng) = &self.latlng {
            params.push(("latlng", latlng.to_string()));
        }
        if !self.result_type.is_empty() {
            params.push(("result_type", self.result_type.join("|")));
        }
        if !self.location_type.is_empty() {
            params.push(("location_type", self.location_type.join("|")));
        }
        if let Some(place_id) = &self.place_id {
            params.push(("place_id", place_id.clone()));
        }
        if let Some(language) = &self.language {
            params.push(("language", language.clone()));
        }
        params
    }

    fn into_output(&self, response: GeocodingResponse) -> Result<Vec<GeocodingResult>> {
        Ok(response.results)
    }
}
