use anyhow::{Context, Result};
use mapsapi::{GeocodingRequest, LatLng};

use super::ConnectionArgs;

/// Geocoding flags as given on the command line.
pub struct Lookup {
    pub address: Option<String>,
    pub latlng: Option<String>,
    pub place_id: Option<String>,
    pub components: Vec<String>,
    pub region: Option<String>,
    pub language: Option<String>,
}

impl Lookup {
    fn into_request(self) -> Result<GeocodingRequest> {
        let latlng = self
            .latlng
            .as_deref()
            .map(|v| {
                v.parse::<LatLng>()
                    .with_context(|| format!("Invalid coordinate '{}'", v))
            })
            .transpose()?;

        let mut request = GeocodingRequest {
            address: self.address,
            latlng,
            place_id: self.place_id,
            region: self.region,
            language: self.language,
            ..Default::default()
        };
        for component in &self.components {
            let (name, value) = component
                .split_once(':')
                .with_context(|| format!("Component '{}' is not NAME:VALUE", component))?;
            request.components.insert(name.to_string(), value.to_string());
        }
        Ok(request)
    }
}

pub fn run(connection: &ConnectionArgs, lookup: Lookup, json: bool) -> Result<()> {
    let request = lookup.into_request()?;
    let ctx = connection.context()?;

    let results = request.get(&ctx).context("Failed to geocode")?;

    if json {
        println!("{}", serde_json::to_string(&results)?);
    } else if results.is_empty() {
        println!("no results");
    } else {
        for result in &results {
            println!(
                "{}\t{}\t{}",
                result.geometry.location, result.formatted_address, result.place_id
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> Lookup {
        Lookup {
            address: None,
            latlng: None,
            place_id: None,
            components: Vec::new(),
            region: None,
            language: None,
        }
    }

    #[test]
    fn test_reverse_lookup() {
        let request = Lookup {
            latlng: Some("40.714224,-73.961452".to_string()),
            ..lookup()
        }
        .into_request()
        .unwrap();
        assert_eq!(request.latlng, Some(LatLng::new(40.714224, -73.961452)));
    }

    #[test]
    fn test_components() {
        let request = Lookup {
            components: vec!["country:ES".to_string(), "postal_code:28013".to_string()],
            ..lookup()
        }
        .into_request()
        .unwrap();
        assert_eq!(request.components["country"], "ES");
        assert_eq!(request.components["postal_code"], "28013");

        let result = Lookup {
            components: vec!["country".to_string()],
            ..lookup()
        }
        .into_request();
        assert!(result.is_err());
    }
}
