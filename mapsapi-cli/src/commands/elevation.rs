use anyhow::{Context, Result};
use mapsapi::ElevationRequest;

use super::{parse_points, ConnectionArgs};

pub fn run(
    connection: &ConnectionArgs,
    locations: Vec<String>,
    path: Vec<String>,
    samples: Option<u32>,
    json: bool,
) -> Result<()> {
    let ctx = connection.context()?;

    let request = if path.is_empty() {
        ElevationRequest::for_locations(parse_points(&locations)?)
    } else {
        ElevationRequest::for_path(parse_points(&path)?, samples.unwrap_or(0))
    };

    let results = request.get(&ctx).context("Failed to get elevation")?;

    if json {
        println!("{}", serde_json::to_string(&results)?);
    } else if results.is_empty() {
        println!("no results");
    } else {
        for result in &results {
            println!(
                "{}\t{:.2}\t(resolution {:.1}m)",
                result.location, result.elevation, result.resolution
            );
        }
    }

    Ok(())
}
