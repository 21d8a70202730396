use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use mapsapi::geojson::add_elevations_to_geometry;
use mapsapi::{get_elevations_with_progress, LatLng};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::ConnectionArgs;

pub fn run(
    connection: &ConnectionArgs,
    input: PathBuf,
    output: Option<PathBuf>,
    lat_col: String,
    lng_col: String,
) -> Result<()> {
    let ctx = connection.context()?;

    // Detect file format
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => process_csv(&ctx, &input, output, &lat_col, &lng_col),
        "geojson" | "json" => process_geojson(&ctx, &input, output),
        _ => bail!(
            "Unsupported file format: {}. Use .csv or .geojson",
            extension
        ),
    }
}

fn progress_bar(len: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn default_output(input: &Path, extension: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}_elevation.{}", stem, extension))
}

fn process_csv(
    ctx: &mapsapi::Context,
    input: &Path,
    output: Option<PathBuf>,
    lat_col: &str,
    lng_col: &str,
) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    // Find column indices
    let headers = reader.headers()?.clone();
    let lat_idx = headers
        .iter()
        .position(|h| h == lat_col)
        .with_context(|| format!("Column '{}' not found in CSV", lat_col))?;
    let lng_idx = headers
        .iter()
        .position(|h| h == lng_col)
        .with_context(|| format!("Column '{}' not found in CSV", lng_col))?;

    let records: Vec<_> = reader.records().collect::<Result<_, _>>()?;

    let points = records
        .iter()
        .enumerate()
        .map(|(row, record)| parse_row(record, lat_idx, lng_idx, row + 2))
        .collect::<Result<Vec<_>>>()?;

    info!(points = points.len(), input = %input.display(), "Processing CSV");
    let pb = progress_bar(points.len() as u64)?;
    let results = get_elevations_with_progress(ctx, &points, |done| pb.set_position(done as u64))
        .context("Failed to get elevations")?;
    pb.finish_with_message("done");

    // Prepare output
    let output_path = output.unwrap_or_else(|| default_output(input, "csv"));
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(output_file));

    let mut new_headers: Vec<&str> = headers.iter().collect();
    new_headers.push("elevation");
    writer.write_record(&new_headers)?;

    for (record, result) in records.iter().zip(&results) {
        let elevation = format!("{:.2}", result.elevation);
        let mut new_record: Vec<&str> = record.iter().collect();
        new_record.push(&elevation);
        writer.write_record(&new_record)?;
    }

    writer.flush()?;

    println!("Output written to: {}", output_path.display());
    Ok(())
}

/// Parse one CSV row; `line` is the 1-based line number for messages.
fn parse_row(record: &csv::StringRecord, lat_idx: usize, lng_idx: usize, line: usize) -> Result<LatLng> {
    let lat: f64 = record
        .get(lat_idx)
        .with_context(|| format!("Missing latitude on line {}", line))?
        .trim()
        .parse()
        .with_context(|| format!("Invalid latitude on line {}", line))?;
    let lng: f64 = record
        .get(lng_idx)
        .with_context(|| format!("Missing longitude on line {}", line))?
        .trim()
        .parse()
        .with_context(|| format!("Invalid longitude on line {}", line))?;
    Ok(LatLng::new(lat, lng))
}

fn process_geojson(ctx: &mapsapi::Context, input: &Path, output: Option<PathBuf>) -> Result<()> {
    let file = File::open(input).context("Failed to open input file")?;
    let reader = BufReader::new(file);

    let geojson: geojson::GeoJson =
        serde_json::from_reader(reader).context("Failed to parse GeoJSON")?;

    let result = match geojson {
        geojson::GeoJson::Geometry(geometry) => {
            geojson::GeoJson::Geometry(add_elevations_to_geometry(ctx, geometry)?)
        }
        geojson::GeoJson::Feature(mut feature) => {
            if let Some(geometry) = feature.geometry.take() {
                feature.geometry = Some(add_elevations_to_geometry(ctx, geometry)?);
            }
            geojson::GeoJson::Feature(feature)
        }
        geojson::GeoJson::FeatureCollection(mut fc) => {
            info!(features = fc.features.len(), "Processing feature collection");
            let pb = progress_bar(fc.features.len() as u64)?;
            for feature in &mut fc.features {
                if let Some(geometry) = feature.geometry.take() {
                    feature.geometry = Some(add_elevations_to_geometry(ctx, geometry)?);
                }
                pb.inc(1);
            }
            pb.finish_with_message("done");
            geojson::GeoJson::FeatureCollection(fc)
        }
    };

    // Write output
    let output_path = output.unwrap_or_else(|| default_output(input, "geojson"));
    let output_file = File::create(&output_path).context("Failed to create output file")?;
    let mut writer = BufWriter::new(output_file);
    serde_json::to_writer_pretty(&mut writer, &result)?;
    writer.flush()?;

    println!("Output written to: {}", output_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row() {
        let record = csv::StringRecord::from(vec!["a", " 39.7391536", "-104.9847034 "]);
        let point = parse_row(&record, 1, 2, 2).unwrap();
        assert_eq!(point, LatLng::new(39.7391536, -104.9847034));

        let err = parse_row(&record, 0, 2, 7).unwrap_err();
        assert!(err.to_string().contains("line 7"));
    }

    #[test]
    fn test_default_output() {
        let path = default_output(Path::new("/data/track.csv"), "csv");
        assert_eq!(path, PathBuf::from("/data/track_elevation.csv"));
    }
}
