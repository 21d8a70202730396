use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::ConnectionArgs;

/// Maps web services CLI tool
#[derive(Parser)]
#[command(name = "mapsapi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query elevation at points or along a path
    Elevation {
        /// Point as LAT,LNG (repeatable)
        #[arg(short, long = "location", value_name = "LAT,LNG", required_unless_present = "path")]
        locations: Vec<String>,

        /// Path vertex as LAT,LNG (repeatable, at least two)
        #[arg(short, long, value_name = "LAT,LNG", conflicts_with = "locations", requires = "samples")]
        path: Vec<String>,

        /// Number of samples along the path
        #[arg(short, long)]
        samples: Option<u32>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Geocode an address, reverse geocode a point, or look up a place id
    Geocode {
        /// Address to geocode
        #[arg(short, long, group = "mode")]
        address: Option<String>,

        /// Point to reverse geocode, as LAT,LNG
        #[arg(long, value_name = "LAT,LNG", group = "mode")]
        latlng: Option<String>,

        /// Place id to look up
        #[arg(long, group = "mode")]
        place_id: Option<String>,

        /// Component filter as NAME:VALUE (repeatable)
        #[arg(short, long = "component", value_name = "NAME:VALUE")]
        components: Vec<String>,

        /// Region bias (ccTLD, e.g. "es")
        #[arg(long)]
        region: Option<String>,

        /// Result language
        #[arg(long)]
        language: Option<String>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Look up the time zone of a point
    Timezone {
        /// Point as LAT,LNG
        #[arg(short, long, value_name = "LAT,LNG")]
        location: String,

        /// Seconds since the Unix epoch (defaults to now)
        #[arg(short, long)]
        timestamp: Option<u64>,

        /// Result language
        #[arg(long)]
        language: Option<String>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Add elevation to every coordinate in a file
    Batch {
        /// Input file (CSV or GeoJSON)
        input: PathBuf,

        /// Output file (same format as input if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude (CSV only)
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude (CSV only)
        #[arg(long, default_value = "lng")]
        lng_col: String,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapsapi=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Elevation {
            locations,
            path,
            samples,
            json,
        } => commands::elevation::run(&cli.connection, locations, path, samples, json),
        Commands::Geocode {
            address,
            latlng,
            place_id,
            components,
            region,
            language,
            json,
        } => commands::geocode::run(
            &cli.connection,
            commands::geocode::Lookup {
                address,
                latlng,
                place_id,
                components,
                region,
                language,
            },
            json,
        ),
        Commands::Timezone {
            location,
            timestamp,
            language,
            json,
        } => commands::timezone::run(&cli.connection, location, timestamp, language, json),
        Commands::Batch {
            input,
            output,
            lat_col,
            lng_col,
        } => commands::batch::run(&cli.connection, input, output, lat_col, lng_col),
    }
}
