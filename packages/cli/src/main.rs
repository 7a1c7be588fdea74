#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line interface for the `EcoScore` estimation pipeline.
//!
//! One subcommand per core boundary operation, wired against the live
//! provider endpoints. Each stage of the pipeline is independently
//! callable when its inputs are already known: `resolve` goes from a
//! postcode or coordinate to a footprint, `roof` and `solar` take
//! explicit inputs, and `score` computes a score from a baseline and a
//! set of logged improvement categories. Results are printed as JSON.

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use ecoscore_config::Calibration;
use ecoscore_footprint::{overpass::OverpassClient, resolver::BuildingResolver};
use ecoscore_geocoder::{cache::GeocodeCache, chain::ChainGeocoder};
use ecoscore_home_models::{Coordinate, HomeRecord, Improvement, ImprovementCategory, PropertyType};
use ecoscore_score::compute_score;
use ecoscore_solar::{
    estimator::SolarPotentialEstimator, pvgis::PvgisClient, roof::estimate_roof_capacity,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "ecoscore", about = "Home energy scoring and solar estimation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a building footprint from a postcode or coordinate.
    Resolve {
        /// Postcode to geocode.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        postcode: Option<String>,
        /// Latitude in decimal degrees.
        #[arg(long, requires = "lon")]
        lat: Option<f64>,
        /// Longitude in decimal degrees.
        #[arg(long, requires = "lat")]
        lon: Option<f64>,
        /// Declared total floor area in m², used to infer floor count.
        #[arg(long)]
        floor_area: Option<f64>,
    },
    /// Estimate usable rooftop area.
    Roof {
        /// Total internal floor area in m².
        #[arg(long)]
        floor_area: f64,
        /// Number of floors.
        #[arg(long, default_value_t = 1)]
        floors: u32,
        /// Property type (e.g. detached, terraced, flat).
        #[arg(long, default_value = "other")]
        property_type: String,
    },
    /// Estimate rooftop solar potential.
    Solar {
        /// Latitude in decimal degrees.
        #[arg(long)]
        lat: f64,
        /// Longitude in decimal degrees.
        #[arg(long)]
        lon: f64,
        /// Usable roof area in m².
        #[arg(long)]
        roof_area: f64,
        /// Declared installed capacity in kWp.
        #[arg(long)]
        peak_power: Option<f64>,
    },
    /// Compute a score from a baseline and improvement categories.
    Score {
        /// Baseline EPC-style efficiency rating, 0-100.
        #[arg(long)]
        baseline: u8,
        /// Comma-separated improvement categories
        /// (e.g. HEAT_PUMP,GLAZING).
        #[arg(long, value_delimiter = ',')]
        categories: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), String> {
    let calibration = Calibration::from_env().map_err(|e| e.to_string())?;

    match command {
        Command::Resolve {
            postcode,
            lat,
            lon,
            floor_area,
        } => {
            let geocoder = ChainGeocoder::from_registry(GeocodeCache::default())
                .map_err(|e| e.to_string())?;
            let footprints = OverpassClient::public().map_err(|e| e.to_string())?;
            let resolver = BuildingResolver::new(Arc::new(geocoder), Arc::new(footprints));

            let coordinate = match (postcode, lat, lon) {
                (_, Some(lat), Some(lon)) => Coordinate::new(lat, lon),
                (Some(postcode), _, _) => resolver
                    .resolve_postcode(&postcode)
                    .await
                    .map_err(|e| e.to_string())?,
                _ => return Err("Provide either --postcode or --lat and --lon".to_string()),
            };

            let footprint = resolver
                .resolve(coordinate, floor_area)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&footprint)
        }
        Command::Roof {
            floor_area,
            floors,
            property_type,
        } => {
            let property_type = property_type
                .trim()
                .to_uppercase()
                .replace(['-', ' '], "_")
                .parse()
                .unwrap_or(PropertyType::Other);
            let estimate = estimate_roof_capacity(
                floor_area,
                floors,
                property_type,
                &calibration.roof_fractions,
            )
            .map_err(|e| e.to_string())?;
            print_json(&estimate)
        }
        Command::Solar {
            lat,
            lon,
            roof_area,
            peak_power,
        } => {
            let irradiance = PvgisClient::public().map_err(|e| e.to_string())?;
            let estimator =
                SolarPotentialEstimator::new(Arc::new(irradiance), calibration.solar);
            let result = estimator
                .estimate(Coordinate::new(lat, lon), roof_area, peak_power)
                .await
                .map_err(|e| e.to_string())?;
            print_json(&result)
        }
        Command::Score {
            baseline,
            categories,
        } => {
            let categories = categories
                .iter()
                .filter(|raw| !raw.trim().is_empty())
                .map(|raw| {
                    raw.trim()
                        .to_uppercase()
                        .replace(['-', ' '], "_")
                        .parse::<ImprovementCategory>()
                        .map_err(|_| format!("Unknown improvement category: {raw}"))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let home = synthetic_home(baseline);
            let improvements: Vec<Improvement> = categories
                .into_iter()
                .map(|category| synthetic_improvement(home.id, baseline, category))
                .collect();

            let score = compute_score(&home, &improvements, &calibration.score_deltas)
                .map_err(|e| e.to_string())?;
            print_json(&serde_json::json!({ "score": score }))
        }
    }
}

/// A minimal home record carrying just the fields the engine reads.
fn synthetic_home(baseline: u8) -> HomeRecord {
    HomeRecord {
        id: Uuid::new_v4(),
        address: String::new(),
        postcode: String::new(),
        coordinate: None,
        total_floor_area_m2: None,
        baseline_efficiency: Some(baseline),
        current_score: baseline,
        score_updated_at: Utc::now(),
    }
}

fn synthetic_improvement(
    home_id: Uuid,
    baseline: u8,
    category: ImprovementCategory,
) -> Improvement {
    Improvement {
        id: Uuid::new_v4(),
        home_id,
        logged_by: "cli".to_string(),
        category,
        cost: 0.0,
        grant_amount: None,
        estimated_annual_saving: 0.0,
        before_score: baseline,
        after_score: baseline,
        completed_on: Utc::now().date_naive(),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{rendered}");
    Ok(())
}
