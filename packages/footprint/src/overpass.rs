//! Overpass API footprint provider client.
//!
//! Queries `OpenStreetMap` building ways within a radius of a coordinate
//! using an `around` filter and `out geom`, which inlines the way
//! geometry into the response.
//!
//! See <https://wiki.openstreetmap.org/wiki/Overpass_API>

use ecoscore_home_models::Coordinate;

use crate::{FootprintError, FootprintProvider, RawFootprint};

/// Public Overpass API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://overpass-api.de/api/interpreter";

/// Footprint provider backed by an Overpass API instance.
pub struct OverpassClient {
    client: reqwest::Client,
    base_url: String,
}

impl OverpassClient {
    /// Creates a client against the given Overpass endpoint.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
        }
    }

    /// Creates a client against the public Overpass endpoint with the
    /// bounded default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FootprintError::Http`] if the HTTP client fails to build.
    pub fn public() -> Result<Self, FootprintError> {
        let client = reqwest::Client::builder()
            .timeout(ecoscore_geocoder::DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self::new(client, DEFAULT_BASE_URL.to_string()))
    }
}

#[async_trait::async_trait]
impl FootprintProvider for OverpassClient {
    async fn nearby_footprints(
        &self,
        center: Coordinate,
        radius_m: f64,
    ) -> Result<Vec<RawFootprint>, FootprintError> {
        let query = format!(
            "[out:json][timeout:5];way(around:{radius_m},{lat},{lon})[\"building\"];out geom;",
            lat = center.latitude,
            lon = center.longitude,
        );

        let resp = self
            .client
            .post(&self.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FootprintError::Parse {
                message: format!("Overpass returned status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses an Overpass `out geom` response into raw footprints.
///
/// Non-way elements and ways without geometry are skipped.
fn parse_response(body: &serde_json::Value) -> Result<Vec<RawFootprint>, FootprintError> {
    let elements = body["elements"]
        .as_array()
        .ok_or_else(|| FootprintError::Parse {
            message: "Overpass response has no elements array".to_string(),
        })?;

    let mut footprints = Vec::new();

    for element in elements {
        if element["type"].as_str() != Some("way") {
            continue;
        }
        let Some(geometry) = element["geometry"].as_array() else {
            continue;
        };

        let ring: Vec<Coordinate> = geometry
            .iter()
            .filter_map(|vertex| {
                let lat = vertex["lat"].as_f64()?;
                let lon = vertex["lon"].as_f64()?;
                Some(Coordinate::new(lat, lon))
            })
            .collect();

        if ring.is_empty() {
            continue;
        }

        let building_tag = element["tags"]["building"]
            .as_str()
            .filter(|tag| !tag.is_empty())
            .map(String::from);

        footprints.push(RawFootprint {
            ring,
            building_tag,
        });
    }

    Ok(footprints)
}
