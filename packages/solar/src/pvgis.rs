//! PVGIS irradiance client.
//!
//! Queries the European Commission's PVGIS `PVcalc` endpoint for the
//! annual energy yield of a 1 kWp system at a coordinate, with system
//! loss set to zero — losses are applied separately by the estimator as
//! the configured system efficiency.
//!
//! See <https://joint-research-centre.ec.europa.eu/pvgis-online-tool_en>

use ecoscore_home_models::Coordinate;

use crate::{IrradianceProvider, SolarError};

/// Public PVGIS API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://re.jrc.ec.europa.eu/api/v5_2/PVcalc";

/// Irradiance provider backed by the PVGIS API.
pub struct PvgisClient {
    client: reqwest::Client,
    base_url: String,
}

impl PvgisClient {
    /// Creates a client against the given PVGIS endpoint.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url,
        }
    }

    /// Creates a client against the public PVGIS endpoint with a bounded
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SolarError::Http`] if the HTTP client fails to build.
    pub fn public() -> Result<Self, SolarError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()?;
        Ok(Self::new(client, DEFAULT_BASE_URL.to_string()))
    }
}

#[async_trait::async_trait]
impl IrradianceProvider for PvgisClient {
    async fn annual_yield_kwh_per_kwp(&self, location: Coordinate) -> Result<f64, SolarError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("peakpower", "1".to_string()),
                ("loss", "0".to_string()),
                ("outputformat", "json".to_string()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SolarError::Upstream {
                message: format!("PVGIS returned status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Extracts the annual yield (`E_y`, kWh/yr for 1 kWp) from a PVGIS
/// `PVcalc` response.
fn parse_response(body: &serde_json::Value) -> Result<f64, SolarError> {
    body["outputs"]["totals"]["fixed"]["E_y"]
        .as_f64()
        .filter(|yield_kwh| *yield_kwh >= 0.0)
        .ok_or_else(|| SolarError::Upstream {
            message: "Missing outputs.totals.fixed.E_y in PVGIS response".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_annual_yield() {
        let body = serde_json::json!({
            "outputs": {
                "totals": {
                    "fixed": { "E_d": 2.61, "E_m": 79.4, "E_y": 952.74 }
                }
            }
        });
        let yield_kwh = parse_response(&body).unwrap();
        assert!((yield_kwh - 952.74).abs() < 1e-9);
    }

    #[test]
    fn missing_totals_is_an_upstream_error() {
        let body = serde_json::json!({ "outputs": {} });
        assert!(matches!(
            parse_response(&body),
            Err(SolarError::Upstream { .. })
        ));
    }

    #[test]
    fn negative_yield_is_rejected() {
        let body = serde_json::json!({
            "outputs": { "totals": { "fixed": { "E_y": -3.0 } } }
        });
        assert!(matches!(
            parse_response(&body),
            Err(SolarError::Upstream { .. })
        ));
    }
}
