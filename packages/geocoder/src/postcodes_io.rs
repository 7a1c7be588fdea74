//! postcodes.io geocoder client.
//!
//! Free UK postcode lookup API with exact matches and no API key. Used as
//! the primary provider; see `services/postcodes_io.toml`.
//!
//! See <https://postcodes.io/docs>

use ecoscore_home_models::Coordinate;

use crate::{GeocodeError, GeocodedPostcode, GeocodingProvider, postcode};

/// Looks up a single postcode.
///
/// Returns `Ok(None)` when the API reports the postcode as unknown (404).
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode_postcode(
    client: &reqwest::Client,
    base_url: &str,
    raw_postcode: &str,
) -> Result<Option<GeocodedPostcode>, GeocodeError> {
    let compact = postcode::compact(raw_postcode);
    let url = format!("{base_url}/postcodes/{compact}");

    let resp = client.get(&url).send().await?;

    if resp.status() == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }
    if !resp.status().is_success() {
        return Err(GeocodeError::Parse {
            message: format!("postcodes.io returned status {}", resp.status()),
        });
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a postcodes.io lookup response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPostcode>, GeocodeError> {
    let result = &body["result"];
    if result.is_null() {
        return Ok(None);
    }

    let latitude = result["latitude"]
        .as_f64()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing latitude in postcodes.io response".to_string(),
        })?;

    let longitude = result["longitude"]
        .as_f64()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing longitude in postcodes.io response".to_string(),
        })?;

    let matched = result["postcode"].as_str().map(String::from);

    Ok(Some(GeocodedPostcode {
        coordinate: Coordinate::new(latitude, longitude),
        matched_postcode: matched,
        provider: GeocodingProvider::PostcodesIo,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lookup_result() {
        let body = serde_json::json!({
            "status": 200,
            "result": {
                "postcode": "TV1 2AB",
                "latitude": 51.5074,
                "longitude": -0.1278
            }
        });
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.coordinate.latitude - 51.5074).abs() < 1e-6);
        assert!((result.coordinate.longitude - -0.1278).abs() < 1e-6);
        assert_eq!(result.matched_postcode.as_deref(), Some("TV1 2AB"));
        assert_eq!(result.provider, GeocodingProvider::PostcodesIo);
    }

    #[test]
    fn parses_null_result_as_miss() {
        let body = serde_json::json!({ "status": 200, "result": null });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn missing_coordinates_are_a_parse_error() {
        let body = serde_json::json!({
            "status": 200,
            "result": { "postcode": "TV1 2AB" }
        });
        assert!(matches!(
            parse_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }
}
