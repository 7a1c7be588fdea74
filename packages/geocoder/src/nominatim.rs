//! Nominatim / OpenStreetMap geocoder client.
//!
//! Used as a fallback when the postcode lookup API has no match.
//! Nominatim has strict rate limits: **1 request per second** maximum on
//! the public instance (see `rate_limit_ms` in the service TOML
//! configuration).
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use ecoscore_home_models::Coordinate;

use crate::{GeocodeError, GeocodedPostcode, GeocodingProvider};

/// Geocodes a postcode using the Nominatim structured search endpoint.
///
/// The caller is responsible for rate limiting.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the HTTP request or response parsing fails.
pub async fn geocode_postcode(
    client: &reqwest::Client,
    base_url: &str,
    country_codes: &str,
    postcode: &str,
) -> Result<Option<GeocodedPostcode>, GeocodeError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("postalcode", postcode),
            ("countrycodes", country_codes),
            ("format", "jsonv2"),
            ("limit", "1"),
        ])
        .send()
        .await?;

    if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(GeocodeError::RateLimited);
    }

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPostcode>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let display_name = first["display_name"].as_str().map(String::from);

    Ok(Some(GeocodedPostcode {
        coordinate: Coordinate::new(lat, lon),
        matched_postcode: display_name,
        provider: GeocodingProvider::Nominatim,
    }))
}
