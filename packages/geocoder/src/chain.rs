//! Priority-ordered execution of the configured geocoding providers.

use log::{debug, warn};

use crate::{
    GeocodeError, GeocodedPostcode, PostcodeGeocoder, cache::GeocodeCache, nominatim, postcode,
    postcodes_io,
    registry::{GeocodingService, ProviderConfig, enabled_services},
};

/// Runs the enabled geocoding services in priority order, first match wins.
///
/// Lookups go through the injected [`GeocodeCache`] (hits *and* misses are
/// cached). A provider that fails with a transport error is skipped when a
/// later provider has a match; if every provider misses and at least one
/// failed, the failure propagates so callers can distinguish "unknown
/// postcode" from "provider unreachable".
pub struct ChainGeocoder {
    client: reqwest::Client,
    services: Vec<GeocodingService>,
    cache: GeocodeCache,
}

impl ChainGeocoder {
    /// Creates a chain over an explicit service list.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        services: Vec<GeocodingService>,
        cache: GeocodeCache,
    ) -> Self {
        Self {
            client,
            services,
            cache,
        }
    }

    /// Creates a chain over the embedded service registry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client fails to build.
    pub fn from_registry(cache: GeocodeCache) -> Result<Self, GeocodeError> {
        Ok(Self::new(
            crate::default_client()?,
            enabled_services(),
            cache,
        ))
    }

    async fn query_provider(
        &self,
        service: &GeocodingService,
        normalized: &str,
    ) -> Result<Option<GeocodedPostcode>, GeocodeError> {
        match &service.provider {
            ProviderConfig::PostcodesIo { base_url, .. } => {
                postcodes_io::geocode_postcode(&self.client, base_url, normalized).await
            }
            ProviderConfig::Nominatim {
                base_url,
                country_codes,
                ..
            } => nominatim::geocode_postcode(&self.client, base_url, country_codes, normalized)
                .await,
        }
    }
}

#[async_trait::async_trait]
impl PostcodeGeocoder for ChainGeocoder {
    async fn geocode(&self, raw: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
        let normalized = postcode::normalize(raw);

        if let Some(cached) = self.cache.get(&normalized) {
            debug!("Geocode cache hit for {normalized}");
            return Ok(cached);
        }

        let mut last_error: Option<GeocodeError> = None;

        for service in &self.services {
            match self.query_provider(service, &normalized).await {
                Ok(Some(result)) => {
                    debug!("Provider {} resolved {normalized}", service.id);
                    self.cache.insert(&normalized, Some(result.clone()));
                    return Ok(Some(result));
                }
                Ok(None) => {
                    debug!("Provider {} had no match for {normalized}", service.id);
                }
                Err(e) => {
                    warn!("Provider {} failed for {normalized}: {e}", service.id);
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            return Err(e);
        }

        self.cache.insert(&normalized, None);
        Ok(None)
    }
}
