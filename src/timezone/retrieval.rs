//! Timezone retrieval: address → coordinate → timezone identifier.
//!
//! Two capability seams: [`TimezoneLookup`] maps a coordinate to a
//! timezone id (concrete provider behind it), and [`TimezoneRetrieval`]
//! is what the pipeline consumes. [`GeoTimezoneService`] composes the
//! location service with a lookup to implement the latter.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono_tz::Tz;
use serde::Deserialize;

use crate::api::{ApiResponse, STATUS_NOT_FOUND};
use crate::location::{Address, GeoCoordinate, LocationService, ProviderError};

/// Maps a coordinate to a timezone identifier.
#[async_trait]
pub trait TimezoneLookup: Send + Sync {
    async fn find_by_coordinate(&self, coordinate: GeoCoordinate) -> ApiResponse<String>;
}

/// Resolves addresses to timezone identifiers; the pipeline's view.
#[async_trait]
pub trait TimezoneRetrieval: Send + Sync {
    async fn resolve(&self, address: &Address) -> ApiResponse<String>;

    /// Output preserves input order and cardinality.
    async fn resolve_batch(&self, addresses: &[Address]) -> Vec<ApiResponse<String>>;
}

/// Timezone retrieval backed by geocoding plus a coordinate lookup.
pub struct GeoTimezoneService {
    locations: LocationService,
    lookup: Arc<dyn TimezoneLookup>,
}

impl GeoTimezoneService {
    pub fn new(locations: LocationService, lookup: Arc<dyn TimezoneLookup>) -> Self {
        Self { locations, lookup }
    }

    async fn lookup_coordinate(
        &self,
        resolved: ApiResponse<GeoCoordinate>,
    ) -> ApiResponse<String> {
        match resolved {
            ApiResponse::Success { value, .. } => self.lookup.find_by_coordinate(value).await,
            ApiResponse::Error {
                status_code,
                message,
            } => ApiResponse::error(status_code, message),
        }
    }
}

#[async_trait]
impl TimezoneRetrieval for GeoTimezoneService {
    async fn resolve(&self, address: &Address) -> ApiResponse<String> {
        let resolved = self.locations.resolve(address).await;
        self.lookup_coordinate(resolved).await
    }

    async fn resolve_batch(&self, addresses: &[Address]) -> Vec<ApiResponse<String>> {
        let resolved = self.locations.resolve_batch(addresses).await;
        let mut results = Vec::with_capacity(resolved.len());
        for coordinate in resolved {
            results.push(self.lookup_coordinate(coordinate).await);
        }
        results
    }
}

// ─── HTTP lookup ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimezoneByCoordinateBody {
    time_zone: Option<String>,
}

/// Reqwest-backed coordinate→timezone lookup.
pub struct HttpTimezoneApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTimezoneApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TimezoneLookup for HttpTimezoneApi {
    async fn find_by_coordinate(&self, coordinate: GeoCoordinate) -> ApiResponse<String> {
        let url = format!("{}/api/timezone/coordinate", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", coordinate.latitude),
                ("longitude", coordinate.longitude),
            ])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                let err = ProviderError::Transport(e.to_string());
                return ApiResponse::error(err.status_code(), err.to_string());
            }
        };
        if !response.status().is_success() {
            let status = response.status().as_u16();
            return ApiResponse::error(
                status,
                format!("the timezone lookup failed with status {}", status),
            );
        }

        let body: TimezoneByCoordinateBody = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                let err = ProviderError::Decode(e.to_string());
                return ApiResponse::error(err.status_code(), err.to_string());
            }
        };

        match body.time_zone {
            // The identifier is only valid if the timezone database knows it.
            Some(id) if id.parse::<Tz>().is_ok() => ApiResponse::success(id),
            Some(id) => {
                tracing::warn!(id = %id, "provider returned an unknown timezone id");
                ApiResponse::error(
                    STATUS_NOT_FOUND,
                    format!("The timezone {} is not a known timezone.", id),
                )
            }
            None => ApiResponse::error(
                STATUS_NOT_FOUND,
                format!("No timezone found for the coordinate {}.", coordinate),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::GeocodingProvider;

    struct StubProvider;

    #[async_trait]
    impl GeocodingProvider for StubProvider {
        async fn search_one(&self, address: &Address) -> ApiResponse<GeoCoordinate> {
            if address.city == "Stockholm" {
                ApiResponse::success(GeoCoordinate::new(59.3293, 18.0686))
            } else {
                ApiResponse::error(404, format!("The address {} could not be found.", address))
            }
        }

        async fn search_batch(&self, addresses: &[Address]) -> Vec<ApiResponse<GeoCoordinate>> {
            let mut results = Vec::with_capacity(addresses.len());
            for address in addresses {
                results.push(self.search_one(address).await);
            }
            results
        }
    }

    struct StubLookup;

    #[async_trait]
    impl TimezoneLookup for StubLookup {
        async fn find_by_coordinate(&self, coordinate: GeoCoordinate) -> ApiResponse<String> {
            if coordinate.latitude > 0.0 {
                ApiResponse::success("Europe/Stockholm".to_string())
            } else {
                ApiResponse::error(404, "no timezone")
            }
        }
    }

    fn service() -> GeoTimezoneService {
        GeoTimezoneService::new(
            LocationService::new(Arc::new(StubProvider)),
            Arc::new(StubLookup),
        )
    }

    fn city(name: &str) -> Address {
        Address {
            city: name.into(),
            ..Address::default()
        }
    }

    #[tokio::test]
    async fn test_resolve_chains_geocoding_and_lookup() {
        let response = service().resolve(&city("Stockholm")).await;
        assert_eq!(response, ApiResponse::success("Europe/Stockholm".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_propagates_geocoding_error_unchanged() {
        let response = service().resolve(&city("Atlantis")).await;
        assert_eq!(
            response,
            ApiResponse::error(404, "The address Atlantis could not be found.")
        );
    }

    #[tokio::test]
    async fn test_resolve_batch_mirrors_input_order() {
        let addresses = [city("Stockholm"), city("Atlantis"), city("Stockholm")];
        let results = service().resolve_batch(&addresses).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert!(results[1].is_error());
        assert!(results[2].is_success());
    }
}
