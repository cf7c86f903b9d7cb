//! Location resolution service.
//!
//! Thin pass-through over the geocoding capability so the pipeline
//! never depends on a concrete provider; any [`GeocodingProvider`]
//! implementation, including a test double, slots in unchanged.

use std::sync::Arc;

use crate::api::ApiResponse;
use super::provider::GeocodingProvider;
use super::types::{Address, GeoCoordinate};

#[derive(Clone)]
pub struct LocationService {
    provider: Arc<dyn GeocodingProvider>,
}

impl LocationService {
    pub fn new(provider: Arc<dyn GeocodingProvider>) -> Self {
        Self { provider }
    }

    /// Resolves one address to its best coordinate.
    pub async fn resolve(&self, address: &Address) -> ApiResponse<GeoCoordinate> {
        self.provider.search_one(address).await
    }

    /// Resolves many addresses, preserving order and cardinality.
    pub async fn resolve_batch(&self, addresses: &[Address]) -> Vec<ApiResponse<GeoCoordinate>> {
        self.provider.search_batch(addresses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedProvider {
        coordinate: GeoCoordinate,
    }

    #[async_trait]
    impl GeocodingProvider for FixedProvider {
        async fn search_one(&self, _address: &Address) -> ApiResponse<GeoCoordinate> {
            ApiResponse::success(self.coordinate)
        }

        async fn search_batch(&self, addresses: &[Address]) -> Vec<ApiResponse<GeoCoordinate>> {
            addresses
                .iter()
                .map(|_| ApiResponse::success(self.coordinate))
                .collect()
        }
    }

    #[tokio::test]
    async fn test_resolve_delegates_to_provider() {
        let service = LocationService::new(Arc::new(FixedProvider {
            coordinate: GeoCoordinate::new(48.8566, 2.3522),
        }));
        let response = service.resolve(&Address::default()).await;
        assert_eq!(response, ApiResponse::success(GeoCoordinate::new(48.8566, 2.3522)));
    }

    #[tokio::test]
    async fn test_resolve_batch_delegates_to_provider() {
        let service = LocationService::new(Arc::new(FixedProvider {
            coordinate: GeoCoordinate::new(1.0, 2.0),
        }));
        let results = service
            .resolve_batch(&[Address::default(), Address::default()])
            .await;
        assert_eq!(results.len(), 2);
    }
}
