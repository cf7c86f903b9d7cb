//! Maps-provider search adapter.
//!
//! Wraps the external maps search API behind [`GeocodingProvider`] and
//! surfaces exactly one best coordinate per address as an
//! [`ApiResponse`]. Transport failures are converted to error responses
//! here and never propagate past this boundary.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{
    ApiResponse, STATUS_BAD_GATEWAY, STATUS_BAD_REQUEST, STATUS_INTERNAL_ERROR, STATUS_NOT_FOUND,
};
use super::types::{Address, GeoCoordinate};

/// Largest batch the provider accepts on the synchronous endpoint.
pub const SEARCH_BATCH_SYNC_MAX: usize = 100;
/// Largest batch the provider accepts on the asynchronous endpoint.
pub const SEARCH_BATCH_ASYNC_MAX: usize = 10_000;

const SEARCH_DEFAULT_TOP: usize = 1;

/// A ranked match returned by the maps search API.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    pub position: GeoCoordinate,
    pub score: f64,
}

/// A single free-text search query with its provider options.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: String,
    pub country_filter: Option<String>,
    pub top: usize,
}

/// Which batch endpoint a chunk is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    Sync,
    Async,
}

/// Failures raised by the maps search transport.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error status.
    #[error("{message}")]
    Status { status: u16, message: String },
    /// The request never produced an HTTP response.
    #[error("provider transport error: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("malformed provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Status { status, .. } => *status,
            Self::Transport(_) => STATUS_INTERNAL_ERROR,
            Self::Decode(_) => STATUS_BAD_GATEWAY,
        }
    }
}

/// The consumed maps search capability: ranked matches per query.
#[async_trait]
pub trait MapsSearchApi: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchMatch>, ProviderError>;

    /// One result list per query, in query order.
    async fn search_batch(
        &self,
        queries: &[SearchQuery],
        mode: BatchMode,
    ) -> Result<Vec<Vec<SearchMatch>>, ProviderError>;
}

/// Resolves addresses to coordinates; the pipeline's view of geocoding.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    async fn search_one(&self, address: &Address) -> ApiResponse<GeoCoordinate>;

    /// Output preserves input order and cardinality.
    async fn search_batch(&self, addresses: &[Address]) -> Vec<ApiResponse<GeoCoordinate>>;
}

/// Builds the free-text query string for an address.
///
/// Non-empty fields joined by ", ". The provider fails to match postal
/// codes that contain a dash, so the dash is stripped from the query
/// string only; the address itself is left untouched.
fn build_query_string(address: &Address) -> String {
    let postal_code = address.postal_code.replace('-', "");
    let parts = [
        address.address_line1.as_str(),
        address.address_line2.as_str(),
        address.city.as_str(),
        address.state_or_province.as_str(),
        postal_code.as_str(),
        address.country.as_str(),
    ];
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// The provider query for an address, or `None` when the query string
/// would be blank.
fn search_query(address: &Address) -> Option<SearchQuery> {
    let query = build_query_string(address);
    if query.trim().is_empty() {
        return None;
    }
    let country_filter = address
        .is_country_valid_iso_code()
        .then(|| address.country.trim().to_ascii_uppercase());
    Some(SearchQuery {
        query,
        country_filter,
        top: SEARCH_DEFAULT_TOP,
    })
}

/// The highest-score match; ties keep the first encountered.
fn best_match(matches: &[SearchMatch]) -> Option<&SearchMatch> {
    let mut best: Option<&SearchMatch> = None;
    for m in matches {
        match best {
            Some(b) if m.score <= b.score => {}
            _ => best = Some(m),
        }
    }
    best
}

fn not_found(query: &str) -> ApiResponse<GeoCoordinate> {
    tracing::warn!(query, "the address could not be found");
    ApiResponse::error(
        STATUS_NOT_FOUND,
        format!("The address {} could not be found.", query),
    )
}

/// Adapter from the maps search capability to [`GeocodingProvider`].
pub struct MapsSearchClient {
    api: Arc<dyn MapsSearchApi>,
}

impl MapsSearchClient {
    pub fn new(api: Arc<dyn MapsSearchApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl GeocodingProvider for MapsSearchClient {
    async fn search_one(&self, address: &Address) -> ApiResponse<GeoCoordinate> {
        let Some(query) = search_query(address) else {
            return ApiResponse::error(
                STATUS_BAD_REQUEST,
                "The search query built from the address is empty.",
            );
        };

        tracing::info!(address = %address, "performing a search for the address");
        match self.api.search(&query).await {
            Ok(matches) => match best_match(&matches) {
                Some(m) => ApiResponse::success(m.position),
                None => not_found(&query.query),
            },
            Err(err) => ApiResponse::error(err.status_code(), err.to_string()),
        }
    }

    async fn search_batch(&self, addresses: &[Address]) -> Vec<ApiResponse<GeoCoordinate>> {
        let total = addresses.len();
        if total > SEARCH_BATCH_ASYNC_MAX {
            let message = format!(
                "The number {} of queries exceeds the maximum batch size of {}.",
                total, SEARCH_BATCH_ASYNC_MAX
            );
            return addresses
                .iter()
                .map(|_| ApiResponse::error(STATUS_BAD_REQUEST, message.clone()))
                .collect();
        }

        // Blank queries fail locally; only the rest go out on the wire.
        let mut slots: Vec<Option<ApiResponse<GeoCoordinate>>> = vec![None; total];
        let mut pending: Vec<(usize, SearchQuery)> = Vec::with_capacity(total);
        for (i, address) in addresses.iter().enumerate() {
            match search_query(address) {
                Some(query) => pending.push((i, query)),
                None => {
                    slots[i] = Some(ApiResponse::error(
                        STATUS_BAD_REQUEST,
                        "The search query built from the address is empty.",
                    ));
                }
            }
        }

        tracing::info!(queries = pending.len(), "performing a batch search");
        for chunk in pending.chunks(SEARCH_BATCH_ASYNC_MAX) {
            let queries: Vec<SearchQuery> = chunk.iter().map(|(_, q)| q.clone()).collect();
            let mode = if queries.len() <= SEARCH_BATCH_SYNC_MAX {
                BatchMode::Sync
            } else {
                BatchMode::Async
            };

            match self.api.search_batch(&queries, mode).await {
                Ok(per_query) if per_query.is_empty() => {
                    for (i, query) in chunk {
                        slots[*i] = Some(not_found(&query.query));
                    }
                }
                Ok(per_query) => {
                    for ((i, query), matches) in chunk.iter().zip(per_query.iter()) {
                        slots[*i] = Some(match best_match(matches) {
                            Some(m) => ApiResponse::success(m.position),
                            None => not_found(&query.query),
                        });
                    }
                    // Queries the provider left unanswered.
                    for (i, query) in chunk.iter().skip(per_query.len()) {
                        slots[*i] = Some(ApiResponse::error(
                            STATUS_BAD_GATEWAY,
                            format!("The provider returned no answer for {}.", query.query),
                        ));
                    }
                }
                Err(err) => {
                    let status = err.status_code();
                    let message = err.to_string();
                    for (i, _) in chunk {
                        slots[*i] = Some(ApiResponse::error(status, message.clone()));
                    }
                }
            }
        }

        slots
            .into_iter()
            .map(|slot| slot.expect("every address slot is populated"))
            .collect()
    }
}

// ─── HTTP transport ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PositionBody {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResultBody {
    position: PositionBody,
    #[serde(default)]
    score: f64,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    #[serde(default)]
    results: Vec<SearchResultBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchQueryBody<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    country_set: Option<&'a str>,
    top: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequestBody<'a> {
    batch_items: Vec<BatchQueryBody<'a>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchResponseBody {
    #[serde(default)]
    batch_items: Vec<SearchResponseBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseBody {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl From<SearchResultBody> for SearchMatch {
    fn from(body: SearchResultBody) -> Self {
        Self {
            position: GeoCoordinate::new(body.position.lat, body.position.lon),
            score: body.score,
        }
    }
}

/// Reqwest-backed maps search transport.
pub struct HttpMapsSearchApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpMapsSearchApi {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Maps an error response to the provider's error code when the
    /// body carries one, else its message, else the bare status.
    async fn read_error(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body: Option<ErrorResponseBody> = response.json().await.ok();
        let message = body
            .and_then(|b| b.error)
            .and_then(|e| e.code.or(e.message))
            .unwrap_or_else(|| format!("the provider request failed with status {}", status));
        ProviderError::Status { status, message }
    }
}

#[async_trait]
impl MapsSearchApi for HttpMapsSearchApi {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchMatch>, ProviderError> {
        let url = format!("{}/search/address", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("api-key", self.api_key.as_str()), ("query", &query.query)])
            .query(&[("top", query.top)]);
        if let Some(cc) = &query.country_filter {
            request = request.query(&[("countrySet", cc.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: SearchResponseBody = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(body.results.into_iter().map(SearchMatch::from).collect())
    }

    async fn search_batch(
        &self,
        queries: &[SearchQuery],
        mode: BatchMode,
    ) -> Result<Vec<Vec<SearchMatch>>, ProviderError> {
        let path = match mode {
            BatchMode::Sync => "/search/address/batch/sync",
            BatchMode::Async => "/search/address/batch",
        };
        let body = BatchRequestBody {
            batch_items: queries
                .iter()
                .map(|q| BatchQueryBody {
                    query: &q.query,
                    country_set: q.country_filter.as_deref(),
                    top: q.top,
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .query(&[("api-key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let body: BatchResponseBody = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;
        Ok(body
            .batch_items
            .into_iter()
            .map(|item| item.results.into_iter().map(SearchMatch::from).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum RecordedCall {
        Single(String),
        Batch(usize, BatchMode),
    }

    /// Scripted stand-in for the maps search capability.
    #[derive(Default)]
    struct ScriptedApi {
        single: Mutex<VecDeque<Result<Vec<SearchMatch>, ProviderError>>>,
        batch: Mutex<VecDeque<Result<Vec<Vec<SearchMatch>>, ProviderError>>>,
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl ScriptedApi {
        fn push_single(&self, result: Result<Vec<SearchMatch>, ProviderError>) {
            self.single.lock().unwrap().push_back(result);
        }

        fn push_batch(&self, result: Result<Vec<Vec<SearchMatch>>, ProviderError>) {
            self.batch.lock().unwrap().push_back(result);
        }

        fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MapsSearchApi for ScriptedApi {
        async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchMatch>, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push(RecordedCall::Single(query.query.clone()));
            self.single
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(vec![]))
        }

        async fn search_batch(
            &self,
            queries: &[SearchQuery],
            mode: BatchMode,
        ) -> Result<Vec<Vec<SearchMatch>>, ProviderError> {
            self.calls
                .lock()
                .unwrap()
                .push(RecordedCall::Batch(queries.len(), mode));
            self.batch
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(queries.iter().map(|_| vec![]).collect()))
        }
    }

    fn client_with(api: Arc<ScriptedApi>) -> MapsSearchClient {
        MapsSearchClient::new(api)
    }

    fn city(name: &str) -> Address {
        Address {
            city: name.into(),
            ..Address::default()
        }
    }

    fn m(lat: f64, lon: f64, score: f64) -> SearchMatch {
        SearchMatch {
            position: GeoCoordinate::new(lat, lon),
            score,
        }
    }

    #[test]
    fn test_query_string_skips_empty_fields() {
        let address = Address {
            city: "Berlin".into(),
            country: "DE".into(),
            ..Address::default()
        };
        assert_eq!(build_query_string(&address), "Berlin, DE");
    }

    #[test]
    fn test_query_string_strips_postal_code_dash() {
        let address = Address {
            city: "Sapporo".into(),
            postal_code: "060-0001".into(),
            country: "JP".into(),
            ..Address::default()
        };
        assert_eq!(build_query_string(&address), "Sapporo, 0600001, JP");
        // The address itself keeps its dash.
        assert_eq!(address.postal_code, "060-0001");
    }

    #[test]
    fn test_country_filter_only_for_valid_iso_codes() {
        let valid = search_query(&city_with_country("Paris", "FR")).unwrap();
        assert_eq!(valid.country_filter, Some("FR".to_string()));

        let invalid = search_query(&city_with_country("Paris", "France")).unwrap();
        assert_eq!(invalid.country_filter, None);
    }

    fn city_with_country(name: &str, country: &str) -> Address {
        Address {
            city: name.into(),
            country: country.into(),
            ..Address::default()
        }
    }

    #[test]
    fn test_best_match_prefers_first_of_tied_scores() {
        let matches = vec![m(1.0, 1.0, 0.9), m(2.0, 2.0, 0.95), m(3.0, 3.0, 0.95)];
        let best = best_match(&matches).unwrap();
        assert_eq!(best.position, GeoCoordinate::new(2.0, 2.0));
    }

    #[test]
    fn test_best_match_empty() {
        assert!(best_match(&[]).is_none());
    }

    #[tokio::test]
    async fn test_search_one_empty_address_no_network_call() {
        let api = Arc::new(ScriptedApi::default());
        let client = client_with(api.clone());

        let response = client.search_one(&Address::default()).await;
        assert_eq!(response.status_code(), 400);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_search_one_success() {
        let api = Arc::new(ScriptedApi::default());
        api.push_single(Ok(vec![m(59.3293, 18.0686, 0.99)]));
        let client = client_with(api.clone());

        let response = client.search_one(&city("Stockholm")).await;
        assert_eq!(
            response,
            ApiResponse::success(GeoCoordinate::new(59.3293, 18.0686))
        );
        assert_eq!(api.calls(), vec![RecordedCall::Single("Stockholm".into())]);
    }

    #[tokio::test]
    async fn test_search_one_no_matches_is_not_found() {
        let api = Arc::new(ScriptedApi::default());
        api.push_single(Ok(vec![]));
        let client = client_with(api);

        let response = client.search_one(&city("Atlantis")).await;
        assert_eq!(response.status_code(), 404);
    }

    #[tokio::test]
    async fn test_search_one_transport_failure_keeps_provider_status() {
        let api = Arc::new(ScriptedApi::default());
        api.push_single(Err(ProviderError::Status {
            status: 429,
            message: "TooManyRequests".into(),
        }));
        let client = client_with(api);

        let response = client.search_one(&city("Oslo")).await;
        assert_eq!(
            response,
            ApiResponse::error(429, "TooManyRequests")
        );
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_cardinality() {
        let api = Arc::new(ScriptedApi::default());
        api.push_batch(Ok(vec![
            vec![m(1.0, 1.0, 0.8)],
            vec![],
            vec![m(3.0, 3.0, 0.7)],
        ]));
        let client = client_with(api);

        let addresses = [city("A"), city("B"), city("C")];
        let results = client.search_batch(&addresses).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0], ApiResponse::success(GeoCoordinate::new(1.0, 1.0)));
        assert_eq!(results[1].status_code(), 404);
        assert_eq!(results[2], ApiResponse::success(GeoCoordinate::new(3.0, 3.0)));
    }

    #[tokio::test]
    async fn test_batch_at_sync_limit_uses_sync_endpoint() {
        let api = Arc::new(ScriptedApi::default());
        let client = client_with(api.clone());

        let addresses: Vec<Address> = (0..100).map(|i| city(&format!("City{}", i))).collect();
        let results = client.search_batch(&addresses).await;
        assert_eq!(results.len(), 100);
        assert_eq!(api.calls(), vec![RecordedCall::Batch(100, BatchMode::Sync)]);
    }

    #[tokio::test]
    async fn test_batch_above_sync_limit_uses_async_endpoint() {
        let api = Arc::new(ScriptedApi::default());
        let client = client_with(api.clone());

        let addresses: Vec<Address> = (0..101).map(|i| city(&format!("City{}", i))).collect();
        client.search_batch(&addresses).await;
        assert_eq!(api.calls(), vec![RecordedCall::Batch(101, BatchMode::Async)]);
    }

    #[tokio::test]
    async fn test_batch_of_250_is_one_async_chunk() {
        // Chunk selection works on whole-chunk size against both
        // thresholds; 250 is not split into sync-sized pieces.
        let api = Arc::new(ScriptedApi::default());
        let client = client_with(api.clone());

        let addresses: Vec<Address> = (0..250).map(|i| city(&format!("City{}", i))).collect();
        let results = client.search_batch(&addresses).await;
        assert_eq!(results.len(), 250);
        assert_eq!(api.calls(), vec![RecordedCall::Batch(250, BatchMode::Async)]);
    }

    #[tokio::test]
    async fn test_batch_above_async_limit_rejected_without_network() {
        let api = Arc::new(ScriptedApi::default());
        let client = client_with(api.clone());

        let addresses: Vec<Address> =
            (0..SEARCH_BATCH_ASYNC_MAX + 1).map(|_| city("X")).collect();
        let results = client.search_batch(&addresses).await;
        assert_eq!(results.len(), SEARCH_BATCH_ASYNC_MAX + 1);
        assert!(results.iter().all(|r| r.status_code() == 400));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_batch_transport_failure_marks_whole_chunk() {
        let api = Arc::new(ScriptedApi::default());
        api.push_batch(Err(ProviderError::Status {
            status: 503,
            message: "ServiceUnavailable".into(),
        }));
        let client = client_with(api);

        let addresses = [city("A"), city("B")];
        let results = client.search_batch(&addresses).await;
        assert_eq!(results[0], ApiResponse::error(503, "ServiceUnavailable"));
        assert_eq!(results[1], ApiResponse::error(503, "ServiceUnavailable"));
    }

    #[tokio::test]
    async fn test_batch_empty_address_fails_locally() {
        let api = Arc::new(ScriptedApi::default());
        api.push_batch(Ok(vec![vec![m(1.0, 1.0, 0.5)], vec![m(2.0, 2.0, 0.6)]]));
        let client = client_with(api.clone());

        let addresses = [city("A"), Address::default(), city("B")];
        let results = client.search_batch(&addresses).await;
        assert_eq!(results[0], ApiResponse::success(GeoCoordinate::new(1.0, 1.0)));
        assert_eq!(results[1].status_code(), 400);
        assert_eq!(results[2], ApiResponse::success(GeoCoordinate::new(2.0, 2.0)));
        // Only the two non-empty addresses went out.
        assert_eq!(api.calls(), vec![RecordedCall::Batch(2, BatchMode::Sync)]);
    }

    #[tokio::test]
    async fn test_batch_chunk_with_no_results_marks_all_not_found() {
        let api = Arc::new(ScriptedApi::default());
        api.push_batch(Ok(vec![]));
        let client = client_with(api);

        let addresses = [city("A"), city("B")];
        let results = client.search_batch(&addresses).await;
        assert!(results.iter().all(|r| r.status_code() == 404));
    }

    #[tokio::test]
    async fn test_batch_ties_resolved_per_query() {
        let api = Arc::new(ScriptedApi::default());
        api.push_batch(Ok(vec![vec![
            m(1.0, 1.0, 0.9),
            m(2.0, 2.0, 0.95),
            m(3.0, 3.0, 0.95),
        ]]));
        let client = client_with(api);

        let results = client.search_batch(&[city("A")]).await;
        assert_eq!(results[0], ApiResponse::success(GeoCoordinate::new(2.0, 2.0)));
    }
}
