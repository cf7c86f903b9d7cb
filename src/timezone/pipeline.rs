//! Retrieval pipeline: the address-facing entry point.
//!
//! Stamps the request time, delegates to the timezone retrieval
//! capability, and folds the result into a [`TimezoneResponse`]. The
//! success/error fold is the only place a status code and error detail
//! are attached to the outward-facing response.

use std::sync::Arc;

use chrono::Utc;

use super::models::{ErrorDetail, TimezoneRequest, TimezoneResponse};
use super::retrieval::TimezoneRetrieval;

const RETRIEVAL_ERROR_CODE: &str = "TimezoneRetrievalError";
const RETRIEVAL_ERROR_MESSAGE: &str = "An error occurred while retrieving the timezone.";

#[derive(Clone)]
pub struct RetrievalPipeline {
    retrieval: Arc<dyn TimezoneRetrieval>,
}

impl RetrievalPipeline {
    pub fn new(retrieval: Arc<dyn TimezoneRetrieval>) -> Self {
        Self { retrieval }
    }

    /// Resolves the timezone for the request's address.
    ///
    /// Stateless per call; each invocation is an independent
    /// transformation from address to response.
    pub async fn get_timezone(&self, request: TimezoneRequest) -> TimezoneResponse {
        let requested_at = Utc::now();
        let address = request.address;
        let response = self.retrieval.resolve(&address).await;

        let error_address = address.clone();
        response.match_on(
            |value, status_code| TimezoneResponse {
                requested_at,
                address,
                timezone_id: Some(value),
                status_code,
                error: None,
            },
            |status_code, message| TimezoneResponse {
                requested_at,
                address: error_address,
                timezone_id: None,
                status_code,
                error: Some(ErrorDetail {
                    // The underlying message stays out of the response;
                    // only an already-empty message passes through.
                    message: if message.is_empty() {
                        message
                    } else {
                        RETRIEVAL_ERROR_MESSAGE.to_string()
                    },
                    error_code: RETRIEVAL_ERROR_CODE.to_string(),
                }),
            },
        )
    }
}
