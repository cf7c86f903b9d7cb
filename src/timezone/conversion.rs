//! Wall-clock time conversion between two named timezones.

use chrono::offset::LocalResult;
use chrono::{TimeZone, Utc};

use crate::api::{STATUS_BAD_REQUEST, STATUS_OK};
use super::models::{ErrorDetail, TimeConversionRequest, TimeConversionResponse};

const CONVERSION_ERROR_CODE: &str = "TimeConversionError";

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeConversionService;

impl TimeConversionService {
    pub fn new() -> Self {
        Self
    }

    /// Converts the request's wall-clock time from the origin zone to
    /// the destination zone.
    ///
    /// An ambiguous local time (clocks rolled back) resolves to its
    /// earlier instant. A time skipped by a DST gap cannot be mapped
    /// and yields a 400 response.
    pub fn convert(&self, request: TimeConversionRequest) -> TimeConversionResponse {
        let requested_at = Utc::now();

        let instant = match request.origin.from_local_datetime(&request.time) {
            LocalResult::Single(t) => Some(t),
            LocalResult::Ambiguous(earlier, _) => Some(earlier),
            LocalResult::None => None,
        };

        match instant {
            Some(t) => TimeConversionResponse {
                original_time: request.time,
                converted_time: Some(t.with_timezone(&request.destination).naive_local()),
                origin: request.origin,
                destination: request.destination,
                requested_at,
                status_code: STATUS_OK,
                error: None,
            },
            None => TimeConversionResponse {
                original_time: request.time,
                converted_time: None,
                origin: request.origin,
                destination: request.destination,
                requested_at,
                status_code: STATUS_BAD_REQUEST,
                error: Some(ErrorDetail {
                    message: format!(
                        "The time {} does not exist in {}.",
                        request.time, request.origin
                    ),
                    error_code: CONVERSION_ERROR_CODE.to_string(),
                }),
            },
        }
    }
}
