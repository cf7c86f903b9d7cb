//! Request/response models for timezone retrieval and time conversion.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::location::Address;

/// A machine-readable error attached to a failed response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub message: String,
    pub error_code: String,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.error_code, self.message)
    }
}

/// A request to resolve the timezone of one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneRequest {
    pub address: Address,
}

impl fmt::Display for TimezoneRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}

/// The outcome of a timezone retrieval.
///
/// Assembled once by the pipeline; no layer mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TimezoneResponse {
    pub requested_at: DateTime<Utc>,
    pub address: Address,
    pub timezone_id: Option<String>,
    pub status_code: u16,
    pub error: Option<ErrorDetail>,
}

impl fmt::Display for TimezoneResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timezone_id = self.timezone_id.as_deref().unwrap_or("Unknown");
        write!(f, "{}: {}", self.address, timezone_id)
    }
}

/// A request to convert a wall-clock time between two timezones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeConversionRequest {
    pub time: NaiveDateTime,
    pub origin: Tz,
    pub destination: Tz,
}

impl fmt::Display for TimeConversionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.time, self.origin, self.destination)
    }
}

/// The outcome of a time conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeConversionResponse {
    pub original_time: NaiveDateTime,
    pub converted_time: Option<NaiveDateTime>,
    pub origin: Tz,
    pub destination: Tz,
    pub requested_at: DateTime<Utc>,
    pub status_code: u16,
    pub error: Option<ErrorDetail>,
}

impl fmt::Display for TimeConversionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.converted_time {
            Some(converted) => write!(
                f,
                "{} {} -> {} {}",
                self.original_time, self.origin, converted, self.destination
            ),
            None => write!(
                f,
                "{} {} -> (unconverted) {}",
                self.original_time, self.origin, self.destination
            ),
        }
    }
}
