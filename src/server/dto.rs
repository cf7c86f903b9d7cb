//! Wire-format DTOs for the HTTP surface.
//!
//! Timestamps cross the boundary as ISO-8601 strings; an empty address
//! is omitted from the wire entirely and reconstructs as empty on
//! read-back.

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::location::Address;
use crate::timezone::{
    ErrorDetail, TimeConversionRequest, TimeConversionResponse, TimezoneResponse,
};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressDto {
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state_or_province: String,
    pub postal_code: String,
    pub country: String,
}

impl AddressDto {
    pub fn is_empty(&self) -> bool {
        self.to_model().is_empty()
    }

    pub fn to_model(&self) -> Address {
        Address {
            address_line1: self.address_line1.clone(),
            address_line2: self.address_line2.clone(),
            city: self.city.clone(),
            state_or_province: self.state_or_province.clone(),
            postal_code: self.postal_code.clone(),
            country: self.country.clone(),
        }
    }
}

impl From<Address> for AddressDto {
    fn from(address: Address) -> Self {
        Self {
            address_line1: address.address_line1,
            address_line2: address.address_line2,
            city: address.city,
            state_or_province: address.state_or_province,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetailDto {
    pub message: String,
    pub error_code: String,
}

impl From<ErrorDetail> for ErrorDetailDto {
    fn from(detail: ErrorDetail) -> Self {
        Self {
            message: detail.message,
            error_code: detail.error_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneResponseDto {
    pub status_code: u16,
    /// Empty when no timezone was resolved.
    #[serde(default)]
    pub timezone_id: String,
    #[serde(default, skip_serializing_if = "AddressDto::is_empty")]
    pub address: AddressDto,
    #[serde(default)]
    pub requested_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetailDto>,
}

impl From<TimezoneResponse> for TimezoneResponseDto {
    fn from(response: TimezoneResponse) -> Self {
        Self {
            status_code: response.status_code,
            timezone_id: response.timezone_id.unwrap_or_default(),
            address: response.address.into(),
            requested_at: response.requested_at.to_rfc3339(),
            error: response.error.map(ErrorDetailDto::from),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimeConversionRequestDto {
    pub origin_time_zone_id: String,
    pub destination_time_zone_id: String,
    pub time: String,
}

impl TimeConversionRequestDto {
    /// Validates the boundary strings and builds the model request.
    ///
    /// Collects every problem rather than stopping at the first.
    pub fn to_model(&self) -> Result<TimeConversionRequest, Vec<String>> {
        let mut problems = Vec::new();

        let origin = parse_timezone(
            &self.origin_time_zone_id,
            "The origin timezone is required.",
            "The origin timezone is invalid.",
            &mut problems,
        );
        let destination = parse_timezone(
            &self.destination_time_zone_id,
            "The destination timezone is required.",
            "The destination timezone is invalid.",
            &mut problems,
        );

        let time = if self.time.trim().is_empty() {
            problems.push("The time is required.".to_string());
            None
        } else {
            let parsed = parse_time(&self.time);
            if parsed.is_none() {
                problems.push("The time is invalid.".to_string());
            }
            parsed
        };

        match (origin, destination, time) {
            (Some(origin), Some(destination), Some(time)) if problems.is_empty() => {
                Ok(TimeConversionRequest {
                    time,
                    origin,
                    destination,
                })
            }
            _ => Err(problems),
        }
    }
}

fn parse_timezone(
    id: &str,
    required: &str,
    invalid: &str,
    problems: &mut Vec<String>,
) -> Option<Tz> {
    if id.trim().is_empty() {
        problems.push(required.to_string());
        return None;
    }
    match id.parse() {
        Ok(tz) => Some(tz),
        Err(_) => {
            problems.push(invalid.to_string());
            None
        }
    }
}

fn parse_time(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|t| t.naive_local()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeConversionResponseDto {
    pub status_code: u16,
    pub origin_time_zone_id: String,
    pub destination_time_zone_id: String,
    pub original_time: String,
    /// Empty when the conversion failed.
    #[serde(default)]
    pub converted_time: String,
    #[serde(default)]
    pub requested_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetailDto>,
}

impl From<TimeConversionResponse> for TimeConversionResponseDto {
    fn from(response: TimeConversionResponse) -> Self {
        Self {
            status_code: response.status_code,
            origin_time_zone_id: response.origin.to_string(),
            destination_time_zone_id: response.destination.to_string(),
            original_time: format_time(response.original_time),
            converted_time: response
                .converted_time
                .map(format_time)
                .unwrap_or_default(),
            requested_at: response.requested_at.to_rfc3339(),
            error: response.error.map(ErrorDetailDto::from),
        }
    }
}

fn format_time(time: NaiveDateTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
