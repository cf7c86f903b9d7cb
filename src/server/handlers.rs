//! HTTP handlers over the retrieval pipeline.
//!
//! The handlers only translate between DTOs and models; every outcome,
//! including failures, arrives as an already-assembled response whose
//! status code is mirrored onto the HTTP reply.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;

use crate::timezone::TimezoneRequest;

use super::dto::{
    AddressDto, ErrorDetailDto, TimeConversionRequestDto, TimeConversionResponseDto,
    TimezoneResponseDto,
};
use super::state::AppState;

pub async fn status() -> &'static str {
    "OK"
}

pub async fn get_timezone(
    State(state): State<Arc<AppState>>,
    Query(address): Query<AddressDto>,
) -> Response {
    tracing::info!("received get timezone request");
    timezone_response(&state, address).await
}

pub async fn post_timezone(
    State(state): State<Arc<AppState>>,
    Json(address): Json<AddressDto>,
) -> Response {
    tracing::info!("received post timezone request");
    timezone_response(&state, address).await
}

async fn timezone_response(state: &AppState, address: AddressDto) -> Response {
    let request = TimezoneRequest {
        address: address.to_model(),
    };
    let response = state.pipeline.get_timezone(request).await;
    tracing::info!(status = response.status_code, "timezone request completed");

    let status = http_status(response.status_code);
    (status, Json(TimezoneResponseDto::from(response))).into_response()
}

pub async fn convert_time(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TimeConversionRequestDto>,
) -> Response {
    tracing::info!("received time conversion request");

    match request.to_model() {
        Ok(model) => {
            let response = state.conversion.convert(model);
            let status = http_status(response.status_code);
            (status, Json(TimeConversionResponseDto::from(response))).into_response()
        }
        Err(problems) => {
            let body = TimeConversionResponseDto {
                status_code: 400,
                origin_time_zone_id: request.origin_time_zone_id,
                destination_time_zone_id: request.destination_time_zone_id,
                original_time: request.time,
                converted_time: String::new(),
                requested_at: Utc::now().to_rfc3339(),
                error: Some(ErrorDetailDto {
                    message: problems.join(" "),
                    error_code: "ValidationError".into(),
                }),
            };
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
    }
}

fn http_status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
