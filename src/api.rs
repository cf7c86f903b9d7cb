//! Uniform success/error container for fallible service operations.
//!
//! Expected failures travel through the resolution pipeline as values,
//! not as raised errors. Every fallible call from the provider adapters
//! upward returns an [`ApiResponse`]; callers transform the success
//! payload with [`ApiResponse::map`] and collapse both branches with
//! [`ApiResponse::match_on`].

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;
pub const STATUS_BAD_GATEWAY: u16 = 502;

/// Tagged success/error outcome of a service call.
///
/// Exactly one branch is populated; the status code uses HTTP semantics
/// so it can flow to the outward-facing response unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success { value: T, status_code: u16 },
    Error { status_code: u16, message: String },
}

impl<T> ApiResponse<T> {
    /// A success with status 200.
    pub fn success(value: T) -> Self {
        Self::Success {
            value,
            status_code: STATUS_OK,
        }
    }

    /// A success with an explicit status code.
    pub fn success_with_status(value: T, status_code: u16) -> Self {
        Self::Success { value, status_code }
    }

    /// An error with a status code and message.
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self::Error {
            status_code,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { status_code, .. } => *status_code,
            Self::Error { status_code, .. } => *status_code,
        }
    }

    /// Transform the success payload, leaving the error branch untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            Self::Success { value, status_code } => ApiResponse::Success {
                value: f(value),
                status_code,
            },
            Self::Error {
                status_code,
                message,
            } => ApiResponse::Error {
                status_code,
                message,
            },
        }
    }

    /// Invoke exactly one branch and unify both into a common output type.
    pub fn match_on<R>(
        self,
        on_success: impl FnOnce(T, u16) -> R,
        on_error: impl FnOnce(u16, String) -> R,
    ) -> R {
        match self {
            Self::Success { value, status_code } => on_success(value, status_code),
            Self::Error {
                status_code,
                message,
            } => on_error(status_code, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_defaults_to_200() {
        let r = ApiResponse::success(7);
        assert!(r.is_success());
        assert_eq!(r.status_code(), 200);
    }

    #[test]
    fn test_error_carries_status_and_message() {
        let r: ApiResponse<i32> = ApiResponse::error(404, "missing");
        assert!(r.is_error());
        assert_eq!(r.status_code(), 404);
    }

    #[test]
    fn test_map_transforms_success() {
        let r = ApiResponse::success(21).map(|v| v * 2);
        assert_eq!(r, ApiResponse::success(42));
    }

    #[test]
    fn test_map_preserves_error() {
        let r: ApiResponse<i32> = ApiResponse::error(500, "boom");
        let mapped: ApiResponse<String> = r.map(|v| v.to_string());
        assert_eq!(mapped, ApiResponse::error(500, "boom"));
    }

    #[test]
    fn test_map_preserves_success_status() {
        let r = ApiResponse::success_with_status(3, 201).map(|v| v + 1);
        assert_eq!(r, ApiResponse::success_with_status(4, 201));
    }

    #[test]
    fn test_match_on_success_branch() {
        let out = ApiResponse::success("x").match_on(
            |value, code| format!("ok {} {}", value, code),
            |code, msg| format!("err {} {}", code, msg),
        );
        assert_eq!(out, "ok x 200");
    }

    #[test]
    fn test_match_on_error_branch() {
        let out = ApiResponse::<&str>::error(400, "bad").match_on(
            |value, code| format!("ok {} {}", value, code),
            |code, msg| format!("err {} {}", code, msg),
        );
        assert_eq!(out, "err 400 bad");
    }
}
