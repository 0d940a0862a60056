//! HTTP response envelope for Portico API errors

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Generic result wrapper for API responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Result<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> Result<T> {
    pub fn new(code: i32, message: String, data: T) -> Self {
        Result::<T> {
            code,
            message,
            data,
        }
    }

    pub fn http_response(
        status: u16,
        code: i32,
        message: String,
        data: impl Serialize,
    ) -> HttpResponse {
        HttpResponseBuilder::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        )
        .json(Result::new(code, message, data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_fields() {
        let result = Result::new(20004, "missing".to_string(), "NotFound");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["code"], 20004);
        assert_eq!(value["message"], "missing");
        assert_eq!(value["data"], "NotFound");
    }

    #[test]
    fn test_http_response_status() {
        let response =
            Result::<String>::http_response(409, 20005, "dup".to_string(), "Conflict");
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = Result::<String>::http_response(42, 1, String::new(), "");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
