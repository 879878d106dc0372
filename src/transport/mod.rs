use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::error::{CarsxeError, Result};
use crate::request::ApiRequest;

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::{MockHandle, MockResponse, MockTransport};

/// Decoded response body: a schema-free JSON object.
pub type JsonMap = Map<String, Value>;

/// Status and body as received, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Executes a built request. Implementations must be shareable across tasks.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse>;
}

/// Turn a raw response into the generic mapping returned to callers.
///
/// Non-2xx is an error carrying status and body. An empty 2xx body, or a
/// literal `null`, is an empty map. Anything else that is not a JSON object
/// is a decode error that keeps the raw body.
pub fn decode_response(response: RawResponse) -> Result<JsonMap> {
    if !response.is_success() {
        warn!(status = response.status, body_len = response.body.len(), "CarsXE API returned non-2xx status");
        return Err(CarsxeError::Status {
            status: response.status,
            body: response.body,
        });
    }

    if response.body.trim().is_empty() {
        debug!(status = response.status, "Empty response body");
        return Ok(JsonMap::new());
    }

    match serde_json::from_str::<Option<JsonMap>>(&response.body) {
        Ok(None) => {
            debug!(status = response.status, "Null response body");
            Ok(JsonMap::new())
        }
        Ok(Some(map)) => {
            debug!(keys = map.len(), "Decoded CarsXE response");
            Ok(map)
        }
        Err(source) => {
            warn!(error = %source, "Failed to decode CarsXE response JSON");
            Err(CarsxeError::Decode { source, body: response.body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_object_body_decodes() {
        let map = decode_response(RawResponse::new(200, r#"{"success":true,"input":{"vin":"X"}}"#)).unwrap();
        assert_eq!(map["success"], Value::Bool(true));
        assert_eq!(map["input"]["vin"], "X");
    }

    #[test]
    fn empty_body_is_empty_map() {
        assert!(decode_response(RawResponse::new(200, "")).unwrap().is_empty());
        assert!(decode_response(RawResponse::new(204, "  \n")).unwrap().is_empty());
    }

    #[test]
    fn malformed_json_keeps_raw_body() {
        let err = decode_response(RawResponse::new(200, "<html>oops</html>")).unwrap_err();
        assert!(matches!(err, CarsxeError::Decode { .. }));
        assert_eq!(err.body(), Some("<html>oops</html>"));
        assert!(err.to_string().contains("<html>oops</html>"));
    }

    #[test]
    fn null_body_is_empty_map() {
        assert!(decode_response(RawResponse::new(200, "null")).unwrap().is_empty());
        assert!(decode_response(RawResponse::new(200, " null\n")).unwrap().is_empty());
    }

    #[test]
    fn non_object_json_is_a_decode_error() {
        for body in ["[1,2,3]", "42", r#""text""#, "true"] {
            let err = decode_response(RawResponse::new(200, body)).unwrap_err();
            assert!(matches!(err, CarsxeError::Decode { .. }), "{body} should not decode");
            assert_eq!(err.body(), Some(body));
        }
    }

    #[test]
    fn non_2xx_reports_status_and_body() {
        let err = decode_response(RawResponse::new(401, r#"{"error":"bad key"}"#)).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.body(), Some(r#"{"error":"bad key"}"#));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn non_2xx_with_empty_body_is_still_an_error() {
        let err = decode_response(RawResponse::new(500, "")).unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
