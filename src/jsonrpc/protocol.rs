//! JSON-RPC 2.0 message types.
//!
//! Implements the subset of the specification the server needs, without
//! external JSON-RPC dependencies: requests, responses, server-to-client
//! notifications, and error objects.

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    /// Request ID (string, number, or absent for notifications)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 Error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 Notification (server-to-client, no response expected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl JsonRpcRequest {
    pub fn new(
        method: String,
        params: Option<serde_json::Value>,
        id: Option<serde_json::Value>,
    ) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method,
            params,
            id,
        }
    }

    /// Check if this is a notification (no response expected)
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Validate the request structure
    pub fn validate(&self) -> Result<(), JsonRpcError> {
        if self.jsonrpc != "2.0" {
            return Err(JsonRpcError {
                code: error_codes::INVALID_REQUEST,
                message: "Invalid JSON-RPC version".to_string(),
                data: None,
            });
        }

        if self.method.is_empty() {
            return Err(JsonRpcError {
                code: error_codes::INVALID_REQUEST,
                message: "Method name cannot be empty".to_string(),
                data: None,
            });
        }

        if self.method.starts_with("rpc.") {
            return Err(JsonRpcError {
                code: error_codes::INVALID_REQUEST,
                message: "Method names starting with 'rpc.' are reserved".to_string(),
                data: None,
            });
        }

        Ok(())
    }
}

impl JsonRpcResponse {
    /// Create a success response
    pub fn success(result: serde_json::Value, id: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response
    pub fn error(error: JsonRpcError, id: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Create a parse error response
    pub fn parse_error() -> Self {
        Self::error(
            JsonRpcError {
                code: error_codes::PARSE_ERROR,
                message: "Parse error".to_string(),
                data: None,
            },
            None,
        )
    }

    /// Create a method not found error response
    pub fn method_not_found(method: &str, id: Option<serde_json::Value>) -> Self {
        Self::error(
            JsonRpcError {
                code: error_codes::METHOD_NOT_FOUND,
                message: "Method not found".to_string(),
                data: Some(serde_json::json!({ "method": method })),
            },
            id,
        )
    }
}

impl JsonRpcError {
    /// Create a custom application error
    pub fn custom(code: i32, message: String, data: Option<serde_json::Value>) -> Self {
        Self {
            code,
            message,
            data,
        }
    }

    /// Create an invalid params error
    pub fn invalid_params(message: String) -> Self {
        Self {
            code: error_codes::INVALID_PARAMS,
            message,
            data: None,
        }
    }
}

/// Convert our ForgeError to JSON-RPC error
impl From<crate::ForgeError> for JsonRpcError {
    fn from(error: crate::ForgeError) -> Self {
        JsonRpcError {
            code: error.error_code(),
            message: error.user_message(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let req = JsonRpcRequest::new(
            "siteforge/status".to_string(),
            Some(serde_json::json!({"generation_id": "abc123"})),
            Some(serde_json::json!(1)),
        );

        assert_eq!(req.jsonrpc, "2.0");
        assert!(!req.is_notification());
    }

    #[test]
    fn test_request_validation() {
        let mut req = JsonRpcRequest::new(
            "siteforge/status".to_string(),
            None,
            Some(serde_json::json!(1)),
        );

        assert!(req.validate().is_ok());

        req.jsonrpc = "1.0".to_string();
        assert!(req.validate().is_err());

        req.jsonrpc = "2.0".to_string();
        req.method = "rpc.reserved".to_string();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_creation() {
        let resp = JsonRpcResponse::success(
            serde_json::json!({"status": "processing"}),
            Some(serde_json::json!(1)),
        );

        assert!(resp.result.is_some());
        assert!(resp.error.is_none());

        let err_resp = JsonRpcResponse::method_not_found("unknown", Some(serde_json::json!(1)));
        assert!(err_resp.error.is_some());
        assert!(err_resp.result.is_none());
    }

    #[test]
    fn test_forge_error_conversion() {
        let error: JsonRpcError = crate::ForgeError::not_found("generation abc123").into();
        assert_eq!(error.code, -32004);
        assert!(error.message.contains("abc123"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let req = JsonRpcRequest::new(
            "siteforge/generate".to_string(),
            Some(serde_json::json!({"site_name": "Bakery"})),
            Some(serde_json::json!(42)),
        );

        let json = serde_json::to_string(&req).unwrap();
        let parsed: JsonRpcRequest = serde_json::from_str(&json).unwrap();

        assert_eq!(req.method, parsed.method);
        assert_eq!(req.id, parsed.id);
    }
}
