//! JSON-RPC 2.0 message types.
//!
//! Built directly on [`claw_json::Value`] rather than a derive-based
//! serializer: the engine needs the exact minified/escaped stringification
//! `claw_json::stringify` provides, which a generic serializer doesn't
//! promise.

use claw_json::Value;

/// An incoming JSON-RPC request or notification.
///
/// `id` is `None` for notifications. `params` defaults to `Value::Null`
/// when the field is absent, matching the handler-tolerance policy: a
/// missing or malformed request body never aborts the read loop.
#[derive(Debug, Clone)]
pub struct JsonRpcRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: Value,
}

impl JsonRpcRequest {
    /// Parse a request from a decoded JSON body. Returns `None` if `method`
    /// is missing or not a string — the caller should swallow the message
    /// in that case rather than respond.
    pub fn from_value(value: &Value) -> Option<Self> {
        let method = value.get_str("method")?.to_string();
        let id = value.get("id").cloned();
        let params = value.get("params").cloned().unwrap_or(Value::Null);
        Some(Self { id, method, params })
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// An outgoing JSON-RPC response.
#[derive(Debug, Clone)]
pub struct JsonRpcResponse {
    pub id: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self { id, result: Some(result), error: None }
    }

    pub fn null(id: Option<Value>) -> Self {
        Self { id, result: Some(Value::Null), error: None }
    }

    pub fn error(id: Option<Value>, error: JsonRpcError) -> Self {
        Self { id, result: None, error: Some(error) }
    }

    /// Render this response as the JSON value to be sent over the wire.
    pub fn to_value(&self) -> Value {
        let mut obj = Value::object();
        obj.insert("jsonrpc", Value::from("2.0"));
        obj.insert("id", self.id.clone().unwrap_or(Value::Null));
        if let Some(result) = &self.result {
            obj.insert("result", result.clone());
        }
        if let Some(error) = &self.error {
            obj.insert("error", error.to_value());
        }
        obj
    }
}

/// A notification sent server -> client (e.g. `publishDiagnostics`), which
/// carries no `id`.
#[derive(Debug, Clone)]
pub struct JsonRpcNotification {
    pub method: String,
    pub params: Value,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self { method: method.into(), params }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Value::object();
        obj.insert("jsonrpc", Value::from("2.0"));
        obj.insert("method", Value::from(self.method.clone()));
        obj.insert("params", self.params.clone());
        obj
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Value::object();
        obj.insert("code", Value::from(i64::from(self.code)));
        obj.insert("message", Value::from(self.message.clone()));
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_request_with_params() {
        let v = claw_json::parse(r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"rootUri":"file:///x"}}"#).unwrap();
        let req = JsonRpcRequest::from_value(&v).unwrap();
        assert_eq!(req.method, "initialize");
        assert!(!req.is_notification());
        assert_eq!(req.params.get_str("rootUri"), Some("file:///x"));
    }

    #[test]
    fn notification_has_no_id() {
        let v = claw_json::parse(r#"{"jsonrpc":"2.0","method":"textDocument/didOpen","params":{}}"#).unwrap();
        let req = JsonRpcRequest::from_value(&v).unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn missing_method_yields_none() {
        let v = claw_json::parse(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(JsonRpcRequest::from_value(&v).is_none());
    }

    #[test]
    fn success_response_round_trips_through_json() {
        let resp = JsonRpcResponse::success(Some(Value::from(1i64)), Value::from("ok"));
        let s = claw_json::stringify(&resp.to_value());
        assert!(s.contains(r#""result":"ok""#));
    }
}
