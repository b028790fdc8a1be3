use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// Namespace of every download-management method and notification.
pub const PRIMARY_NAMESPACE: &str = "aria2.";

/// Namespace of the introspection methods (`system.multicall`, ...).
pub const SYSTEM_NAMESPACE: &str = "system.";

/// Prefix of the shared-secret parameter (`token:<secret>`).
pub const TOKEN_PREFIX: &str = "token:";

/// Prefix a method name with `aria2.` unless it already carries one of the
/// two namespaces the daemon recognizes.
///
/// ```
/// use aria2_protocol::qualify_method;
///
/// assert_eq!(qualify_method("addUri"), "aria2.addUri");
/// assert_eq!(qualify_method("aria2.addUri"), "aria2.addUri");
/// assert_eq!(qualify_method("system.listMethods"), "system.listMethods");
/// ```
pub fn qualify_method(method: &str) -> Cow<'_, str> {
    if method.starts_with(SYSTEM_NAMESPACE) || method.starts_with(PRIMARY_NAMESPACE) {
        Cow::Borrowed(method)
    } else {
        Cow::Owned(format!("{PRIMARY_NAMESPACE}{method}"))
    }
}

/// The positional token parameter for a configured secret, if any.
pub fn token_param(secret: &str) -> Option<Value> {
    if secret.is_empty() {
        None
    } else {
        Some(Value::String(format!("{TOKEN_PREFIX}{secret}")))
    }
}

/// An outbound JSON-RPC request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    pub id: u64,
    pub jsonrpc: String,
    /// Omitted from the wire entirely when there is nothing to send.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Value>>,
}

/// Body posted over the request/response transport: method, id and params,
/// without the version member.
#[derive(Serialize)]
struct HttpBody<'a> {
    method: &'a str,
    id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<&'a [Value]>,
}

impl Request {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            id,
            jsonrpc: JSONRPC_VERSION.to_string(),
            params: if params.is_empty() { None } else { Some(params) },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_http_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&HttpBody {
            method: &self.method,
            id: self.id,
            params: self.params.as_deref().filter(|p| !p.is_empty()),
        })
    }
}

/// Error payload carried by a daemon error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Interpret an `error` member. Anything that is not a `{code, message}`
    /// object is kept verbatim in `data`.
    pub fn from_value(value: &Value) -> Self {
        match serde_json::from_value::<RpcError>(value.clone()) {
            Ok(error) => error,
            Err(_) => Self {
                code: 0,
                message: value.to_string(),
                data: Some(value.clone()),
            },
        }
    }
}

/// Inbound envelope, classified by the members it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Envelope with an `id` member. `id` is `None` when the value is not an
    /// unsigned integer, so it can never match a call this client issued.
    Response {
        id: Option<u64>,
        outcome: Result<Value, RpcError>,
    },
    /// Envelope without an `id` but with a `method` name.
    Notification { method: String, params: Vec<Value> },
    Unknown,
}

impl Message {
    pub fn classify(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Message::Unknown;
        };

        if let Some(id) = object.get("id") {
            let outcome = match object.get("error") {
                Some(error) if is_truthy(error) => Err(RpcError::from_value(error)),
                _ => Ok(object.get("result").cloned().unwrap_or(Value::Null)),
            };
            return Message::Response {
                id: id.as_u64(),
                outcome,
            };
        }

        match object.get("method").and_then(Value::as_str) {
            Some(method) => Message::Notification {
                method: method.to_string(),
                params: object
                    .get("params")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default(),
            },
            None => Message::Unknown,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
