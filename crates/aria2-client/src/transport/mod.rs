//! Transport seams
//!
//! The client only needs two capabilities from the outside world: a duplex
//! text channel and a single JSON request/response exchange. Both are traits
//! so they can be swapped; the defaults are [`WebSocketTransport`] and
//! [`ReqwestTransport`].

use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::Sink;
use serde_json::Value;

use crate::error::TransportError;

mod http;
#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod websocket;

pub use http::ReqwestTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{MemoryPeer, MemoryTransport};
pub use websocket::WebSocketTransport;

/// Outbound half of an open duplex connection, one JSON text per item.
/// Closing the sink closes the connection.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Inbound half of an open duplex connection. Ends when the connection
/// closes.
pub type FrameStream = BoxStream<'static, Result<String, TransportError>>;

/// An open duplex connection.
pub struct DuplexParts {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

/// Opens persistent duplex connections.
#[async_trait]
pub trait DuplexTransport: Send + Sync {
    /// Resolve once the connection is open, or fail if it errors first.
    async fn open(&self, url: &str) -> Result<DuplexParts, TransportError>;
}

/// One request/response exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

impl HttpRequest {
    pub fn post_json(url: impl Into<String>, body: String) -> Self {
        Self {
            method: reqwest::Method::POST,
            url: url.into(),
            headers: vec![
                ("Accept", "application/json"),
                ("Content-Type", "application/json"),
            ],
            body,
        }
    }
}

/// Performs single request/response exchanges.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and parse the response body as JSON. Fails only on
    /// network or parse errors; HTTP status codes are not inspected.
    async fn request(&self, request: HttpRequest) -> Result<Value, TransportError>;
}
