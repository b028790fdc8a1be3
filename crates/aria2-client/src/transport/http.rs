use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use super::{HttpRequest, HttpTransport};
use crate::error::TransportError;

/// Request/response transport on `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (proxy, TLS roots, pool settings).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn request(&self, request: HttpRequest) -> Result<Value, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;
        trace!(url = %request.url, status = %response.status(), "HTTP exchange complete");

        // The daemon reports RPC failures with non-2xx statuses and a JSON
        // error envelope, so the body is parsed regardless of status.
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::decode(e.to_string()))
    }
}
