use async_trait::async_trait;
use futures::{future, SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};

use super::{DuplexParts, DuplexTransport};
use crate::error::TransportError;

/// WebSocket transport on `tokio-tungstenite`.
///
/// Only text frames are surfaced; ping/pong and the close handshake are
/// handled by tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DuplexTransport for WebSocketTransport {
    async fn open(&self, url: &str) -> Result<DuplexParts, TransportError> {
        let (socket, response) = connect_async(url)
            .await
            .map_err(|e| TransportError::connect(e.to_string()))?;
        debug!(url, status = %response.status(), "WebSocket handshake complete");

        let (write, read) = socket.split();

        let sink = write
            .sink_map_err(|e| TransportError::send(e.to_string()))
            .with(|text: String| future::ready(Ok::<_, TransportError>(Message::text(text))));

        let stream = read.filter_map(|frame| {
            future::ready(match frame {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(other) => {
                    trace!(kind = frame_kind(&other), "Ignoring non-text frame");
                    None
                }
                Err(e) => Some(Err(TransportError::receive(e.to_string()))),
            })
        });

        Ok(DuplexParts {
            sink: Box::pin(sink),
            stream: stream.boxed(),
        })
    }
}

fn frame_kind(message: &Message) -> &'static str {
    match message {
        Message::Text(_) => "text",
        Message::Binary(_) => "binary",
        Message::Ping(_) => "ping",
        Message::Pong(_) => "pong",
        Message::Close(_) => "close",
        Message::Frame(_) => "frame",
    }
}
