//! In-process duplex transport
//!
//! Every `open` hands the far end of the new connection to whoever holds
//! the listener receiver, so a test can script the daemon side. Only built
//! for tests and with the `test-utils` feature.

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::channel::mpsc as frames;
use futures::{Sink, StreamExt};
use tokio::sync::mpsc;

use super::{DuplexParts, DuplexTransport};
use crate::error::TransportError;

pub struct MemoryTransport {
    listener: mpsc::UnboundedSender<MemoryPeer>,
}

impl MemoryTransport {
    /// Create a transport and the receiver that yields the far end of each
    /// opened connection. Dropping the receiver makes `open` fail.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (listener, accepted) = mpsc::unbounded_channel();
        (Self { listener }, accepted)
    }
}

#[async_trait]
impl DuplexTransport for MemoryTransport {
    async fn open(&self, url: &str) -> Result<DuplexParts, TransportError> {
        let (outbound_tx, outbound_rx) = frames::unbounded();
        let (inbound_tx, inbound_rx) = frames::unbounded();

        let peer = MemoryPeer {
            url: url.to_string(),
            received: outbound_rx,
            outgoing: inbound_tx.clone(),
        };
        self.listener
            .send(peer)
            .map_err(|_| TransportError::connect(format!("nothing is listening at {url}")))?;

        Ok(DuplexParts {
            sink: Box::pin(MemorySink {
                outbound: outbound_tx,
                inbound: inbound_tx,
            }),
            stream: inbound_rx.map(Ok).boxed(),
        })
    }
}

/// Far end of an in-memory connection.
pub struct MemoryPeer {
    url: String,
    received: frames::UnboundedReceiver<String>,
    outgoing: frames::UnboundedSender<String>,
}

impl MemoryPeer {
    /// URL the client opened.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Next frame sent by the client; `None` once the client closed.
    pub async fn next_frame(&mut self) -> Option<String> {
        self.received.next().await
    }

    /// Next frame sent by the client, parsed as JSON.
    pub async fn next_json(&mut self) -> Option<serde_json::Value> {
        let frame = self.next_frame().await?;
        serde_json::from_str(&frame).ok()
    }

    /// Deliver a frame to the client. Returns `false` if the connection is
    /// already closed.
    pub fn push(&self, frame: impl Into<String>) -> bool {
        self.outgoing.unbounded_send(frame.into()).is_ok()
    }

    pub fn push_json(&self, value: &serde_json::Value) -> bool {
        self.push(value.to_string())
    }

    /// Close the connection from the far end.
    pub fn close(self) {
        self.outgoing.close_channel();
    }
}

struct MemorySink {
    outbound: frames::UnboundedSender<String>,
    inbound: frames::UnboundedSender<String>,
}

impl Sink<String> for MemorySink {
    type Error = TransportError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.outbound.is_closed() {
            Poll::Ready(Err(TransportError::Closed))
        } else {
            Poll::Ready(Ok(()))
        }
    }

    fn start_send(self: Pin<&mut Self>, item: String) -> Result<(), Self::Error> {
        self.outbound
            .unbounded_send(item)
            .map_err(|_| TransportError::Closed)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    // Closing ends both directions, like a completed close handshake.
    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.outbound.close_channel();
        self.inbound.close_channel();
        Poll::Ready(Ok(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::SinkExt;

    #[tokio::test]
    async fn test_frames_flow_both_ways() {
        let (transport, mut accepted) = MemoryTransport::new();
        let mut parts = transport.open("ws://memory/jsonrpc").await.unwrap();
        let mut peer = accepted.recv().await.unwrap();
        assert_eq!(peer.url(), "ws://memory/jsonrpc");

        parts.sink.send("ping".to_string()).await.unwrap();
        assert_eq!(peer.next_frame().await.as_deref(), Some("ping"));

        assert!(peer.push("pong"));
        assert_eq!(parts.stream.next().await, Some(Ok("pong".to_string())));
    }

    #[tokio::test]
    async fn test_local_close_ends_both_directions() {
        let (transport, mut accepted) = MemoryTransport::new();
        let mut parts = transport.open("ws://memory").await.unwrap();
        let mut peer = accepted.recv().await.unwrap();

        parts.sink.close().await.unwrap();
        assert_eq!(peer.next_frame().await, None);
        assert_eq!(parts.stream.next().await, None);
        assert!(!peer.push("late"));
    }

    #[tokio::test]
    async fn test_remote_close_ends_stream() {
        let (transport, mut accepted) = MemoryTransport::new();
        let mut parts = transport.open("ws://memory").await.unwrap();
        accepted.recv().await.unwrap().close();

        assert_eq!(parts.stream.next().await, None);
    }

    #[tokio::test]
    async fn test_open_fails_without_listener() {
        let (transport, accepted) = MemoryTransport::new();
        drop(accepted);

        let result = transport.open("ws://memory").await;
        assert!(matches!(result, Err(TransportError::Connect(_))));
    }
}
