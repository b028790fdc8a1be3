//! Client error types

use std::time::Duration;

use aria2_protocol::RpcError;
use thiserror::Error;

/// Errors surfaced by [`Aria2Client`](crate::Aria2Client) operations.
///
/// Every error belongs to exactly one call, connect or configuration load;
/// nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before anything was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport failed to open, exchange or deliver a message
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The daemon answered with an error envelope
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// No response within the configured request timeout
    #[error("Call {id} timed out after {after:?}")]
    Timeout { id: u64, after: Duration },

    /// The client went away before a response arrived
    #[error("Call {id} was abandoned before a response arrived")]
    Abandoned { id: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The daemon-supplied payload, when this is an RPC-level failure.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        match self {
            Error::Rpc(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Failures reported by a duplex or request/response transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Response body was not JSON
    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Connection closed")]
    Closed,
}

impl TransportError {
    pub fn connect(msg: impl Into<String>) -> Self {
        Self::Connect(msg.into())
    }

    pub fn send(msg: impl Into<String>) -> Self {
        Self::Send(msg.into())
    }

    pub fn receive(msg: impl Into<String>) -> Self {
        Self::Receive(msg.into())
    }

    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}
