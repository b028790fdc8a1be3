//! Shared protocol types for talking to an aria2 daemon over JSON-RPC 2.0
//!
//! Nothing in here performs I/O. The client crate builds requests with
//! [`Request`], classifies whatever comes back with [`Message::classify`], and
//! derives its shortcut methods from the [`for_each_method!`] table.

mod endpoint;
mod envelope;
mod methods;

pub use endpoint::Endpoint;
pub use envelope::{
    qualify_method, token_param, Message, Request, RpcError, JSONRPC_VERSION, PRIMARY_NAMESPACE,
    SYSTEM_NAMESPACE, TOKEN_PREFIX,
};
pub use methods::{Event, Method, Notification};
