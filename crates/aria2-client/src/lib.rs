//! Client library for the aria2 JSON-RPC interface
//!
//! [`Aria2Client`] talks to a running `aria2c --enable-rpc` daemon over one
//! of two transports:
//!
//! 1. **WebSocket** (after [`Aria2Client::connect`]): calls and responses
//!    share one connection and the daemon pushes download notifications.
//! 2. **HTTP** (whenever no connection is open): every call is a single
//!    POST; no notifications are delivered.
//!
//! Every daemon method has a generated shortcut (`add_uri`, `tell_status`,
//! `multicall`, ...) next to the generic [`Aria2Client::call`], and every
//! notification has a handler setter (`on_download_complete`, ...).

mod client;
pub mod config;
pub mod error;
mod hooks;
mod shortcuts;
pub mod transport;

pub use client::{Aria2Client, PendingCall, TransportMode};
pub use config::ClientConfig;
pub use error::{Error, Result, TransportError};
pub use hooks::{EnvelopeHook, LifecycleHook, NotificationHandler};

pub use aria2_protocol::{Event, Method, Notification, RpcError};
