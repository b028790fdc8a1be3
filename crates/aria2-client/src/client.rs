//! Daemon client implementation

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use std::time::Duration;

use aria2_protocol::{qualify_method, token_param, Event, Message, Method, Notification, Request};
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result, TransportError};
use crate::hooks::Hooks;
use crate::transport::{
    DuplexParts, DuplexTransport, FrameSink, FrameStream, HttpRequest, HttpTransport,
    ReqwestTransport, WebSocketTransport,
};

/// How long a local close waits for the daemon to finish the handshake.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Which transport the next call goes out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// A duplex connection is open; calls are written to it and responses
    /// and notifications arrive on it.
    DuplexOpen,
    /// No duplex connection; every call is a single HTTP exchange.
    RequestResponseOnly,
}

enum Command {
    Frame { id: u64, text: String },
    Close,
}

struct DuplexLink {
    generation: u64,
    commands: mpsc::UnboundedSender<Command>,
    /// Flips to `true` once the connection task has reset the mode and
    /// fired `on_close`.
    closed: watch::Receiver<bool>,
}

enum ActiveTransport {
    Duplex(DuplexLink),
    Http,
}

type Completion = oneshot::Sender<Result<Value>>;

struct Inner {
    config: RwLock<ClientConfig>,
    active: Mutex<ActiveTransport>,
    pending: Mutex<HashMap<u64, Completion>>,
    next_id: AtomicU64,
    generation: AtomicU64,
    hooks: Hooks,
    duplex: Arc<dyn DuplexTransport>,
    http: Arc<dyn HttpTransport>,
    connect_lock: tokio::sync::Mutex<()>,
}

/// JSON-RPC client for an aria2 daemon
///
/// Calls go over the WebSocket connection while one is open and fall back
/// to one HTTP POST per call otherwise. Responses are matched to calls by
/// id; daemon notifications are routed to the registered handlers.
///
/// Cloning is cheap and every clone shares the same connection, pending
/// calls and hooks. All operations must run inside a Tokio runtime.
///
/// # Example
///
/// ```ignore
/// let client = Aria2Client::new(ClientConfig::default().with_secret("hunter2"));
/// client.on_download_complete(|params| println!("done: {params:?}"));
/// client.connect().await?;
///
/// let gid = client.add_uri(vec![json!(["http://example.org/file.iso"])])?.await?;
/// let status = client.tell_status(vec![gid])?.await?;
/// client.disconnect().await;
/// ```
#[derive(Clone)]
pub struct Aria2Client {
    inner: Arc<Inner>,
}

impl Aria2Client {
    /// Create a client using the WebSocket and `reqwest` transports.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transports(
            config,
            Arc::new(WebSocketTransport::new()),
            Arc::new(ReqwestTransport::new()),
        )
    }

    pub fn with_transports(
        config: ClientConfig,
        duplex: Arc<dyn DuplexTransport>,
        http: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config: RwLock::new(config),
                active: Mutex::new(ActiveTransport::Http),
                pending: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                hooks: Hooks::default(),
                duplex,
                http,
                connect_lock: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> ClientConfig {
        self.inner.config.read().clone()
    }

    /// Replace the configuration. Affects later calls and connects only; an
    /// open connection stays on the endpoint it was opened with.
    pub fn set_config(&self, config: ClientConfig) {
        *self.inner.config.write() = config;
    }

    pub fn mode(&self) -> TransportMode {
        match &*self.inner.active.lock() {
            ActiveTransport::Duplex(_) => TransportMode::DuplexOpen,
            ActiveTransport::Http => TransportMode::RequestResponseOnly,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.mode() == TransportMode::DuplexOpen
    }

    /// Number of calls still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Issue a call and return a future for its result.
    ///
    /// `method` may be a short name (`addUri`) or a fully qualified one
    /// (`aria2.addUri`, `system.multicall`). The secret token, if any, is
    /// prepended to `params`. The call is registered and queued before this
    /// returns, so ids follow the order of `call` invocations.
    pub fn call(&self, method: &str, params: Vec<Value>) -> Result<PendingCall> {
        if method.is_empty() {
            return Err(Error::InvalidArgument(
                "method name must not be empty".to_string(),
            ));
        }

        let config = self.inner.config.read().clone();
        let method = qualify_method(method).into_owned();

        let mut positional = Vec::with_capacity(params.len() + 1);
        positional.extend(token_param(&config.secret));
        positional.extend(params);

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let request = Request::new(id, method, positional);
        let envelope = serde_json::to_value(&request)?;
        self.inner.hooks.fire_send(&envelope);

        let link = match &*self.inner.active.lock() {
            ActiveTransport::Duplex(link) => Some(link.commands.clone()),
            ActiveTransport::Http => None,
        };
        let payload = if link.is_some() {
            request.to_json()?
        } else {
            request.to_http_body()?
        };

        let (completion, receiver) = oneshot::channel();
        self.inner.pending.lock().insert(id, completion);
        debug!(id, method = %request.method, "Dispatching call");

        match link {
            Some(commands) => {
                if commands.send(Command::Frame { id, text: payload }).is_err() {
                    self.inner
                        .complete(id, Err(Error::Transport(TransportError::Closed)));
                }
            }
            None => {
                let inner = self.inner.clone();
                let url = config.endpoint().http_url();
                tokio::spawn(async move {
                    match inner.http.request(HttpRequest::post_json(url, payload)).await {
                        Ok(envelope) => inner.handle_message(&envelope),
                        Err(e) => {
                            warn!(id, error = %e, "HTTP exchange failed");
                            inner.complete(id, Err(Error::Transport(e)));
                        }
                    }
                });
            }
        }

        // Expires the slot whether or not the returned future is polled.
        if let Some(after) = config.request_timeout() {
            let client = Arc::downgrade(&self.inner);
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                if let Some(inner) = client.upgrade() {
                    if inner.complete(id, Err(Error::Timeout { id, after })) {
                        debug!(id, ?after, "Call timed out");
                    }
                }
            });
        }

        Ok(PendingCall { id, receiver })
    }

    /// Issue a call and wait for its result.
    pub async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.call(method, params)?.await
    }

    pub(crate) fn call_method(&self, method: Method, params: Vec<Value>) -> Result<PendingCall> {
        self.call(method.full_name(), params)
    }

    /// Run several calls in one `system.multicall` round trip.
    ///
    /// Each nested call carries the secret token itself. The result is an
    /// array with one entry per call: a one-element array holding the
    /// result, or a fault object.
    pub fn multicall_batch(&self, calls: Vec<(Method, Vec<Value>)>) -> Result<PendingCall> {
        let token = token_param(&self.inner.config.read().secret);
        let batch: Vec<Value> = calls
            .into_iter()
            .map(|(method, params)| {
                let mut positional = Vec::with_capacity(params.len() + 1);
                positional.extend(token.clone());
                positional.extend(params);
                json!({
                    "methodName": method.full_name(),
                    "params": positional,
                })
            })
            .collect();

        self.call(Method::Multicall.full_name(), vec![Value::Array(batch)])
    }

    /// Open the WebSocket connection.
    ///
    /// Resolves once the connection is open and `on_open` has fired. Does
    /// nothing if a connection is already open. A failed open fires
    /// `on_close` and leaves the client on HTTP.
    pub async fn connect(&self) -> Result<()> {
        let _guard = self.inner.connect_lock.lock().await;
        if self.is_connected() {
            return Ok(());
        }

        let url = self.inner.config.read().endpoint().websocket_url();
        debug!(%url, "Opening connection");
        let DuplexParts { sink, stream } = match self.inner.duplex.open(&url).await {
            Ok(parts) => parts,
            Err(e) => {
                warn!(%url, error = %e, "Failed to open connection");
                self.inner.hooks.fire_close();
                return Err(e.into());
            }
        };

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed) = watch::channel(false);
        *self.inner.active.lock() = ActiveTransport::Duplex(DuplexLink {
            generation,
            commands,
            closed,
        });
        info!(%url, "Connected to daemon");

        self.inner.hooks.fire_open();
        tokio::spawn(run_connection(
            Arc::downgrade(&self.inner),
            generation,
            sink,
            stream,
            commands_rx,
            closed_tx,
        ));
        Ok(())
    }

    /// Close the WebSocket connection and wait until it is closed.
    ///
    /// Returns immediately when no connection is open. Calls still waiting
    /// for a response stay pending.
    pub async fn disconnect(&self) {
        let (commands, mut closed) = match &*self.inner.active.lock() {
            ActiveTransport::Duplex(link) => (link.commands.clone(), link.closed.clone()),
            ActiveTransport::Http => return,
        };

        // Fails when the daemon already closed the link; the task is then
        // finishing on its own and is waited for all the same.
        let _ = commands.send(Command::Close);
        let _ = closed.wait_for(|closed| *closed).await;
    }

    /// Observe every outbound envelope just before it is dispatched.
    pub fn on_send<F>(&self, hook: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.hooks.set_send(Arc::new(hook));
    }

    /// Observe every inbound envelope before it is dispatched.
    pub fn on_message<F>(&self, hook: F)
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.inner.hooks.set_message(Arc::new(hook));
    }

    pub fn on_open<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.hooks.set_open(Arc::new(hook));
    }

    /// Runs whenever the connection closes, locally or remotely.
    pub fn on_close<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.hooks.set_close(Arc::new(hook));
    }

    /// Handle one daemon notification. Replaces any previous handler.
    pub fn on_notification<F>(&self, notification: Notification, handler: F)
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.inner
            .hooks
            .set_notification(notification, Arc::new(handler));
    }

    pub fn clear_hook(&self, event: Event) {
        self.inner.hooks.clear(event);
    }

    pub fn clear_notification(&self, notification: Notification) {
        self.inner.hooks.clear_notification(notification);
    }
}

impl Inner {
    /// Resolve a pending call. Returns `false` if it was already gone.
    fn complete(&self, id: u64, outcome: Result<Value>) -> bool {
        let completion = self.pending.lock().remove(&id);
        match completion {
            Some(completion) => {
                let _ = completion.send(outcome);
                true
            }
            None => false,
        }
    }

    fn handle_frame(&self, text: &str) {
        match serde_json::from_str::<Value>(text) {
            Ok(envelope) => self.handle_message(&envelope),
            Err(e) => warn!(error = %e, "Dropping malformed frame"),
        }
    }

    fn handle_message(&self, envelope: &Value) {
        self.hooks.fire_message(envelope);

        match Message::classify(envelope) {
            Message::Response { id, outcome } => {
                let completion = id.and_then(|id| self.pending.lock().remove(&id));
                match completion {
                    Some(completion) => {
                        debug!(?id, ok = outcome.is_ok(), "Response received");
                        let _ = completion.send(outcome.map_err(Error::Rpc));
                    }
                    None => trace!(?id, "Dropping response for unknown call"),
                }
            }
            Message::Notification { method, params } => {
                let handler =
                    Notification::from_method(&method).and_then(|n| self.hooks.notification(n));
                match handler {
                    Some(handler) => {
                        debug!(%method, "Dispatching notification");
                        handler(&params);
                    }
                    None => trace!(%method, "Ignoring notification"),
                }
            }
            Message::Unknown => trace!("Ignoring envelope without id or method"),
        }
    }

    fn connection_closed(&self, generation: u64) {
        {
            let mut active = self.active.lock();
            if matches!(&*active, ActiveTransport::Duplex(link) if link.generation == generation) {
                *active = ActiveTransport::Http;
            }
        }
        info!("Connection closed");
        self.hooks.fire_close();
    }
}

/// Owns one duplex connection: writes queued frames, dispatches inbound
/// frames and tears the link down when either side closes.
async fn run_connection(
    client: Weak<Inner>,
    generation: u64,
    mut sink: FrameSink,
    mut stream: FrameStream,
    mut commands: mpsc::UnboundedReceiver<Command>,
    closed: watch::Sender<bool>,
) {
    let mut stream_open = true;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Frame { id, text }) => {
                    trace!(id, "Writing frame");
                    if let Err(e) = sink.send(text).await {
                        warn!(id, error = %e, "Failed to write frame");
                        if let Some(inner) = client.upgrade() {
                            inner.complete(id, Err(Error::Transport(e)));
                        }
                        break;
                    }
                }
                Some(Command::Close) => {
                    debug!("Closing connection");
                    break;
                }
                None => break,
            },
            frame = stream.next() => match frame {
                Some(Ok(text)) => match client.upgrade() {
                    Some(inner) => inner.handle_frame(&text),
                    None => break,
                },
                Some(Err(e)) => {
                    warn!(error = %e, "Connection failed");
                    stream_open = false;
                    break;
                }
                None => {
                    debug!("Connection closed by daemon");
                    stream_open = false;
                    break;
                }
            },
        }
    }

    if let Err(e) = sink.close().await {
        trace!(error = %e, "Close handshake failed");
    }
    if stream_open {
        // Responses already in flight are still delivered until the daemon
        // acknowledges the close.
        let drain = async {
            while let Some(Ok(text)) = stream.next().await {
                match client.upgrade() {
                    Some(inner) => inner.handle_frame(&text),
                    None => break,
                }
            }
        };
        if tokio::time::timeout(CLOSE_TIMEOUT, drain).await.is_err() {
            debug!("Daemon did not finish the close handshake in time");
        }
    }

    commands.close();
    let inner = client.upgrade();
    while let Ok(command) = commands.try_recv() {
        if let (Command::Frame { id, .. }, Some(inner)) = (command, &inner) {
            inner.complete(id, Err(Error::Transport(TransportError::Closed)));
        }
    }

    if let Some(inner) = inner {
        inner.connection_closed(generation);
    }
    let _ = closed.send(true);
}

/// Result of one call, resolved when the matching response arrives
///
/// Dropping it does not cancel the call; the response is discarded when it
/// comes in, and a configured timeout still frees the slot.
#[derive(Debug)]
#[must_use = "a call's result is only observed by awaiting it"]
pub struct PendingCall {
    id: u64,
    receiver: oneshot::Receiver<Result<Value>>,
}

impl PendingCall {
    /// Request id the call went out with.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Future for PendingCall {
    type Output = Result<Value>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Abandoned { id })),
            Poll::Pending => Poll::Pending,
        }
    }
}
