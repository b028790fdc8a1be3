/// Address of an aria2 RPC interface
///
/// The same host, port and path serve both transports; `secure` picks
/// `wss`/`https` over `ws`/`http`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub secure: bool,
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Endpoint {
    pub fn new(secure: bool, host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            secure,
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    /// URL for the duplex (WebSocket) transport.
    pub fn websocket_url(&self) -> String {
        self.url(if self.secure { "wss" } else { "ws" })
    }

    /// URL for the request/response (HTTP POST) transport.
    pub fn http_url(&self) -> String {
        self.url(if self.secure { "https" } else { "http" })
    }

    fn url(&self, scheme: &str) -> String {
        format!("{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }
}
