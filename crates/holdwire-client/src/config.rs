//! Endpoint configuration.

/// Base endpoints derived from the API host.
///
/// Debug builds talk to a local plaintext server; production always uses
/// TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// WebSocket endpoint for the persistent gameplay connection.
    pub ws: String,
    /// HTTP endpoint for request/response calls (room stats).
    pub http: String,
}

impl Endpoints {
    /// Build endpoints for `api_host` (`host` or `host:port`).
    #[must_use]
    pub fn new(api_host: &str, debug: bool) -> Self {
        let (ws_proto, http_proto) = if debug { ("ws", "http") } else { ("wss", "https") };
        Self {
            ws: format!("{ws_proto}://{api_host}/ws"),
            http: format!("{http_proto}://{api_host}/api"),
        }
    }
}
