//! Configuration shared by the facade and the session gateways.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where a gateway connects and which service it opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Host running the provider's API process.
    pub host: String,
    /// TCP port of the API process.
    pub port: u16,
    /// Service opened after the session starts.
    pub service: String,
}

impl ConnectionConfig {
    /// `host:port` as used in connection diagnostics.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8194,
            service: "//blp/refdata".to_string(),
        }
    }
}

/// Global configuration for the `Blp` facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlpConfig {
    /// Connection target handed to gateways that need one.
    pub connection: ConnectionConfig,
    /// Open the session on first use instead of failing with `NotConnected`.
    pub auto_open: bool,
    /// Bounded wait of a single poll of the event stream.
    pub poll_timeout: Duration,
    /// Optional deadline for one whole request, from send to terminal event.
    pub request_timeout: Option<Duration>,
}

impl Default for BlpConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            auto_open: true,
            poll_timeout: Duration::from_millis(500),
            request_timeout: None,
        }
    }
}
