//! Transport traits.

use std::time::Duration;

/// One HTTP POST to a device channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRequest {
    /// Device channel URL.
    pub url: String,
    /// Request headers in send order.
    pub headers: Vec<(String, String)>,
    /// Rendered payload.
    pub body: Vec<u8>,
    /// Bound on connection establishment.
    pub connect_timeout: Duration,
}

impl DeliveryRequest {
    /// First header value matching `name` case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP response as seen by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Status line and header lines, `\r\n` separated.
    pub head: String,
    /// Response body.
    pub body: Vec<u8>,
}

/// Low-level HTTP sender used by the dispatcher.
#[trait_variant::make(Send)]
pub trait Transport: Send + Sync {
    /// POST the request and return the raw response.
    async fn post(&self, request: &DeliveryRequest) -> color_eyre::eyre::Result<RawResponse>;
}
