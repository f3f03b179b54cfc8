//! HTTP transport using the reqwest crate.

use color_eyre::eyre::WrapErr as _;
use reqwest::header::HeaderMap;

use crate::{DeliveryRequest, DispatcherConfig, RawResponse, Transport};

/// Transport that POSTs over HTTP(S).
///
/// A fresh client is built for every request and dropped afterwards, so no
/// connection outlives a single delivery attempt.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    user_agent: Option<String>,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport from dispatcher settings.
    pub fn from_config(config: &DispatcherConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
        }
    }

    /// Set the user agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

impl Transport for HttpTransport {
    async fn post(&self, request: &DeliveryRequest) -> color_eyre::eyre::Result<RawResponse> {
        let mut builder = reqwest::Client::builder().connect_timeout(request.connect_timeout);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        let client = builder.build().wrap_err("failed to build HTTP client")?;

        let mut req = client.post(&request.url).body(request.body.clone());
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req
            .send()
            .await
            .wrap_err_with(|| format!("POST to {} failed", request.url))?;

        let head = format_head(response.status(), response.version(), response.headers());
        tracing::trace!(url = %request.url, head = %head, "received response head");

        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                tracing::warn!(url = %request.url, error = %e, "failed to read response body");
                Vec::new()
            }
        };

        Ok(RawResponse { head, body })
    }
}

/// Render the status line and headers as raw HTTP header text.
pub(crate) fn format_head(
    status: reqwest::StatusCode,
    version: reqwest::Version,
    headers: &HeaderMap,
) -> String {
    let mut head = format!("{version:?} {status}\r\n");
    for (name, value) in headers {
        head.push_str(name.as_str());
        head.push_str(": ");
        head.push_str(&String::from_utf8_lossy(value.as_bytes()));
        head.push_str("\r\n");
    }
    head
}
