//! MPNS wire protocol: request headers and response status extraction.

use std::sync::LazyLock;
use std::time::Duration;

use mpns_core::{DeliveryResponse, NotificationMessage, Payload};
use regex::Regex;

use crate::DeliveryRequest;

pub const NOTIFICATION_CLASS: &str = "X-NotificationClass";
pub const MESSAGE_ID: &str = "X-MessageID";
pub const TARGET: &str = "X-WindowsPhone-Target";

pub const SUBSCRIPTION_STATUS: &str = "X-SubscriptionStatus";
pub const NOTIFICATION_STATUS: &str = "X-NotificationStatus";
pub const DEVICE_CONNECTION_STATUS: &str = "X-DeviceConnectionStatus";

static SUBSCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| header_pattern(SUBSCRIPTION_STATUS));
static NOTIFICATION_RE: LazyLock<Regex> = LazyLock::new(|| header_pattern(NOTIFICATION_STATUS));
static DEVICE_RE: LazyLock<Regex> = LazyLock::new(|| header_pattern(DEVICE_CONNECTION_STATUS));

fn header_pattern(name: &str) -> Regex {
    Regex::new(&format!(r"(?im)^{}:[ \t]*([^\r\n]*)", regex::escape(name)))
        .expect("header pattern is valid")
}

/// Build the delivery request for a message and its rendered payload.
pub fn build_request(
    message: &NotificationMessage,
    payload: Payload,
    connect_timeout: Duration,
) -> DeliveryRequest {
    let mut headers = vec![
        ("Content-Type".to_string(), "text/xml".to_string()),
        ("Accept".to_string(), "application/*".to_string()),
        (NOTIFICATION_CLASS.to_string(), message.kind.class().to_string()),
    ];

    if let Some(id) = message.correlation_id.as_deref().filter(|id| !id.is_empty()) {
        headers.push((MESSAGE_ID.to_string(), id.to_string()));
    }

    if !message.destination.is_empty() {
        headers.push((TARGET.to_string(), message.destination.clone()));
    }

    DeliveryRequest {
        url: message.destination.clone(),
        headers,
        body: payload.into_bytes(),
        connect_timeout,
    }
}

/// Extract the MPNS status headers from raw response header text.
///
/// Header names match case-insensitively; the first occurrence wins and a
/// missing header yields an empty string.
pub fn parse_status(head: &str) -> DeliveryResponse {
    DeliveryResponse {
        subscription_status: capture(&SUBSCRIPTION_RE, head),
        notification_status: capture(&NOTIFICATION_RE, head),
        device_connection_status: capture(&DEVICE_RE, head),
    }
}

fn capture(re: &Regex, head: &str) -> String {
    re.captures(head)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim_end().to_string())
        .unwrap_or_default()
}
