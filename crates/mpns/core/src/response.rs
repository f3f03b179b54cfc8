//! Delivery response types.

/// `X-NotificationStatus` value for an accepted notification.
pub const RECEIVED: &str = "Received";

/// Status headers reported by MPNS for one delivery attempt.
///
/// Missing headers are recorded as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeliveryResponse {
    /// `X-SubscriptionStatus` (e.g. "Active", "Expired").
    pub subscription_status: String,
    /// `X-NotificationStatus` (e.g. "Received", "Dropped", "QueueFull").
    pub notification_status: String,
    /// `X-DeviceConnectionStatus` (e.g. "Connected", "TempDisconnected").
    pub device_connection_status: String,
}

impl DeliveryResponse {
    /// Whether the push service accepted the notification.
    pub fn is_received(&self) -> bool {
        self.notification_status == RECEIVED
    }

    /// Whether no status header came back at all.
    pub fn is_empty(&self) -> bool {
        self.subscription_status.is_empty()
            && self.notification_status.is_empty()
            && self.device_connection_status.is_empty()
    }
}

/// Terminal state of one message after a dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryOutcome {
    /// Push service reported `Received`.
    Delivered,
    /// Response came back without a `Received` status.
    NotReceived,
    /// The HTTP request itself failed.
    TransportFailed,
    /// The message produced no payload.
    RenderFailed,
}

impl DeliveryOutcome {
    pub fn is_success(self) -> bool {
        self == Self::Delivered
    }
}

impl std::fmt::Display for DeliveryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delivered => write!(f, "Delivered"),
            Self::NotReceived => write!(f, "NotReceived"),
            Self::TransportFailed => write!(f, "TransportFailed"),
            Self::RenderFailed => write!(f, "RenderFailed"),
        }
    }
}
