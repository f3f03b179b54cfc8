//! Notification messages and payload rendering.

use std::collections::HashMap;

use crate::{Family, NotificationKind, xml};

/// Caller-side annotation value. Never transmitted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for MetadataValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<u8>> for MetadataValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

/// Rendered wire payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    /// Payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload as UTF-8 text, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Consume into the payload bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the payload has no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

/// A single push notification addressed to one device channel.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationMessage {
    /// Device channel URL the notification is POSTed to.
    pub destination: String,

    /// Notification kind. Defaults to [`NotificationKind::Unknown`].
    pub kind: NotificationKind,

    /// Tile title or first toast line.
    pub title: Option<String>,

    /// Second toast line.
    pub body_text: Option<String>,

    /// Tile background image URI.
    pub image_ref: Option<String>,

    /// Tile badge count.
    pub badge_count: Option<i64>,

    /// Raw notification body, sent verbatim.
    pub raw_payload: Option<Vec<u8>>,

    /// Sent as `X-MessageID` when present.
    pub correlation_id: Option<String>,

    /// Caller annotations, never sent.
    pub metadata: HashMap<String, MetadataValue>,
}

impl NotificationMessage {
    /// Create a new message for a device channel URL.
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            kind: NotificationKind::Unknown,
            title: None,
            body_text: None,
            image_ref: None,
            badge_count: None,
            raw_payload: None,
            correlation_id: None,
            metadata: HashMap::new(),
        }
    }

    /// Toast notification with both text lines set.
    pub fn toast(
        destination: impl Into<String>,
        title: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self::new(destination)
            .with_kind(NotificationKind::ToastImmediate)
            .with_title(title)
            .with_body_text(body_text)
    }

    /// Raw notification carrying `payload` verbatim.
    pub fn raw(destination: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(destination)
            .with_kind(NotificationKind::RawImmediate)
            .with_raw_payload(payload)
    }

    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body_text(mut self, text: impl Into<String>) -> Self {
        self.body_text = Some(text.into());
        self
    }

    pub fn with_image_ref(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }

    pub fn with_badge_count(mut self, count: i64) -> Self {
        self.badge_count = Some(count);
        self
    }

    pub fn with_raw_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.raw_payload = Some(payload.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    /// Set a random UUID as the correlation id. MPNS expects a GUID here.
    pub fn with_generated_message_id(self) -> Self {
        self.with_correlation_id(uuid::Uuid::new_v4().to_string())
    }

    /// Attach a metadata entry, replacing any previous value for `key`.
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Self {
        self.set_property(key, value);
        self
    }

    /// Attach a metadata entry, replacing any previous value for `key`.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Look up a metadata entry.
    pub fn property(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata.get(key)
    }

    /// Payload family of this message.
    pub fn family(&self) -> Family {
        self.kind.family()
    }

    /// Render the wire payload, escaping interpolated XML text.
    ///
    /// Returns `None` for `Unknown` kinds and for raw notifications without a
    /// body or with an empty one.
    pub fn render(&self) -> Option<Payload> {
        self.render_with(|text| xml::escape(text).into_owned())
    }

    /// Render the wire payload with text interpolated verbatim.
    ///
    /// The caller is responsible for keeping markup out of the text fields.
    pub fn render_unescaped(&self) -> Option<Payload> {
        self.render_with(str::to_string)
    }

    fn render_with(&self, text: impl Fn(&str) -> String) -> Option<Payload> {
        let field = |value: &Option<String>| text(value.as_deref().unwrap_or_default());

        match self.family() {
            Family::Toast => Some(xml::toast(&field(&self.title), &field(&self.body_text)).into()),
            Family::Tile => {
                let count = self.badge_count.map(|c| c.to_string()).unwrap_or_default();
                Some(xml::tile(&field(&self.image_ref), &count, &field(&self.title)).into())
            }
            Family::Raw => self
                .raw_payload
                .as_ref()
                .filter(|raw| !raw.is_empty())
                .map(|raw| Payload(raw.clone())),
            Family::Unknown => None,
        }
    }
}
