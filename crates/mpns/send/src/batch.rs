//! TOML batch files.

use std::collections::HashMap;
use std::path::Path;

use color_eyre::eyre::WrapErr as _;
use mpns_core::{MetadataValue, NotificationKind, NotificationMessage};
use mpns_push::DispatcherConfig;
use serde::Deserialize;

/// A batch of notifications plus dispatcher settings.
#[derive(Debug, Deserialize)]
pub struct Batch {
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default, rename = "notification")]
    pub notifications: Vec<NotificationEntry>,
}

/// One `[[notification]]` table.
#[derive(Debug, Deserialize)]
pub struct NotificationEntry {
    pub destination: String,
    #[serde(default)]
    pub kind: NotificationKind,
    pub title: Option<String>,
    pub body_text: Option<String>,
    pub image_ref: Option<String>,
    pub badge_count: Option<i64>,
    /// Raw notification body.
    pub raw: Option<String>,
    pub message_id: Option<String>,
    #[serde(default)]
    pub generate_message_id: bool,
    #[serde(default)]
    pub metadata: HashMap<String, MetadataValue>,
}

impl Batch {
    pub fn load(path: &Path) -> color_eyre::eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).wrap_err_with(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> color_eyre::eyre::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Build the messages in file order.
    pub fn messages(&self) -> Vec<NotificationMessage> {
        self.notifications.iter().map(NotificationEntry::to_message).collect()
    }
}

impl NotificationEntry {
    fn to_message(&self) -> NotificationMessage {
        let mut message = NotificationMessage::new(&self.destination).with_kind(self.kind);
        message.title = self.title.clone();
        message.body_text = self.body_text.clone();
        message.image_ref = self.image_ref.clone();
        message.badge_count = self.badge_count;
        message.raw_payload = self.raw.as_ref().map(|r| r.clone().into_bytes());
        message.metadata = self.metadata.clone();

        match &self.message_id {
            Some(id) => message.with_correlation_id(id),
            None if self.generate_message_id => message.with_generated_message_id(),
            None => message,
        }
    }
}
