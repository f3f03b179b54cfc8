//! Notification kinds.

/// Concrete MPNS notification kind.
///
/// Each kind combines a [`Family`] with a [`Delivery`] timing hint. The numeric
/// value returned by [`NotificationKind::class`] is what goes on the wire as
/// `X-NotificationClass`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TileImmediate,
    TileDelayShort,
    TileDelayLong,
    ToastImmediate,
    ToastDelayShort,
    ToastDelayLong,
    RawImmediate,
    RawDelayShort,
    RawDelayLong,
    /// Not configured. Never renders a payload.
    #[default]
    Unknown,
}

/// Payload family of a notification kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Tile,
    Toast,
    Raw,
    Unknown,
}

/// Delivery timing hint carried by the notification class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delivery {
    /// Delivered immediately.
    Immediate,
    /// Delivered within 450 seconds.
    DelayShort,
    /// Delivered within 900 seconds.
    DelayLong,
}

impl Delivery {
    /// Upper bound on the delivery delay in seconds.
    pub fn max_delay_secs(self) -> u64 {
        match self {
            Self::Immediate => 0,
            Self::DelayShort => 450,
            Self::DelayLong => 900,
        }
    }
}

/// Error parsing a notification kind.
#[derive(Debug, thiserror::Error)]
pub enum KindError {
    #[error("unknown notification kind: {0}")]
    UnknownName(String),
}

impl NotificationKind {
    /// All kinds that can be sent.
    pub const SENDABLE: [Self; 9] = [
        Self::TileImmediate,
        Self::TileDelayShort,
        Self::TileDelayLong,
        Self::ToastImmediate,
        Self::ToastDelayShort,
        Self::ToastDelayLong,
        Self::RawImmediate,
        Self::RawDelayShort,
        Self::RawDelayLong,
    ];

    /// Numeric notification class sent as `X-NotificationClass`.
    pub fn class(self) -> i32 {
        match self {
            Self::TileImmediate => 1,
            Self::TileDelayShort => 11,
            Self::TileDelayLong => 21,
            Self::ToastImmediate => 2,
            Self::ToastDelayShort => 12,
            Self::ToastDelayLong => 22,
            Self::RawImmediate => 3,
            Self::RawDelayShort => 13,
            Self::RawDelayLong => 23,
            Self::Unknown => -1,
        }
    }

    /// Map a numeric class back to a kind. Unrecognized values are `Unknown`.
    pub fn from_class(class: i32) -> Self {
        Self::SENDABLE
            .into_iter()
            .find(|kind| kind.class() == class)
            .unwrap_or(Self::Unknown)
    }

    /// Payload family this kind belongs to.
    pub fn family(self) -> Family {
        match self {
            Self::TileImmediate | Self::TileDelayShort | Self::TileDelayLong => Family::Tile,
            Self::ToastImmediate | Self::ToastDelayShort | Self::ToastDelayLong => Family::Toast,
            Self::RawImmediate | Self::RawDelayShort | Self::RawDelayLong => Family::Raw,
            Self::Unknown => Family::Unknown,
        }
    }

    /// Delivery timing hint, `None` for `Unknown`.
    pub fn delivery(self) -> Option<Delivery> {
        match self {
            Self::TileImmediate | Self::ToastImmediate | Self::RawImmediate => {
                Some(Delivery::Immediate)
            }
            Self::TileDelayShort | Self::ToastDelayShort | Self::RawDelayShort => {
                Some(Delivery::DelayShort)
            }
            Self::TileDelayLong | Self::ToastDelayLong | Self::RawDelayLong => {
                Some(Delivery::DelayLong)
            }
            Self::Unknown => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::TileImmediate => "tile_immediate",
            Self::TileDelayShort => "tile_delay_short",
            Self::TileDelayLong => "tile_delay_long",
            Self::ToastImmediate => "toast_immediate",
            Self::ToastDelayShort => "toast_delay_short",
            Self::ToastDelayLong => "toast_delay_long",
            Self::RawImmediate => "raw_immediate",
            Self::RawDelayShort => "raw_delay_short",
            Self::RawDelayLong => "raw_delay_long",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for NotificationKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::SENDABLE
            .into_iter()
            .chain(std::iter::once(Self::Unknown))
            .find(|kind| kind.name() == lowered)
            .ok_or_else(|| KindError::UnknownName(s.to_string()))
    }
}
