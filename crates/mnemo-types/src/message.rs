//! Inbound message and long-term archive entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Reserved category marking long-term entries that were auto-archived
/// from the short-term window (as opposed to user-pinned notes).
pub const ARCHIVED_CATEGORY: &str = "message";

/// Media type of an inbound chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Audio,
    Video,
    Document,
    Location,
    Interactive,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Image => write!(f, "image"),
            MessageKind::Audio => write!(f, "audio"),
            MessageKind::Video => write!(f, "video"),
            MessageKind::Document => write!(f, "document"),
            MessageKind::Location => write!(f, "location"),
            MessageKind::Interactive => write!(f, "interactive"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            "audio" => Ok(MessageKind::Audio),
            "video" => Ok(MessageKind::Video),
            "document" => Ok(MessageKind::Document),
            "location" => Ok(MessageKind::Location),
            "interactive" => Ok(MessageKind::Interactive),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

/// A single inbound message in the short-term window.
///
/// Immutable once created except for the `processed` flag, which the
/// dispatch layer flips after downstream handling completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    pub content: String,
    /// Transport metadata passed through opaquely (sender device, media
    /// ids, and so on).
    pub metadata: serde_json::Value,
    pub processed: bool,
}

impl Message {
    /// Create an unprocessed message stamped now.
    pub fn new(kind: MessageKind, content: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            kind,
            content: content.into(),
            metadata,
            processed: false,
        }
    }
}

/// An entry in the long-term archive.
///
/// Holds both overflow from the short-term window (category
/// [`ARCHIVED_CATEGORY`]) and user-pinned notes ("remember this"),
/// distinguished by `category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTermEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub category: String,
    pub metadata: serde_json::Value,
}

impl LongTermEntry {
    /// Archive a short-term message verbatim.
    pub fn archived(message: Message) -> Self {
        Self {
            id: message.id,
            timestamp: message.timestamp,
            content: message.content,
            category: ARCHIVED_CATEGORY.to_string(),
            metadata: message.metadata,
        }
    }

    /// Whether this entry was auto-archived rather than user-pinned.
    pub fn is_archived_message(&self) -> bool {
        self.category == ARCHIVED_CATEGORY
    }
}
