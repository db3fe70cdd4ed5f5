use std::convert::Infallible;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::Result;

/// Extensions sent natively as video/audio; everything else goes out as a
/// plain document.
const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mkv", "mov", "avi"];
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "m4a", "flac", "wav"];

/// How a file is presented to the remote service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Audio,
    Document,
}

impl FileKind {
    /// Classifies a file by extension. `force_document` overrides the
    /// video/audio classification, never the other way around.
    pub fn classify(path: &Path, force_document: bool) -> FileKind {
        if force_document {
            return FileKind::Document;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return FileKind::Document;
        };
        let ext = ext.to_ascii_lowercase();

        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Audio
        } else {
            FileKind::Document
        }
    }
}

/// A destination chat: either a numeric id or a public @username.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatTarget {
    Id(i64),
    Username(String),
}

impl FromStr for ChatTarget {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(ChatTarget::from_user_input(s))
    }
}

impl ChatTarget {
    /// Any string is a valid target: digits (with optional sign) become a
    /// numeric id, everything else a username.
    pub fn from_user_input(s: &str) -> ChatTarget {
        match s.parse::<i64>() {
            Ok(id) => ChatTarget::Id(id),
            Err(_) => ChatTarget::Username(s.trim_start_matches('@').to_owned()),
        }
    }

    /// The `chat_id` value the Bot API expects: a JSON integer for ids, a
    /// `@username` string otherwise.
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            ChatTarget::Id(id) => serde_json::Value::from(*id),
            ChatTarget::Username(name) => serde_json::Value::from(format!("@{name}")),
        }
    }
}

/// Reference to one live, editable status message. Created per upload,
/// edited zero or more times, finalized exactly once, then discarded.
#[derive(Clone, Debug)]
pub struct MessageHandle {
    pub chat: ChatTarget,
    pub message_id: i64,
}

/// Async seam for byte-transfer progress. The transport calls this as it
/// pushes file bytes; awaiting inside the sink stalls the transfer, which is
/// exactly how flood-control backoff is applied.
#[async_trait::async_trait]
pub trait ProgressSink: Send + Sync {
    async fn on_progress(&self, current_bytes: u64, total_bytes: u64);
}

/// The messaging-service capability the upload core consumes: send a file of
/// a given kind with a progress sink, and post/edit status messages. Edits
/// and sends may fail with the distinguished
/// [`BotClientError::RateLimited`](crate::BotClientError::RateLimited)
/// signal when the service applies flood control.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(&self, chat: &ChatTarget, text: &str, topic: Option<i64>) -> Result<MessageHandle>;

    async fn edit_message(&self, handle: &MessageHandle, text: &str) -> Result<()>;

    async fn send_file(
        &self,
        kind: FileKind,
        path: &Path,
        caption: &str,
        chat: &ChatTarget,
        topic: Option<i64>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<()>;
}
