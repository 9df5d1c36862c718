//! User-facing notices emitted by controllers.
//!
//! Controllers never print or render; they push notices into an unbounded
//! inbox and the front end decides how to display them.

use tokio::sync::mpsc;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information (e.g. "key was already removed").
    Info,
    /// A completed operation.
    Success,
    /// A failed operation the user may retry.
    Error,
}

/// A single user-visible notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sender half of the notice inbox.
pub type NoticeSender = mpsc::UnboundedSender<Notice>;

/// Receiver half of the notice inbox.
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

/// Creates a new notice inbox.
pub fn channel() -> (NoticeSender, NoticeReceiver) {
    mpsc::unbounded_channel()
}
