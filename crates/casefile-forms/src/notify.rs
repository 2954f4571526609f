//! Notification sink seam

use std::fmt::{self, Display, Formatter};

/// Kind of user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Operation completed
    Success,
    /// Operation failed
    Error,
}

impl Display for NoticeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
        })
    }
}

/// Fire-and-forget user notification
pub trait NotificationSink: Send + Sync {
    /// Surface `message` to the user
    fn notify(&self, kind: NoticeKind, message: &str);
}

/// Sink that only writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Success => tracing::info!(%kind, message, "notice"),
            NoticeKind::Error => tracing::warn!(%kind, message, "notice"),
        }
    }
}
