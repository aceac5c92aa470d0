//! User-facing notifications.
//!
//! Background work reports outcomes as [`Notice`]s over a bounded channel
//! that the TUI drains on every tick. Sending never blocks: a full or
//! closed channel drops the notice.

use std::future::Future;

use tokio::sync::mpsc;

use crate::api::ApiError;

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// An operation succeeded.
    Success(String),
    /// An operation failed.
    Error(String),
}

impl Notice {
    /// The message text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }

    /// Whether this notice reports a failure.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Sending half of the notice channel.
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: mpsc::Sender<Notice>,
}

/// Creates a notice channel holding at most `buffer` undelivered notices.
#[must_use]
pub fn channel(buffer: usize) -> (NoticeSender, mpsc::Receiver<Notice>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (NoticeSender { tx }, rx)
}

impl NoticeSender {
    /// Queues `notice` without waiting.
    pub fn send(&self, notice: Notice) {
        match self.tx.try_send(notice) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(notice)) => {
                tracing::warn!(text = notice.text(), "notice channel full, dropping notice");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("notice receiver gone");
            }
        }
    }

    /// Queues a success notice.
    pub fn success(&self, text: impl Into<String>) {
        self.send(Notice::Success(text.into()));
    }

    /// Queues an error notice.
    pub fn error(&self, text: impl Into<String>) {
        self.send(Notice::Error(text.into()));
    }
}

/// Awaits `fut` and reports the outcome.
///
/// On success `success` is shown; on failure the backend's message, or
/// `fallback` when it sent none. The result is passed through.
///
/// # Errors
///
/// Returns the [`ApiError`] produced by `fut`.
pub async fn with_notice<T, F>(
    notices: &NoticeSender,
    fut: F,
    success: &str,
    fallback: &str,
) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match fut.await {
        Ok(value) => {
            notices.success(success);
            Ok(value)
        }
        Err(error) => {
            tracing::warn!(error = %error, "{fallback}");
            notices.error(error.user_message(fallback));
            Err(error)
        }
    }
}
