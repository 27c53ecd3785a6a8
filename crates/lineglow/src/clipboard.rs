use futures::future::LocalBoxFuture;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard API is not available")]
    Unavailable,
    #[error("clipboard write was rejected: {0}")]
    Rejected(String),
}

/// Asynchronous text clipboard.
///
/// The returned future must not borrow from `self`; the page keeps the
/// clipboard alive independently of pending writes.
pub trait Clipboard {
    fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), ClipboardError>>;
}
