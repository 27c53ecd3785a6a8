use std::rc::Rc;
use std::time::Duration;

use fieldconfig::ToastConfig;
use scheduler::{RestartableTimeout, TimerHost};
use tracing::{debug, info, warn};

use crate::clipboard::Clipboard;

/// Where the notice is displayed.
pub trait ToastView {
    /// Sets the message text and makes the notice visible.
    fn show(&self, message: &str);
    fn hide(&self);
}

/// Transient notice that hides itself after a fixed duration.
///
/// Showing again while visible replaces the text and restarts the countdown,
/// so the most recent call decides when the notice disappears.
pub struct Toast<T: TimerHost> {
    view: Rc<dyn ToastView>,
    hide_timeout: RestartableTimeout<T>,
    duration: Duration,
}

impl<T> Toast<T>
where
    T: TimerHost,
    T::Handle: 'static,
{
    pub fn new(view: Rc<dyn ToastView>, timers: T, duration: Duration) -> Self {
        Self {
            view,
            hide_timeout: RestartableTimeout::new(timers),
            duration,
        }
    }

    pub fn show(&self, message: &str) {
        self.view.show(message);
        let view = Rc::clone(&self.view);
        self.hide_timeout.restart(self.duration, move || view.hide());
        debug!(text = message, duration = ?self.duration, "toast shown");
    }

    /// Whether a hide is still scheduled.
    pub fn is_visible(&self) -> bool {
        self.hide_timeout.is_pending()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Blocked,
}

/// Copies the current page address and reports the result through a toast.
pub struct CopyLinkAction<T: TimerHost> {
    clipboard: Rc<dyn Clipboard>,
    toast: Toast<T>,
    messages: ToastConfig,
}

impl<T> CopyLinkAction<T>
where
    T: TimerHost,
    T::Handle: 'static,
{
    pub fn new(clipboard: Rc<dyn Clipboard>, toast: Toast<T>, messages: ToastConfig) -> Self {
        Self {
            clipboard,
            toast,
            messages,
        }
    }

    /// The page address, or the configured fallback when it is missing or
    /// blank.
    pub fn link_for(&self, href: Option<&str>) -> String {
        match href.map(str::trim) {
            Some(href) if !href.is_empty() => href.to_string(),
            _ => self.messages.fallback_link.clone(),
        }
    }

    /// Writes the link to the clipboard, then shows the matching notice.
    ///
    /// Each invocation reports its own result when its write settles;
    /// overlapping copies resolve in completion order.
    pub async fn copy(&self, href: Option<&str>) -> CopyOutcome {
        let link = self.link_for(href);
        match self.clipboard.write_text(&link).await {
            Ok(()) => {
                info!(link = %link, "page link copied");
                self.toast.show(&self.messages.copied);
                CopyOutcome::Copied
            }
            Err(err) => {
                warn!(error = %err, "clipboard write failed");
                self.toast.show(&self.messages.blocked);
                CopyOutcome::Blocked
            }
        }
    }

    pub fn toast(&self) -> &Toast<T> {
        &self.toast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardError;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use futures::future::{FutureExt, LocalBoxFuture};
    use futures::join;
    use scheduler::manual::ManualTimers;
    use std::cell::RefCell;
    use std::task::Poll;

    /// Yields once, asking to be polled again.
    async fn yield_now() {
        let mut yielded = false;
        futures::future::poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        Show(String),
        Hide,
    }

    #[derive(Default)]
    struct RecordingView {
        events: RefCell<Vec<ViewEvent>>,
    }

    impl RecordingView {
        fn events(&self) -> Vec<ViewEvent> {
            self.events.borrow().clone()
        }

        fn visible_text(&self) -> Option<String> {
            match self.events.borrow().last() {
                Some(ViewEvent::Show(text)) => Some(text.clone()),
                _ => None,
            }
        }
    }

    impl ToastView for RecordingView {
        fn show(&self, message: &str) {
            self.events
                .borrow_mut()
                .push(ViewEvent::Show(message.to_string()));
        }

        fn hide(&self) {
            self.events.borrow_mut().push(ViewEvent::Hide);
        }
    }

    /// Resolves every write immediately with a fixed result.
    struct FixedClipboard {
        result: Result<(), ClipboardError>,
        written: RefCell<Vec<String>>,
    }

    impl FixedClipboard {
        fn new(result: Result<(), ClipboardError>) -> Self {
            Self {
                result,
                written: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clipboard for FixedClipboard {
        fn write_text(&self, text: &str) -> LocalBoxFuture<'static, Result<(), ClipboardError>> {
            self.written.borrow_mut().push(text.to_string());
            futures::future::ready(self.result.clone()).boxed_local()
        }
    }

    /// Each write waits until the test settles it through a channel.
    #[derive(Default)]
    struct DeferredClipboard {
        pending: RefCell<Vec<oneshot::Sender<Result<(), ClipboardError>>>>,
    }

    impl Clipboard for DeferredClipboard {
        fn write_text(&self, _text: &str) -> LocalBoxFuture<'static, Result<(), ClipboardError>> {
            let (sender, receiver) = oneshot::channel();
            self.pending.borrow_mut().push(sender);
            async move { receiver.await.unwrap_or(Err(ClipboardError::Unavailable)) }
                .boxed_local()
        }
    }

    fn action<C: Clipboard + 'static>(
        clipboard: Rc<C>,
        view: Rc<RecordingView>,
        timers: ManualTimers,
    ) -> CopyLinkAction<ManualTimers> {
        let messages = ToastConfig::default();
        let toast = Toast::new(view, timers, messages.duration);
        CopyLinkAction::new(clipboard, toast, messages)
    }

    #[test]
    fn successful_copy_shows_confirmation() {
        let clipboard = Rc::new(FixedClipboard::new(Ok(())));
        let view = Rc::new(RecordingView::default());
        let action = action(Rc::clone(&clipboard), Rc::clone(&view), ManualTimers::new());

        let outcome = block_on(action.copy(Some("https://example.test/page")));

        assert_eq!(outcome, CopyOutcome::Copied);
        assert_eq!(
            clipboard.written.borrow().as_slice(),
            ["https://example.test/page"]
        );
        assert_eq!(view.visible_text().as_deref(), Some("Copied page link!"));
        assert!(action.toast().is_visible());
    }

    #[test]
    fn rejected_copy_shows_blocked_notice() {
        let clipboard = Rc::new(FixedClipboard::new(Err(ClipboardError::Rejected(
            "NotAllowedError".into(),
        ))));
        let view = Rc::new(RecordingView::default());
        let action = action(clipboard, Rc::clone(&view), ManualTimers::new());

        let outcome = block_on(action.copy(Some("https://example.test/")));

        assert_eq!(outcome, CopyOutcome::Blocked);
        assert_eq!(
            view.visible_text().as_deref(),
            Some("Copy blocked - copy from address bar.")
        );
    }

    #[test]
    fn missing_clipboard_counts_as_blocked() {
        let clipboard = Rc::new(FixedClipboard::new(Err(ClipboardError::Unavailable)));
        let view = Rc::new(RecordingView::default());
        let action = action(clipboard, Rc::clone(&view), ManualTimers::new());

        assert_eq!(block_on(action.copy(None)), CopyOutcome::Blocked);
    }

    #[test]
    fn empty_address_copies_fallback_link() {
        let clipboard = Rc::new(FixedClipboard::new(Ok(())));
        let view = Rc::new(RecordingView::default());
        let action = action(Rc::clone(&clipboard), view, ManualTimers::new());

        block_on(action.copy(Some("   ")));
        block_on(action.copy(None));

        assert_eq!(
            clipboard.written.borrow().as_slice(),
            ["index.html", "index.html"]
        );
    }

    #[test]
    fn toast_hides_after_duration() {
        let view = Rc::new(RecordingView::default());
        let timers = ManualTimers::new();
        let toast = Toast::new(
            Rc::clone(&view) as Rc<dyn ToastView>,
            timers.clone(),
            Duration::from_millis(2200),
        );

        toast.show("hello");
        timers.advance(Duration::from_millis(2199));
        assert!(toast.is_visible());
        assert_eq!(view.visible_text().as_deref(), Some("hello"));

        timers.advance(Duration::from_millis(1));
        assert!(!toast.is_visible());
        assert_eq!(
            view.events(),
            vec![ViewEvent::Show("hello".into()), ViewEvent::Hide]
        );
    }

    #[test]
    fn latest_show_restarts_countdown() {
        let view = Rc::new(RecordingView::default());
        let timers = ManualTimers::new();
        let toast = Toast::new(
            Rc::clone(&view) as Rc<dyn ToastView>,
            timers.clone(),
            Duration::from_millis(2200),
        );

        toast.show("first");
        timers.advance(Duration::from_millis(1000));
        toast.show("second");

        // The first hide would have landed at 2200ms.
        timers.advance(Duration::from_millis(1500));
        assert_eq!(view.visible_text().as_deref(), Some("second"));

        timers.advance(Duration::from_millis(700));
        assert_eq!(
            view.events(),
            vec![
                ViewEvent::Show("first".into()),
                ViewEvent::Show("second".into()),
                ViewEvent::Hide,
            ]
        );
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn overlapping_copies_report_in_completion_order() {
        let clipboard = Rc::new(DeferredClipboard::default());
        let view = Rc::new(RecordingView::default());
        let timers = ManualTimers::new();
        let action = action(Rc::clone(&clipboard), Rc::clone(&view), timers.clone());

        let first = action.copy(Some("https://example.test/a"));
        let second = action.copy(Some("https://example.test/b"));
        let settle = async {
            let mut pending = std::mem::take(&mut *clipboard.pending.borrow_mut());
            assert_eq!(pending.len(), 2);
            let first_write = pending.remove(0);
            let second_write = pending.remove(0);
            // The later click settles first.
            let _ = second_write.send(Ok(()));
            yield_now().await;
            let _ = first_write.send(Err(ClipboardError::Rejected("denied".into())));
        };

        let (first, second, ()) = block_on(async { join!(first, second, settle) });

        assert_eq!(first, CopyOutcome::Blocked);
        assert_eq!(second, CopyOutcome::Copied);
        assert_eq!(
            view.events(),
            vec![
                ViewEvent::Show("Copied page link!".into()),
                ViewEvent::Show("Copy blocked - copy from address bar.".into()),
            ]
        );

        timers.advance(Duration::from_millis(2200));
        assert_eq!(view.events().last(), Some(&ViewEvent::Hide));
    }
}
