use crate::models::view::ToastKind;
use crate::services::document::Document;
use parking_lot::RwLock;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Shows transient toasts on the document and is the single place failures
/// get reported.
#[derive(Clone)]
pub struct Notifier {
    document: Arc<RwLock<Document>>,
    duration: Duration,
    generation: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new(document: Arc<RwLock<Document>>, duration: Duration) -> Self {
        Self {
            document,
            duration,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shows `message` and hides it after the configured duration unless a
    /// newer toast replaced it first. Must be called inside a Tokio runtime.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.document.write().show_toast(message.into(), kind);

        let document = Arc::clone(&self.document);
        let latest = Arc::clone(&self.generation);
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if latest.load(Ordering::SeqCst) == generation {
                document.write().hide_toast();
            }
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, ToastKind::Error);
    }

    /// Logs a transport failure and shows the generic `message` for it.
    pub fn report_failure(&self, context: &str, err: &(dyn Error + 'static), message: &str) {
        error!(error = %err, "{}", context);
        self.error(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier() -> (Notifier, Arc<RwLock<Document>>) {
        let document = Arc::new(RwLock::new(Document::new()));
        let notifier = Notifier::new(Arc::clone(&document), Duration::from_millis(3000));
        (notifier, document)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn toast_hides_after_duration() {
        let (notifier, document) = notifier();
        notifier.success("User deleted");
        settle().await;

        tokio::time::advance(Duration::from_millis(2999)).await;
        settle().await;
        assert!(document.read().toast().unwrap().visible);

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert!(!document.read().toast().unwrap().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_toast_is_not_hidden_by_older_timer() {
        let (notifier, document) = notifier();
        notifier.success("first");
        settle().await;

        tokio::time::advance(Duration::from_millis(2000)).await;
        notifier.error("second");
        settle().await;

        tokio::time::advance(Duration::from_millis(1500)).await;
        settle().await;

        let doc = document.read();
        let toast = doc.toast().unwrap();
        assert_eq!(toast.message, "second");
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.visible);
    }

    #[tokio::test]
    async fn report_failure_shows_generic_error() {
        let (notifier, document) = notifier();
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

        notifier.report_failure("Failed to load overview", &err, "Failed to load data");

        let doc = document.read();
        let toast = doc.toast().unwrap();
        assert_eq!(toast.message, "Failed to load data");
        assert_eq!(toast.kind, ToastKind::Error);
    }
}
