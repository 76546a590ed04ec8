use crate::services::console::Console;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Debounced keyword search over the user list.
///
/// Each input restarts the quiet window. Only the input that is still the
/// latest when its window elapses issues a request; a request already sent
/// is never cancelled.
#[derive(Clone)]
pub struct SearchController {
    console: Console,
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl SearchController {
    pub fn new(console: Console) -> Self {
        let delay = console.settings().search_debounce();
        Self {
            console,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Handles a change of the search box. Blank input reloads the first
    /// unfiltered page right away; anything else is scheduled, and the
    /// returned handle finishes once that search ran or was superseded.
    pub async fn on_input(&self, raw: &str) -> Option<JoinHandle<()>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let keyword = raw.trim();

        if keyword.is_empty() {
            let page_size = self.console.view_state().current_user_page_size();
            self.console.load_users(1, page_size).await;
            return None;
        }

        let keyword = keyword.to_string();
        let console = self.console.clone();
        let latest = Arc::clone(&self.generation);
        let delay = self.delay;
        Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if latest.load(Ordering::SeqCst) != generation {
                debug!(%keyword, "Search superseded");
                return;
            }
            console.search_users(&keyword).await;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::api::Envelope;
    use crate::services::api_client::MockApiClient;
    use crate::services::console::tests::{console, users_page};
    use crate::services::document::ids;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_last_keystroke_searches_after_quiet_window() {
        let start = Instant::now();
        let calls: Arc<Mutex<Vec<(Duration, String)>>> = Arc::default();

        let mut mock = MockApiClient::new();
        let recorded = Arc::clone(&calls);
        mock.expect_search_users().returning(move |keyword, _, _| {
            recorded.lock().push((start.elapsed(), keyword.to_string()));
            Ok(Envelope::success(users_page(&["abc"], 1, 1)))
        });
        mock.expect_list_users().never();
        let search = SearchController::new(console(mock));

        search.on_input("a").await;
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        search.on_input("ab").await;
        settle().await;
        tokio::time::advance(Duration::from_millis(100)).await;
        search.on_input(" abc ").await;
        settle().await;

        tokio::time::advance(Duration::from_millis(499)).await;
        settle().await;
        assert!(calls.lock().is_empty());

        tokio::time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(
            *calls.lock(),
            vec![(Duration::from_millis(700), "abc".to_string())]
        );

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_reloads_first_page_immediately() {
        let mut mock = MockApiClient::new();
        mock.expect_list_users()
            .withf(|page, size| *page == 1 && *size == 10)
            .times(1)
            .returning(|_, _| Ok(Envelope::success(users_page(&["alice"], 1, 1))));
        mock.expect_search_users().never();
        let search = SearchController::new(console(mock));

        search.on_input("ali").await;
        settle().await;
        assert!(search.on_input("   ").await.is_none());

        tokio::time::advance(Duration::from_millis(1000)).await;
        settle().await;
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_search_handle_resolves_after_the_search() {
        let mut mock = MockApiClient::new();
        mock.expect_search_users()
            .times(1)
            .returning(|_, _, _| Ok(Envelope::success(users_page(&["bob"], 1, 1))));
        let search = SearchController::new(console(mock));

        let pending = search.on_input("bob").await.unwrap();
        pending.await.unwrap();

        let doc = search.console.document();
        assert!(doc.read().html(ids::USERS_TABLE_BODY).contains("bob"));
    }
}
