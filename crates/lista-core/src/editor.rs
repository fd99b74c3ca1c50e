//! Per-open-list edit buffer
//!
//! Holds the in-memory Markdown of one list being edited and saves it
//! through the offline service. While a buffer is open it re-submits its
//! current content the moment connectivity comes back, so the freshest
//! in-memory edit wins over a possibly stale queued one for the list
//! actively being edited.

use std::sync::{Arc, Mutex};

use crate::remote::RemoteClient;
use crate::service::{OfflineService, SaveOutcome};
use crate::sync::SubscriptionGuard;

/// The editing surface for one open list
pub struct EditBuffer<C: RemoteClient> {
    list_id: String,
    content: Arc<Mutex<String>>,
    service: OfflineService<C>,
    /// Keeps the reconnect re-submit registered while the buffer is open
    _resubmit: SubscriptionGuard,
}

impl<C: RemoteClient + Clone + 'static> EditBuffer<C> {
    /// Open a buffer for a list with its current Markdown
    pub fn open(
        service: &OfflineService<C>,
        list_id: impl Into<String>,
        initial: impl Into<String>,
    ) -> Self {
        let list_id = list_id.into();
        let content = Arc::new(Mutex::new(initial.into()));

        // Fires on the online transition, before the global drain starts,
        // so the in-flight replay sees the freshest content committed (or
        // queued with a newer timestamp).
        let resubmit = service.on_online({
            let service = service.clone();
            let content = Arc::clone(&content);
            let list_id = list_id.clone();
            move || {
                let service = service.clone();
                let markdown = content.lock().unwrap().clone();
                let list_id = list_id.clone();
                tokio::spawn(async move {
                    service.save(&list_id, &markdown).await;
                });
            }
        });

        Self {
            list_id,
            content,
            service: service.clone(),
            _resubmit: resubmit,
        }
    }

    /// The list this buffer edits
    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    /// Current in-memory Markdown
    pub fn content(&self) -> String {
        self.content.lock().unwrap().clone()
    }

    /// Replace the in-memory Markdown without saving
    pub fn set_content(&self, markdown: impl Into<String>) {
        *self.content.lock().unwrap() = markdown.into();
    }

    /// Save the current content through the offline save policy
    pub async fn save(&self) -> SaveOutcome {
        let markdown = self.content();
        self.service.save(&self.list_id, &markdown).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pending::PendingStore;
    use crate::sync::ConnectivityEvent;
    use std::collections::HashMap;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    /// Records the last markdown pushed per list; optionally fails
    #[derive(Clone, Default)]
    struct FakeClient {
        pushed: Arc<Mutex<HashMap<String, String>>>,
        fail_all: Arc<Mutex<bool>>,
    }

    impl FakeClient {
        fn pushed(&self, list_id: &str) -> Option<String> {
            self.pushed.lock().unwrap().get(list_id).cloned()
        }

        fn set_failing(&self, failing: bool) {
            *self.fail_all.lock().unwrap() = failing;
        }
    }

    impl RemoteClient for FakeClient {
        async fn push(&self, list_id: &str, markdown: &str) -> bool {
            if *self.fail_all.lock().unwrap() {
                return false;
            }
            self.pushed
                .lock()
                .unwrap()
                .insert(list_id.to_string(), markdown.to_string());
            true
        }
    }

    struct Fixture {
        service: OfflineService<FakeClient>,
        client: FakeClient,
        events: mpsc::Sender<ConnectivityEvent>,
        _temp_dir: TempDir,
    }

    fn fixture(initially_online: bool) -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let store = PendingStore::new(temp_dir.path().join("pending"));
        let client = FakeClient::default();
        let service = OfflineService::new(store, client.clone());

        let (events, events_rx) = mpsc::channel(16);
        service.activate(initially_online, events_rx);

        Fixture {
            service,
            client,
            events,
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn test_save_online_pushes_current_content() {
        let fx = fixture(true);
        let buffer = EditBuffer::open(&fx.service, "X", "- [ ] milk");

        buffer.set_content("- [x] milk");
        let outcome = buffer.save().await;

        assert_eq!(outcome, SaveOutcome::Synced);
        assert_eq!(fx.client.pushed("X").unwrap(), "- [x] milk");
    }

    #[tokio::test]
    async fn test_save_offline_queues_current_content() {
        let fx = fixture(false);
        let buffer = EditBuffer::open(&fx.service, "X", "- [ ] milk");

        let outcome = buffer.save().await;

        assert_eq!(outcome, SaveOutcome::Queued);
        assert!(fx.client.pushed("X").is_none());
        assert_eq!(
            fx.service.pending().get("X").unwrap().markdown,
            "- [ ] milk"
        );
    }

    #[tokio::test]
    async fn test_failed_online_save_falls_back_to_queue() {
        let fx = fixture(true);
        fx.client.set_failing(true);
        let buffer = EditBuffer::open(&fx.service, "X", "A");

        let outcome = buffer.save().await;

        assert_eq!(outcome, SaveOutcome::Queued);
        assert_eq!(fx.service.pending().get("X").unwrap().markdown, "A");
    }

    #[tokio::test]
    async fn test_open_buffer_resubmits_on_reconnect() {
        let fx = fixture(false);
        let buffer = EditBuffer::open(&fx.service, "X", "typed offline");
        buffer.save().await;

        fx.events.send(ConnectivityEvent::Up).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The in-memory content reached the server and nothing stays queued
        assert_eq!(fx.client.pushed("X").unwrap(), "typed offline");
        assert!(fx.service.pending().get("X").is_none());
    }

    #[tokio::test]
    async fn test_closed_buffer_no_longer_resubmits() {
        let fx = fixture(false);
        let buffer = EditBuffer::open(&fx.service, "X", "typed offline");
        drop(buffer);

        fx.events.send(ConnectivityEvent::Up).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(fx.client.pushed("X").is_none());
    }
}
