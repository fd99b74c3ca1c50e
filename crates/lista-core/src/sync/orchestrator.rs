//! Sync orchestrator
//!
//! Drains the pending store after a reconnect: every queued change is pushed
//! to the server, successes are cleared, failures stay queued for the next
//! reconnect. Progress is published as [`ReconnectInfo`] through a `watch`
//! channel so a UI can render a transient banner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::ReconnectInfo;
use crate::pending::PendingStore;
use crate::remote::RemoteClient;

/// How long the "synced" banner stays up before auto-resetting to idle
const RESET_DELAY: Duration = Duration::from_secs(4);

struct Inner<C> {
    store: PendingStore,
    client: C,
    info_tx: watch::Sender<ReconnectInfo>,
    /// Pending auto-reset of the "synced" banner; cancelled when superseded
    reset_timer: Mutex<Option<JoinHandle<()>>>,
    /// Single-flight guard: a second drain while one is in flight is skipped
    draining: AtomicBool,
    reset_delay: Duration,
}

/// Replays pending changes against the server and reports progress
pub struct SyncOrchestrator<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for SyncOrchestrator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: RemoteClient + 'static> SyncOrchestrator<C> {
    /// Create an orchestrator over the given store and client
    pub fn new(store: PendingStore, client: C) -> Self {
        Self::with_reset_delay(store, client, RESET_DELAY)
    }

    /// Create an orchestrator with a custom banner reset delay
    pub fn with_reset_delay(store: PendingStore, client: C, reset_delay: Duration) -> Self {
        let (info_tx, _) = watch::channel(ReconnectInfo::default());
        Self {
            inner: Arc::new(Inner {
                store,
                client,
                info_tx,
                reset_timer: Mutex::new(None),
                draining: AtomicBool::new(false),
                reset_delay,
            }),
        }
    }

    /// Current reconnect feedback
    pub fn reconnect_info(&self) -> ReconnectInfo {
        self.inner.info_tx.borrow().clone()
    }

    /// Subscribe to reconnect feedback changes
    pub fn watch_reconnect_info(&self) -> watch::Receiver<ReconnectInfo> {
        self.inner.info_tx.subscribe()
    }

    /// Push every pending change to the server, clearing those that commit.
    ///
    /// Pushes for distinct lists overlap in flight; there is no ordering
    /// guarantee between them. Returns the number of lists committed. If a
    /// drain is already in flight this call is skipped and returns 0.
    pub async fn drain(&self) -> usize {
        let inner = &*self.inner;

        if inner.draining.swap(true, Ordering::SeqCst) {
            debug!("drain already in flight, skipping");
            return 0;
        }

        self.cancel_reset_timer();
        inner.info_tx.send_replace(ReconnectInfo::syncing());

        let entries = inner.store.list_all();
        if entries.is_empty() {
            inner.info_tx.send_replace(ReconnectInfo::default());
            inner.draining.store(false, Ordering::SeqCst);
            return 0;
        }

        debug!(count = entries.len(), "replaying pending changes");

        let pushes = entries.into_iter().map(|(list_id, change)| async move {
            let committed = inner.client.push(&list_id, &change.markdown).await;
            if committed {
                // A fresh edit for the same list may have been queued while
                // this one was in flight; only clear entries that are not
                // newer than what was pushed.
                inner.store.remove_synced(&list_id, change.saved_at);
            }
            committed
        });

        let synced_count = join_all(pushes)
            .await
            .into_iter()
            .filter(|committed| *committed)
            .count();

        if synced_count > 0 {
            info!(synced_count, "pending changes committed");
            inner.info_tx.send_replace(ReconnectInfo::synced(synced_count));
            self.arm_reset_timer();
        } else {
            inner.info_tx.send_replace(ReconnectInfo::default());
        }

        inner.draining.store(false, Ordering::SeqCst);
        synced_count
    }

    /// Reset the banner to idle and cancel any pending auto-reset.
    ///
    /// Called on an offline transition so stale "synced" feedback never
    /// outlives the connection it reported on.
    pub(crate) fn go_idle(&self) {
        self.cancel_reset_timer();
        self.inner.info_tx.send_replace(ReconnectInfo::default());
    }

    /// Arm the auto-reset of the "synced" banner, replacing any prior timer
    fn arm_reset_timer(&self) {
        let inner = Arc::clone(&self.inner);
        let delay = self.inner.reset_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            inner.info_tx.send_replace(ReconnectInfo::default());
        });

        let mut slot = self.inner.reset_timer.lock().unwrap();
        if let Some(stale) = slot.replace(handle) {
            stale.abort();
        }
    }

    fn cancel_reset_timer(&self) {
        let mut slot = self.inner.reset_timer.lock().unwrap();
        if let Some(timer) = slot.take() {
            timer.abort();
        }
    }
}
