//! Connectivity monitor
//!
//! Single source of truth for the process-wide online/offline state.
//! Platform connectivity signals arrive over a channel; actual transitions
//! flip the state, notify subscribers, and kick the sync orchestrator.
//!
//! The monitor is an explicitly constructed component with an
//! `activate`/`deactivate` lifecycle, so tests can run independent
//! instances side by side.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::orchestrator::SyncOrchestrator;
use crate::remote::RemoteClient;

/// A platform-level connectivity signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    /// The platform reports the network came back
    Up,
    /// The platform reports the network went away
    Down,
}

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    callbacks: HashMap<u64, Callback>,
}

/// Handle for a registered connectivity callback.
///
/// Dropping the guard (or calling [`cancel`](Self::cancel)) removes the
/// callback; removal is idempotent and never blocks a transition.
#[must_use = "dropping the guard unsubscribes the callback"]
pub struct SubscriptionGuard {
    registry: Weak<Mutex<Registry>>,
    id: u64,
}

impl SubscriptionGuard {
    /// Explicitly remove the callback
    pub fn cancel(self) {}
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().unwrap().callbacks.remove(&self.id);
        }
    }
}

struct Inner<C> {
    online_tx: watch::Sender<bool>,
    online_subs: Arc<Mutex<Registry>>,
    offline_subs: Arc<Mutex<Registry>>,
    orchestrator: SyncOrchestrator<C>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

/// Process-wide online/offline state machine
pub struct ConnectivityMonitor<C> {
    inner: Arc<Inner<C>>,
}

impl<C> Clone for ConnectivityMonitor<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: RemoteClient + 'static> ConnectivityMonitor<C> {
    /// Create a monitor that drives the given orchestrator
    pub fn new(orchestrator: SyncOrchestrator<C>) -> Self {
        let (online_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                online_tx,
                online_subs: Arc::new(Mutex::new(Registry::default())),
                offline_subs: Arc::new(Mutex::new(Registry::default())),
                orchestrator,
                listener: Mutex::new(None),
            }),
        }
    }

    /// Start consuming platform signals.
    ///
    /// `initially_online` is the platform-reported state at activation. If
    /// the process starts online, a drain of the pending store is triggered
    /// right away; on-online subscribers are not invoked for it because no
    /// transition occurred. Expected to run once per session; a repeated
    /// call replaces the previous listener.
    pub fn activate(&self, initially_online: bool, mut events: mpsc::Receiver<ConnectivityEvent>) {
        self.inner.online_tx.send_replace(initially_online);

        if initially_online {
            debug!("online at activation, draining pending changes");
            let orchestrator = self.inner.orchestrator.clone();
            tokio::spawn(async move {
                orchestrator.drain().await;
            });
        }

        let monitor = self.clone();
        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    ConnectivityEvent::Up => monitor.handle_online(),
                    ConnectivityEvent::Down => monitor.handle_offline(),
                }
            }
        });

        let mut slot = self.inner.listener.lock().unwrap();
        if let Some(stale) = slot.replace(handle) {
            stale.abort();
        }
    }

    /// Stop consuming platform signals
    pub fn deactivate(&self) {
        let mut slot = self.inner.listener.lock().unwrap();
        if let Some(listener) = slot.take() {
            listener.abort();
        }
    }

    /// Current connectivity state
    pub fn is_online(&self) -> bool {
        *self.inner.online_tx.borrow()
    }

    /// Subscribe to connectivity state changes
    pub fn watch_online(&self) -> watch::Receiver<bool> {
        self.inner.online_tx.subscribe()
    }

    /// Register a callback fired when connectivity comes back.
    ///
    /// Fires synchronously on the transition, before the post-reconnect
    /// drain starts; slow callbacks delay the drain.
    pub fn on_online(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionGuard {
        Self::subscribe(&self.inner.online_subs, callback)
    }

    /// Register a callback fired when connectivity is lost
    pub fn on_offline(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionGuard {
        Self::subscribe(&self.inner.offline_subs, callback)
    }

    fn subscribe(
        registry: &Arc<Mutex<Registry>>,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> SubscriptionGuard {
        let mut reg = registry.lock().unwrap();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.callbacks.insert(id, Arc::new(callback));
        SubscriptionGuard {
            registry: Arc::downgrade(registry),
            id,
        }
    }

    fn handle_online(&self) {
        // Repeated same-state signals are not transitions
        if self.inner.online_tx.send_replace(true) {
            return;
        }
        info!("connectivity restored");

        // Subscribers first (e.g. an open edit buffer re-submits its
        // in-memory content), then the global drain.
        Self::notify(&self.inner.online_subs);

        let orchestrator = self.inner.orchestrator.clone();
        tokio::spawn(async move {
            orchestrator.drain().await;
        });
    }

    fn handle_offline(&self) {
        if !self.inner.online_tx.send_replace(false) {
            return;
        }
        info!("connectivity lost, edits will be queued locally");

        // Stale reconnect feedback must not outlive the connection
        self.inner.orchestrator.go_idle();

        Self::notify(&self.inner.offline_subs);
    }

    /// Invoke every registered callback.
    ///
    /// Callbacks are cloned out before invocation so a callback may
    /// subscribe or unsubscribe without blocking on the registry lock.
    fn notify(registry: &Arc<Mutex<Registry>>) {
        let callbacks: Vec<Callback> = registry.lock().unwrap().callbacks.values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }
}
