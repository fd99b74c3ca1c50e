//! Offline save/sync facade
//!
//! Wires the pending store, remote client, sync orchestrator and
//! connectivity monitor into one service and implements the save-path
//! policy: online saves go straight to the server, anything that cannot
//! reach it is queued locally and replayed on reconnect.

use anyhow::{bail, Result};

use tokio::sync::{mpsc, watch};

use crate::config::Config;
use crate::models::ReconnectInfo;
use crate::pending::PendingStore;
use crate::remote::{HttpRemoteClient, RemoteClient};
use crate::sync::{ConnectivityEvent, ConnectivityMonitor, SubscriptionGuard, SyncOrchestrator};

/// Where a save attempt ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The edit reached the server
    Synced,
    /// The edit was queued locally for the next reconnect
    Queued,
}

impl SaveOutcome {
    /// Whether the edit reached the server
    pub fn is_synced(&self) -> bool {
        matches!(self, SaveOutcome::Synced)
    }
}

/// Offline-aware save/sync service for shared lists
pub struct OfflineService<C: RemoteClient> {
    store: PendingStore,
    client: C,
    orchestrator: SyncOrchestrator<C>,
    monitor: ConnectivityMonitor<C>,
}

impl<C: RemoteClient + Clone + 'static> Clone for OfflineService<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            client: self.client.clone(),
            orchestrator: self.orchestrator.clone(),
            monitor: self.monitor.clone(),
        }
    }
}

impl OfflineService<HttpRemoteClient> {
    /// Build a service from configuration.
    ///
    /// Requires `server_url` to be set.
    pub fn open(config: &Config) -> Result<Self> {
        let Some(ref server_url) = config.server_url else {
            bail!(
                "Server URL not configured. Set it with:\n  \
                 lista config set server_url https://your-server"
            );
        };

        Ok(Self::new(
            PendingStore::open(config),
            HttpRemoteClient::new(server_url),
        ))
    }
}

impl<C: RemoteClient + Clone + 'static> OfflineService<C> {
    /// Wire up a service over the given store and remote client
    pub fn new(store: PendingStore, client: C) -> Self {
        let orchestrator = SyncOrchestrator::new(store.clone(), client.clone());
        let monitor = ConnectivityMonitor::new(orchestrator.clone());
        Self {
            store,
            client,
            orchestrator,
            monitor,
        }
    }

    /// Start consuming platform connectivity signals.
    ///
    /// See [`ConnectivityMonitor::activate`].
    pub fn activate(&self, initially_online: bool, events: mpsc::Receiver<ConnectivityEvent>) {
        self.monitor.activate(initially_online, events);
    }

    /// Stop consuming platform connectivity signals
    pub fn deactivate(&self) {
        self.monitor.deactivate();
    }

    /// Save Markdown for a list, online or not.
    ///
    /// Online: push to the server; a success also clears any stale pending
    /// entry, a failure queues the edit instead. Offline: queue without
    /// touching the network.
    pub async fn save(&self, list_id: &str, markdown: &str) -> SaveOutcome {
        if !self.monitor.is_online() {
            self.store.put(list_id, markdown);
            return SaveOutcome::Queued;
        }

        if self.client.push(list_id, markdown).await {
            // An older queued edit for this list is now superseded
            self.store.remove(list_id);
            SaveOutcome::Synced
        } else {
            self.store.put(list_id, markdown);
            SaveOutcome::Queued
        }
    }

    /// Replay every queued edit now; returns the number committed
    pub async fn drain(&self) -> usize {
        self.orchestrator.drain().await
    }

    /// Current connectivity state
    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Subscribe to connectivity state changes
    pub fn watch_online(&self) -> watch::Receiver<bool> {
        self.monitor.watch_online()
    }

    /// Current reconnect feedback
    pub fn reconnect_info(&self) -> ReconnectInfo {
        self.orchestrator.reconnect_info()
    }

    /// Subscribe to reconnect feedback changes
    pub fn watch_reconnect_info(&self) -> watch::Receiver<ReconnectInfo> {
        self.orchestrator.watch_reconnect_info()
    }

    /// Register a callback fired when connectivity comes back
    pub fn on_online(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionGuard {
        self.monitor.on_online(callback)
    }

    /// Register a callback fired when connectivity is lost
    pub fn on_offline(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionGuard {
        self.monitor.on_offline(callback)
    }

    /// The underlying pending store
    pub fn pending(&self) -> &PendingStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct FakeClient {
        failing: Arc<Mutex<HashSet<String>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl FakeClient {
        fn fail_for(&self, list_id: &str) {
            self.failing.lock().unwrap().insert(list_id.to_string());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RemoteClient for FakeClient {
        async fn push(&self, list_id: &str, _markdown: &str) -> bool {
            self.calls.lock().unwrap().push(list_id.to_string());
            !self.failing.lock().unwrap().contains(list_id)
        }
    }

    fn service_in(temp_dir: &TempDir) -> (OfflineService<FakeClient>, FakeClient) {
        let store = PendingStore::new(temp_dir.path().join("pending"));
        let client = FakeClient::default();
        (OfflineService::new(store, client.clone()), client)
    }

    /// Activate with a given state and no live signal source
    fn activate_with_state(service: &OfflineService<FakeClient>, online: bool) {
        let (_events, events_rx) = mpsc::channel(1);
        service.activate(online, events_rx);
    }

    #[tokio::test]
    async fn test_online_save_reaches_server_and_clears_stale_entry() {
        let temp_dir = TempDir::new().unwrap();
        let (service, client) = service_in(&temp_dir);
        activate_with_state(&service, true);

        // A stale queued edit from an earlier outage
        service.pending().put("X", "stale");

        let outcome = service.save("X", "fresh").await;

        assert_eq!(outcome, SaveOutcome::Synced);
        assert!(service.pending().get("X").is_none());
        assert_eq!(client.calls(), vec!["X"]);
    }

    #[tokio::test]
    async fn test_online_save_failure_queues_the_edit() {
        let temp_dir = TempDir::new().unwrap();
        let (service, client) = service_in(&temp_dir);
        activate_with_state(&service, true);
        client.fail_for("X");

        let outcome = service.save("X", "A").await;

        assert_eq!(outcome, SaveOutcome::Queued);
        assert_eq!(service.pending().get("X").unwrap().markdown, "A");
    }

    #[tokio::test]
    async fn test_offline_save_never_touches_the_network() {
        let temp_dir = TempDir::new().unwrap();
        let (service, client) = service_in(&temp_dir);
        activate_with_state(&service, false);

        let outcome = service.save("X", "A").await;

        assert_eq!(outcome, SaveOutcome::Queued);
        assert!(client.calls().is_empty());
        assert_eq!(service.pending().get("X").unwrap().markdown, "A");
    }

    #[tokio::test]
    async fn test_offline_save_overwrites_earlier_queued_edit() {
        let temp_dir = TempDir::new().unwrap();
        let (service, _client) = service_in(&temp_dir);
        activate_with_state(&service, false);

        service.save("X", "first").await;
        service.save("X", "second").await;

        let all = service.pending().list_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1.markdown, "second");
    }

    #[tokio::test]
    async fn test_activation_while_online_drains_backlog() {
        let temp_dir = TempDir::new().unwrap();
        let (service, client) = service_in(&temp_dir);
        service.pending().put("1", "alpha");

        activate_with_state(&service, true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(service.pending().list_all().is_empty());
        assert_eq!(client.calls(), vec!["1"]);
    }

    #[tokio::test]
    async fn test_drain_reports_through_the_facade() {
        let temp_dir = TempDir::new().unwrap();
        let (service, client) = service_in(&temp_dir);
        service.pending().put("1", "alpha");
        service.pending().put("2", "beta");
        client.fail_for("2");

        let synced = service.drain().await;

        assert_eq!(synced, 1);
        assert_eq!(service.pending().len(), 1);
        assert_eq!(service.reconnect_info(), ReconnectInfo::synced(1));
    }

    #[test]
    fn test_open_requires_server_url() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            server_url: None,
            probe_interval_secs: 5,
        };
        assert!(OfflineService::open(&config).is_err());
    }

    #[test]
    fn test_open_with_server_url() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            server_url: Some("https://lists.example.com".to_string()),
            probe_interval_secs: 5,
        };
        assert!(OfflineService::open(&config).is_ok());
    }
}
