//! Offline-edit reconciliation
//!
//! Keeps shared lists editable while offline and replays queued edits once
//! connectivity returns.
//!
//! ## Flow
//!
//! 1. The probe (or any platform signal source) feeds connectivity events
//!    to the monitor
//! 2. The monitor flips the process-wide online flag and notifies
//!    subscribers
//! 3. On reconnect, the orchestrator drains the pending store against the
//!    server and publishes transient progress for the UI
//!
//! ## Usage
//!
//! ```ignore
//! let orchestrator = SyncOrchestrator::new(store, client);
//! let monitor = ConnectivityMonitor::new(orchestrator.clone());
//! let probe = spawn_http_probe(base_url, interval).await;
//! monitor.activate(probe.initially_online, probe.events);
//! ```

mod monitor;
mod orchestrator;
mod probe;

pub use monitor::{ConnectivityEvent, ConnectivityMonitor, SubscriptionGuard};
pub use orchestrator::SyncOrchestrator;
pub use probe::{check_once, spawn_http_probe, ProbeHandle};
