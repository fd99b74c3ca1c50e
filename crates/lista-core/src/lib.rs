//! Lista Core Library
//!
//! This crate provides the client-side core for lista, a shared
//! shopping/task-list app whose lists are Markdown documents. Its job is to
//! make saves safe while offline: edits that cannot reach the server are
//! persisted locally per list and replayed on reconnect.
//!
//! # Architecture
//!
//! - **Pending store**: one durable pending change per list id
//! - **Remote client**: commits a list's Markdown to the server of record
//! - **Connectivity monitor**: single source of truth for online/offline
//! - **Sync orchestrator**: drains the pending store on reconnect and
//!   publishes transient progress for a UI banner
//!
//! # Quick Start
//!
//! ```text
//! let service = OfflineService::open(&config)?;
//! service.activate(probe.initially_online, probe.events);
//!
//! // Save an edit; it reaches the server or is queued locally.
//! let outcome = service.save(&list_id, &markdown).await;
//! ```
//!
//! # Modules
//!
//! - `service`: wired-up offline save/sync facade (main entry point)
//! - `models`: data structures for lists and pending changes
//! - `pending`: durable per-list pending-change store
//! - `remote`: server commit endpoint client
//! - `sync`: connectivity monitor, drain orchestrator, reachability probe
//! - `editor`: per-open-list edit buffer
//! - `config`: application configuration

pub mod config;
pub mod editor;
pub mod models;
pub mod pending;
pub mod remote;
pub mod service;
pub mod sync;

pub use config::Config;
pub use editor::EditBuffer;
pub use models::{List, ListStatus, PendingChange, ReconnectInfo, ReconnectStatus};
pub use pending::PendingStore;
pub use remote::{HttpRemoteClient, RemoteClient};
pub use service::{OfflineService, SaveOutcome};
pub use sync::{ConnectivityEvent, ConnectivityMonitor, SubscriptionGuard, SyncOrchestrator};
