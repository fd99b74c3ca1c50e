//! Data models for lista
//!
//! Defines the core data structures: lists, templates, locally pending
//! changes, and the reconnect feedback published while pending changes are
//! replayed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A locally persisted, not-yet-committed edit to a list's Markdown body.
///
/// Pending changes are keyed by list id in the [`PendingStore`]; at most one
/// exists per list, and a newer save for the same list overwrites it.
///
/// [`PendingStore`]: crate::pending::PendingStore
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingChange {
    /// The full Markdown body as of the failed/offline save
    pub markdown: String,
    /// When the change was saved locally
    pub saved_at: DateTime<Utc>,
}

impl PendingChange {
    /// Create a pending change stamped with the current time
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            saved_at: Utc::now(),
        }
    }
}

/// Phase of the post-reconnect replay
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectStatus {
    /// Nothing in flight
    #[default]
    Idle,
    /// A drain of the pending store is in flight
    Syncing,
    /// A drain just finished with at least one change committed
    Synced,
}

/// Transient reconnect feedback for a UI banner.
///
/// Transitions idle -> syncing -> synced, then auto-resets to idle after a
/// short display window. Going offline resets it immediately.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReconnectInfo {
    pub status: ReconnectStatus,
    /// Number of lists successfully committed by the last drain
    pub synced_count: usize,
}

impl ReconnectInfo {
    /// Drain in flight, nothing committed yet
    pub fn syncing() -> Self {
        Self {
            status: ReconnectStatus::Syncing,
            synced_count: 0,
        }
    }

    /// Drain finished, `synced_count` lists committed
    pub fn synced(synced_count: usize) -> Self {
        Self {
            status: ReconnectStatus::Synced,
            synced_count,
        }
    }
}

/// Workflow status of a regular (non-template) list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListStatus {
    Ongoing,
    Pending,
    Done,
}

/// A titled Markdown document: either a status-tracked list or a template
/// used to seed new lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct List {
    /// Opaque identifier (the server mints random UUID text ids)
    pub id: String,
    pub title: String,
    pub status: ListStatus,
    /// The Markdown body
    pub markdown: String,
    /// Templates are status-less seeds for new lists
    pub is_template: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl List {
    /// Create a new regular list with the given title
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            status: ListStatus::Ongoing,
            markdown: String::new(),
            is_template: false,
            created_at: Some(now),
            updated_at: now,
        }
    }

    /// Create a new template with the given title
    pub fn new_template(title: impl Into<String>) -> Self {
        Self {
            is_template: true,
            ..Self::new(title)
        }
    }

    /// Replace the Markdown body
    pub fn set_markdown(&mut self, markdown: impl Into<String>) {
        self.markdown = markdown.into();
        self.updated_at = Utc::now();
    }

    /// Update the title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_change_new() {
        let change = PendingChange::new("- [ ] milk");
        assert_eq!(change.markdown, "- [ ] milk");
        assert!(change.saved_at <= Utc::now());
    }

    #[test]
    fn test_pending_change_serialization() {
        let change = PendingChange::new("- [ ] bread\n- [ ] eggs");
        let json = serde_json::to_string(&change).unwrap();
        let deserialized: PendingChange = serde_json::from_str(&json).unwrap();
        assert_eq!(change, deserialized);
    }

    #[test]
    fn test_reconnect_info_default_is_idle() {
        let info = ReconnectInfo::default();
        assert_eq!(info.status, ReconnectStatus::Idle);
        assert_eq!(info.synced_count, 0);
    }

    #[test]
    fn test_reconnect_info_constructors() {
        assert_eq!(
            ReconnectInfo::syncing(),
            ReconnectInfo {
                status: ReconnectStatus::Syncing,
                synced_count: 0
            }
        );
        assert_eq!(
            ReconnectInfo::synced(3),
            ReconnectInfo {
                status: ReconnectStatus::Synced,
                synced_count: 3
            }
        );
    }

    #[test]
    fn test_reconnect_status_serializes_lowercase() {
        let json = serde_json::to_string(&ReconnectStatus::Syncing).unwrap();
        assert_eq!(json, "\"syncing\"");
    }

    #[test]
    fn test_list_new() {
        let list = List::new("Groceries");
        assert_eq!(list.title, "Groceries");
        assert_eq!(list.status, ListStatus::Ongoing);
        assert!(!list.is_template);
        assert!(list.markdown.is_empty());
        assert!(list.created_at.is_some());
        // ids are UUID text, parseable back
        assert!(Uuid::parse_str(&list.id).is_ok());
    }

    #[test]
    fn test_list_new_template() {
        let template = List::new_template("Weekly shop");
        assert!(template.is_template);
        assert_eq!(template.title, "Weekly shop");
    }

    #[test]
    fn test_list_set_markdown_touches_updated_at() {
        let mut list = List::new("Groceries");
        let before = list.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(10));
        list.set_markdown("- [ ] milk");
        assert_eq!(list.markdown, "- [ ] milk");
        assert!(list.updated_at > before);
    }

    #[test]
    fn test_list_status_serializes_lowercase() {
        let json = serde_json::to_string(&ListStatus::Done).unwrap();
        assert_eq!(json, "\"done\"");
    }

    #[test]
    fn test_list_serialization_roundtrip() {
        let mut list = List::new("Groceries");
        list.set_markdown("- [x] milk");
        let json = serde_json::to_string(&list).unwrap();
        let deserialized: List = serde_json::from_str(&json).unwrap();
        assert_eq!(list, deserialized);
    }
}
