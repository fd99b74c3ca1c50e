//! Pending command handler

use anyhow::Result;

use lista_core::{Config, PendingStore};

use crate::output::Output;

/// Show every locally queued change
pub fn show(config: &Config, output: &Output) -> Result<()> {
    let store = PendingStore::open(config);

    let mut entries = store.list_all();
    // Oldest first, so the backlog reads top-down
    entries.sort_by_key(|(_, change)| change.saved_at);

    output.print_pending(&entries);
    Ok(())
}
