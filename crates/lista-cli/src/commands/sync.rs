//! Sync command handler

use anyhow::{bail, Result};

use lista_core::sync::check_once;
use lista_core::{Config, OfflineService};

use crate::output::Output;

/// Replay every locally queued change against the server
pub async fn run(config: &Config, output: &Output) -> Result<()> {
    let service = OfflineService::open(config)?;
    let server_url = config.server_url.as_deref().unwrap_or_default();

    let queued = service.pending().len();
    if queued == 0 {
        output.message("Nothing to sync.");
        if output.is_json() {
            println!("{}", serde_json::json!({ "synced": 0, "remaining": 0 }));
        }
        return Ok(());
    }

    if !check_once(server_url).await {
        bail!(
            "Server unreachable - {} change(s) still queued. They will sync on the next reconnect.",
            queued
        );
    }

    output.message(&format!("Syncing {} queued change(s)...", queued));

    let synced = service.drain().await;
    let remaining = service.pending().len();

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({ "synced": synced, "remaining": remaining })
        );
    } else if remaining > 0 {
        output.message(&format!(
            "Synced {} change(s), {} still queued (will retry on next sync)",
            synced, remaining
        ));
    } else {
        output.success(&format!("Sync complete - {} change(s) committed", synced));
    }

    Ok(())
}
