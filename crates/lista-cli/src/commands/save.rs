//! Save command handler

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};

use lista_core::sync::check_once;
use lista_core::{Config, OfflineService, SaveOutcome};
use tokio::sync::mpsc;

use crate::output::Output;

/// Save a Markdown body for a list, queueing it locally when offline
pub async fn run(
    config: &Config,
    list_id: String,
    file: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    let markdown = read_markdown(file)?;

    let service = OfflineService::open(config)?;
    let server_url = config.server_url.as_deref().unwrap_or_default();

    let online = check_once(server_url).await;
    let (_events, events_rx) = mpsc::channel(1);
    service.activate(online, events_rx);

    let outcome = service.save(&list_id, &markdown).await;

    match outcome {
        SaveOutcome::Synced => {
            output.success(&format!("Saved '{}' to the server", list_id));
        }
        SaveOutcome::Queued => {
            output.success(&format!(
                "Could not reach the server - queued '{}' for the next sync",
                list_id
            ));
        }
    }

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "list_id": list_id,
                "synced": outcome.is_synced(),
                "queued": !outcome.is_synced()
            })
        );
    }

    Ok(())
}

/// Read the Markdown body from a file, or stdin when no file is given
fn read_markdown(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read markdown from {:?}", path)),
        None => {
            let mut markdown = String::new();
            std::io::stdin()
                .read_to_string(&mut markdown)
                .context("Failed to read markdown from stdin")?;
            Ok(markdown)
        }
    }
}
