//! Status command handler

use anyhow::Result;

use lista_core::sync::check_once;
use lista_core::{Config, PendingStore};

use crate::output::{Output, OutputFormat};

/// Show connectivity and queue status
pub async fn show(config: &Config, output: &Output) -> Result<()> {
    let store = PendingStore::open(config);
    let pending = store.list_all();

    let online = match config.server_url.as_deref() {
        Some(url) => Some(check_once(url).await),
        None => None,
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "server_url": config.server_url,
                    "online": online,
                    "pending_count": pending.len(),
                    "pending": pending
                        .iter()
                        .map(|(list_id, change)| serde_json::json!({
                            "list_id": list_id,
                            "saved_at": change.saved_at
                        }))
                        .collect::<Vec<_>>()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", pending.len());
        }
        OutputFormat::Human => {
            println!("Lista Status");
            println!("============");
            println!();
            println!("Server:");
            match config.server_url.as_deref() {
                Some(url) => {
                    println!("  URL:          {}", url);
                    println!(
                        "  Connectivity: {}",
                        if online == Some(true) {
                            "online"
                        } else {
                            "offline"
                        }
                    );
                }
                None => {
                    println!("  URL:          (not set)");
                    println!();
                    println!("  Configure one with:");
                    println!("    lista config set server_url https://your-server");
                }
            }
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!();
            println!("Queued changes: {}", pending.len());
            for (list_id, change) in &pending {
                println!(
                    "  {} (saved {})",
                    list_id,
                    change.saved_at.format("%Y-%m-%d %H:%M:%S")
                );
            }
        }
    }

    Ok(())
}
