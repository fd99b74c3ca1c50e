//! Watch command handler
//!
//! Runs the connectivity monitor against the live server and prints
//! transitions and reconnect progress until interrupted.

use anyhow::{bail, Result};

use lista_core::sync::spawn_http_probe;
use lista_core::{Config, OfflineService, ReconnectStatus};

use crate::output::Output;

/// Watch connectivity and sync continuously until Ctrl-C
pub async fn run(config: &Config, output: &Output) -> Result<()> {
    let Some(server_url) = config.server_url.as_deref() else {
        bail!(
            "Server URL not configured. Set it with:\n  \
             lista config set server_url https://your-server"
        );
    };

    let service = OfflineService::open(config)?;

    output.message(&format!(
        "Watching {} (checking every {}s). Ctrl-C to stop.",
        server_url, config.probe_interval_secs
    ));

    let probe = spawn_http_probe(server_url, config.probe_interval()).await;
    let initially_online = probe.initially_online;

    service.activate(initially_online, probe.events);
    print_connectivity(initially_online);

    let mut online_rx = service.watch_online();
    let mut info_rx = service.watch_reconnect_info();

    loop {
        tokio::select! {
            changed = online_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                print_connectivity(*online_rx.borrow_and_update());
            }
            changed = info_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let info = info_rx.borrow_and_update().clone();
                match info.status {
                    ReconnectStatus::Syncing => println!("  syncing queued changes..."),
                    ReconnectStatus::Synced => {
                        println!("  synced {} list(s)", info.synced_count)
                    }
                    ReconnectStatus::Idle => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    service.deactivate();
    probe.task.abort();
    output.message("Stopped.");

    Ok(())
}

fn print_connectivity(online: bool) {
    if online {
        println!("● online");
    } else {
        println!("○ offline - edits will be queued locally");
    }
}
