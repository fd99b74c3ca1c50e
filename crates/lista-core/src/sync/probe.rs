//! Server reachability probe
//!
//! Non-browser hosts get no platform online/offline notifications, so the
//! probe derives them: a background task HEADs the server base URL on an
//! interval and emits a [`ConnectivityEvent`] whenever reachability flips.
//! Any HTTP response counts as reachable; only transport errors (DNS,
//! refused connection, timeout) count as offline.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::monitor::ConnectivityEvent;

/// Timeout for a single reachability check
const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to a running reachability probe
pub struct ProbeHandle {
    /// Reachability at spawn time, for the monitor's activation
    pub initially_online: bool,
    /// Connectivity transitions, for the monitor to consume
    pub events: mpsc::Receiver<ConnectivityEvent>,
    /// The probe task; abort it to stop probing
    pub task: JoinHandle<()>,
}

/// Spawn a probe against the given server base URL.
///
/// Performs one check up front so callers can activate the monitor with the
/// true initial state, then keeps checking on the interval.
pub async fn spawn_http_probe(base_url: impl Into<String>, interval: Duration) -> ProbeHandle {
    let base_url = base_url.into();
    let http = reqwest::Client::builder()
        .timeout(CHECK_TIMEOUT)
        .build()
        .expect("HTTP client construction");

    let initially_online = check(&http, &base_url).await;
    let (events_tx, events) = mpsc::channel(16);

    let task = tokio::spawn(probe_task(
        http,
        base_url,
        interval,
        initially_online,
        events_tx,
    ));

    ProbeHandle {
        initially_online,
        events,
        task,
    }
}

/// One-shot reachability check, for one-off commands
pub async fn check_once(base_url: &str) -> bool {
    let http = reqwest::Client::builder()
        .timeout(CHECK_TIMEOUT)
        .build()
        .expect("HTTP client construction");
    check(&http, base_url).await
}

async fn probe_task(
    http: reqwest::Client,
    base_url: String,
    interval: Duration,
    mut online: bool,
    events_tx: mpsc::Sender<ConnectivityEvent>,
) {
    loop {
        tokio::time::sleep(interval).await;

        let reachable = check(&http, &base_url).await;
        if reachable == online {
            continue;
        }
        online = reachable;

        let event = if reachable {
            ConnectivityEvent::Up
        } else {
            ConnectivityEvent::Down
        };
        if events_tx.send(event).await.is_err() {
            // Receiver gone, nobody is listening anymore
            break;
        }
    }
}

async fn check(http: &reqwest::Client, base_url: &str) -> bool {
    match http.head(base_url).send().await {
        Ok(_) => true,
        Err(err) => {
            debug!(error = %err, "server unreachable");
            false
        }
    }
}
