//! Backup polling path for launch detection.
//!
//! The WebSocket subscription catches most launches; this loop fetches the
//! most recent signatures for the tracked authority on a fixed interval
//! and emits everything newer than the last signature it saw, which covers
//! the windows where the subscription was reconnecting.

use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

use crate::global::is_debug_polling_enabled;
use crate::logger::{log, LogTag};
use crate::rpc::{RpcClient, SignatureInfo};
use crate::utils::{check_shutdown_or_delay, truncate_address};

/// Pick the signatures to emit from one newest-first fetch.
///
/// Walks the list until it hits `last_seen`, then returns the fresh
/// entries oldest-first so downstream processing roughly follows chain
/// order. Signatures that already failed on-chain are skipped without a
/// transaction lookup. On the very first poll only the newest entry is
/// taken, so a restart does not re-announce history.
pub fn select_new_signatures(fetched: &[SignatureInfo], last_seen: Option<&str>) -> Vec<String> {
    let fresh: Vec<&SignatureInfo> = match last_seen {
        Some(last) => fetched
            .iter()
            .take_while(|info| info.signature != last)
            .collect(),
        None => fetched.iter().take(1).collect(),
    };

    fresh
        .into_iter()
        .rev()
        .filter(|info| info.err.is_none())
        .map(|info| info.signature.clone())
        .collect()
}

/// Start the polling ingestion path as a background task.
pub fn start_polling_monitoring(
    rpc: Arc<RpcClient>,
    authority: String,
    interval: std::time::Duration,
    signature_limit: usize,
    sig_sender: mpsc::UnboundedSender<String>,
    shutdown: Arc<Notify>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_seen: Option<String> = None;

        loop {
            match rpc
                .get_signatures_for_address(&authority, signature_limit)
                .await
            {
                Ok(fetched) => {
                    let fresh = select_new_signatures(&fetched, last_seen.as_deref());

                    if let Some(newest) = fetched.first() {
                        last_seen = Some(newest.signature.clone());
                    }

                    for signature in fresh {
                        if is_debug_polling_enabled() {
                            log(
                                LogTag::Poller,
                                "NEW_TX",
                                &format!(
                                    "🔍 Polling found transaction: {}",
                                    truncate_address(&signature)
                                ),
                            );
                        }
                        if sig_sender.send(signature).is_err() {
                            log(LogTag::Poller, "STOP", "Signature channel closed");
                            return;
                        }
                    }
                }
                Err(e) => {
                    // Polling is the backup path, a failed cycle is routine
                    if is_debug_polling_enabled() {
                        log(LogTag::Poller, "WARN", &format!("Polling cycle failed: {}", e));
                    }
                }
            }

            if check_shutdown_or_delay(&shutdown, interval).await {
                log(LogTag::Poller, "STOP", "Polling monitor shutting down");
                break;
            }
        }
    })
}
