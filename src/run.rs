//! Orchestrator: wires the two ingestion paths through the dedup gate
//! into per-token reconciliation pipelines.
//!
//! Ordering is only guaranteed per token (fan-out, then reconcile, then
//! notify); tokens detected concurrently may complete out of order.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

use crate::config::Config;
use crate::constants::{FEE_PAGE_BASE_URL, PROXIMITY_WINDOW_CHARS};
use crate::dedup::SeenMints;
use crate::global::{is_debug_detector_enabled, is_debug_pipeline_enabled};
use crate::logger::{log, LogTag};
use crate::mint_detector::{extract_launch_candidate, RawChainEvent};
use crate::notifications::{ConsoleNotifier, Notifier};
use crate::polling::start_polling_monitoring;
use crate::retry::RetryPolicy;
use crate::rpc::RpcClient;
use crate::tokens::reconcile;
use crate::tokens::sources::{
    AssetRpcSource, FeePageSource, FetchError, MetadataSource, StorageUriSource,
};
use crate::tokens::types::PartialTokenMetadata;
use crate::utils::truncate_address;
use crate::websocket::start_logs_monitoring;

/// Retry budget for the asset source: launches hit the indexer before it
/// has the asset, so this is more patient than the plain RPC retries
const ASSET_RETRY: RetryPolicy =
    RetryPolicy::new(4, Duration::from_secs(2), Duration::from_secs(20));

/// Everything a per-token pipeline task needs, shared behind an Arc
pub struct Pipeline {
    authority: String,
    rpc: Arc<RpcClient>,
    asset_source: AssetRpcSource,
    storage_source: StorageUriSource,
    fee_page_source: FeePageSource,
    seen: Arc<SeenMints>,
    notifier: Arc<dyn Notifier>,
}

impl Pipeline {
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let rpc = Arc::new(RpcClient::new(
            config.rpc_url.clone(),
            config.rpc_timeout(),
            RetryPolicy::default(),
        ));

        Self {
            authority: config.tracked_authority.clone(),
            asset_source: AssetRpcSource::new(Arc::clone(&rpc)),
            storage_source: StorageUriSource::new(config.uri_timeout()),
            fee_page_source: FeePageSource::new(
                FEE_PAGE_BASE_URL.to_string(),
                config.page_timeout(),
                PROXIMITY_WINDOW_CHARS,
                config.royalty_max_percent,
            ),
            rpc,
            seen: Arc::new(SeenMints::new()),
            notifier,
        }
    }

    pub fn rpc(&self) -> Arc<RpcClient> {
        Arc::clone(&self.rpc)
    }

    /// Detection entry point shared by both ingestion paths: fetch the
    /// transaction, extract the candidate mint, gate it, then kick off
    /// reconciliation.
    pub async fn handle_signature(self: &Arc<Self>, signature: &str) {
        let tx = match self.rpc.get_transaction(signature).await {
            Ok(Some(tx)) => tx,
            Ok(None) => {
                if is_debug_detector_enabled() {
                    log(
                        LogTag::Detector,
                        "SKIP",
                        &format!("No transaction found for {}", truncate_address(signature)),
                    );
                }
                return;
            }
            Err(e) => {
                log(
                    LogTag::Detector,
                    "ERROR",
                    &format!(
                        "Failed to fetch transaction {}: {}",
                        truncate_address(signature),
                        e
                    ),
                );
                return;
            }
        };

        let event = RawChainEvent::from_transaction(signature, &tx);
        let Some(mint) = extract_launch_candidate(&event, &self.authority) else {
            return;
        };

        if !self.seen.admit(&mint) {
            if is_debug_detector_enabled() {
                log(
                    LogTag::Detector,
                    "DUPLICATE",
                    &format!("Already processed {}", truncate_address(&mint)),
                );
            }
            return;
        }

        log(
            LogTag::Pipeline,
            "NEW_TOKEN",
            &format!("🎯 New Bags launch detected: {}", mint),
        );

        // Fire-and-forget: each admitted mint reconciles in its own task
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.process_new_token(&mint).await;
        });
    }

    /// Fan the sources out, wait for all of them, reconcile, notify.
    pub async fn process_new_token(&self, mint: &str) {
        let (asset_result, fee_result) = tokio::join!(
            self.fetch_asset_with_retry(mint),
            self.fee_page_source.fetch(mint)
        );

        let onchain = self.unwrap_partial(mint, self.asset_source.name(), asset_result);
        let fee_split = self.unwrap_partial(mint, self.fee_page_source.name(), fee_result);

        // The storage source follows the URI the asset source reported
        let storage = match onchain.metadata_uri.as_deref() {
            Some(uri) => {
                let result = self.storage_source.fetch_document(uri).await;
                self.unwrap_partial(mint, "storage-uri", result)
            }
            None => PartialTokenMetadata::empty(),
        };

        let record = reconcile(mint, &onchain, &storage, &fee_split);

        if record.is_fully_empty() {
            log(
                LogTag::Pipeline,
                "WARN",
                &format!(
                    "Reconciliation produced no display data for {}",
                    truncate_address(mint)
                ),
            );
        }

        // Notification must never block or fail the pipeline
        let notifier = Arc::clone(&self.notifier);
        let mint = mint.to_string();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&mint, &record).await {
                log(
                    LogTag::Notify,
                    "ERROR",
                    &format!("Failed to notify for {}: {}", truncate_address(&mint), e),
                );
            }
        });
    }

    /// The asset indexer lags launches by a few seconds; retry with the
    /// patient policy and double the wait when rate limited.
    async fn fetch_asset_with_retry(
        &self,
        mint: &str,
    ) -> Result<PartialTokenMetadata, FetchError> {
        let mut attempt = 0;
        loop {
            match self.asset_source.fetch(mint).await {
                Ok(record) => return Ok(record),
                Err(e) => {
                    if !e.is_retryable() || !ASSET_RETRY.has_more_attempts(attempt) {
                        return Err(e);
                    }
                    let mut delay = ASSET_RETRY.delay_for(attempt);
                    if e.wants_longer_backoff() {
                        delay *= 2;
                    }
                    if is_debug_pipeline_enabled() {
                        log(
                            LogTag::Pipeline,
                            "RETRY",
                            &format!(
                                "Asset fetch for {} failed ({}), retrying in {:?}",
                                truncate_address(mint),
                                e,
                                delay
                            ),
                        );
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// A failed source contributes an empty record, never an abort
    fn unwrap_partial(
        &self,
        mint: &str,
        source: &str,
        result: Result<PartialTokenMetadata, FetchError>,
    ) -> PartialTokenMetadata {
        match result {
            Ok(record) => record,
            Err(e) => {
                log(
                    LogTag::Pipeline,
                    "SOURCE_EMPTY",
                    &format!(
                        "{} contributed nothing for {}: {}",
                        source,
                        truncate_address(mint),
                        e
                    ),
                );
                PartialTokenMetadata::empty()
            }
        }
    }
}

/// Run the watcher until shutdown: both ingestion paths feed one channel,
/// every signature is handled in its own task.
pub async fn run(config: Config) -> Result<(), String> {
    let shutdown = Arc::new(Notify::new());
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            shutdown.notify_waiters();
        })
        .map_err(|e| format!("Failed to install Ctrl-C handler: {}", e))?;
    }

    let pipeline = Arc::new(Pipeline::new(&config, Arc::new(ConsoleNotifier)));

    let (sig_tx, mut sig_rx) = mpsc::unbounded_channel::<String>();

    let ws_task = start_logs_monitoring(
        config.tracked_authority.clone(),
        config.ws_url.clone(),
        config.reconnect_delay(),
        sig_tx.clone(),
        Arc::clone(&shutdown),
    );

    let poll_task = start_polling_monitoring(
        pipeline.rpc(),
        config.tracked_authority.clone(),
        config.poll_interval(),
        config.poll_signature_limit,
        sig_tx,
        Arc::clone(&shutdown),
    );

    log(
        LogTag::System,
        "READY",
        "Monitoring services started (WebSocket + polling)",
    );

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                log(LogTag::System, "STOP", "Shutdown signal received");
                break;
            }
            received = sig_rx.recv() => {
                match received {
                    Some(signature) => {
                        let pipeline = Arc::clone(&pipeline);
                        tokio::spawn(async move {
                            pipeline.handle_signature(&signature).await;
                        });
                    }
                    None => break,
                }
            }
        }
    }

    // The ingestion loops exit on their own shutdown checks
    let _ = tokio::time::timeout(Duration::from_secs(5), async {
        let _ = ws_task.await;
        let _ = poll_task.await;
    })
    .await;

    log(LogTag::System, "STOP", "BagWatch stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BAGS_UPDATE_AUTHORITY, METADATA_PROGRAM_ID};
    use crate::tokens::types::{DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL};

    const TEST_MINT: &str = "GxTkyDCftKD5PzbWkWg2NHcmcqspWbi31T5skXKEBAGS";

    /// The full detection-to-record path on a captured launch shape:
    /// detector extracts the mint, the gate admits it once, and the
    /// reconciler produces a fully-populated split record.
    #[test]
    fn launch_event_flows_to_split_record() {
        let event = RawChainEvent {
            signature: "sig1".to_string(),
            logs: vec![
                "Program metaq invoke [1]".to_string(),
                "Instruction: CreateMetadataAccount".to_string(),
            ],
            account_keys: vec![
                METADATA_PROGRAM_ID.to_string(),
                BAGS_UPDATE_AUTHORITY.to_string(),
                TEST_MINT.to_string(),
            ],
            err: None,
        };

        let mint = extract_launch_candidate(&event, BAGS_UPDATE_AUTHORITY).unwrap();
        assert_eq!(mint, TEST_MINT);

        let seen = SeenMints::new();
        assert!(seen.admit(&mint));
        assert!(!seen.admit(&mint));

        let onchain = PartialTokenMetadata {
            name: Some("Foo".to_string()),
            symbol: Some("FOO".to_string()),
            ..PartialTokenMetadata::default()
        };
        let fee_split = PartialTokenMetadata {
            creator_handle: Some("alice".to_string()),
            fee_recipient_handle: Some("bob".to_string()),
            royalty_percent: Some(10.0),
            ..PartialTokenMetadata::default()
        };

        let record = reconcile(&mint, &onchain, &PartialTokenMetadata::empty(), &fee_split);
        assert_eq!(record.name, "Foo");
        assert_eq!(record.symbol, "FOO");
        assert_eq!(record.creator_handle.as_deref(), Some("alice"));
        assert_eq!(record.fee_recipient_handle.as_deref(), Some("bob"));
        assert_eq!(record.royalty_percent, Some(10.0));
        assert!(record.is_split());
    }

    #[test]
    fn empty_sources_still_produce_a_record() {
        let record = reconcile(
            TEST_MINT,
            &PartialTokenMetadata::empty(),
            &PartialTokenMetadata::empty(),
            &PartialTokenMetadata::empty(),
        );
        assert_eq!(record.name, DEFAULT_TOKEN_NAME);
        assert_eq!(record.symbol, DEFAULT_TOKEN_SYMBOL);
        assert!(record.is_fully_empty());
    }
}
