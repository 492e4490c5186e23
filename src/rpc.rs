//! Thin JSON-RPC client for the watcher's three upstream calls:
//! `getSignaturesForAddress`, `getTransaction` and `getAsset`.
//!
//! Every call carries a bounded timeout and runs under the shared retry
//! policy. Rate limiting is surfaced as its own error kind so callers can
//! back off harder instead of hammering the provider.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::global::is_debug_rpc_enabled;
use crate::logger::{log, LogTag};
use crate::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
}

impl RpcError {
    /// Rate limits want a longer backoff than plain transport hiccups
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, RpcError::RateLimited(_))
    }

    pub fn is_retryable(&self) -> bool {
        // Malformed top-level shapes are protocol violations; they are
        // logged and retried like transport failures
        true
    }
}

/// One entry from getSignaturesForAddress (newest first)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    #[serde(default)]
    pub slot: Option<u64>,
    /// Error if the transaction failed, None if successful
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub confirmation_status: Option<String>,
    #[serde(default)]
    pub memo: Option<String>,
}

/// getTransaction response, message kept as raw JSON since the account
/// key encoding varies between providers
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    #[serde(default)]
    pub slot: Option<u64>,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    #[serde(default)]
    pub transaction: Option<TransactionPayload>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<Value>,
    #[serde(default)]
    pub log_messages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPayload {
    #[serde(default)]
    pub message: Value,
}

pub struct RpcClient {
    http: reqwest::Client,
    url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RpcClient {
    pub fn new(url: String, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
            timeout,
            retry,
        }
    }

    /// Endpoint with query parameters redacted, safe for logs
    pub fn masked_url(&self) -> String {
        mask_endpoint(&self.url)
    }

    /// Fetch the most recent signatures mentioning `address`, newest first.
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, RpcError> {
        let result = self
            .call_with_retry(
                "getSignaturesForAddress",
                json!([address, { "limit": limit }]),
            )
            .await?;

        serde_json::from_value(result)
            .map_err(|e| RpcError::Malformed(format!("signature list: {}", e)))
    }

    /// Fetch one confirmed transaction. `Ok(None)` means the node has no
    /// record of the signature (terminal, not retried).
    pub async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionDetails>, RpcError> {
        let params = json!([
            signature,
            {
                "encoding": "json",
                "commitment": "confirmed",
                "maxSupportedTransactionVersion": 0
            }
        ]);
        let result = self.call_with_retry("getTransaction", params).await?;

        if result.is_null() {
            return Ok(None);
        }

        serde_json::from_value(result)
            .map(Some)
            .map_err(|e| RpcError::Malformed(format!("transaction: {}", e)))
    }

    /// DAS getAsset keyed by mint. `Ok(None)` means the asset is unknown
    /// to the indexer (not indexed yet).
    pub async fn get_asset(&self, mint: &str) -> Result<Option<Value>, RpcError> {
        match self.call_with_retry("getAsset", json!({ "id": mint })).await {
            Ok(Value::Null) => Ok(None),
            Ok(result) => Ok(Some(result)),
            Err(RpcError::Node { code, message }) => {
                // DAS reports unknown assets as a node error rather than null
                if message.to_lowercase().contains("not found") {
                    Ok(None)
                } else {
                    Err(RpcError::Node { code, message })
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Run one JSON-RPC call under the retry policy.
    async fn call_with_retry(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let mut attempt = 0;
        loop {
            match self.call(method, params.clone()).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !e.is_retryable() || !self.retry.has_more_attempts(attempt) {
                        return Err(e);
                    }
                    let mut delay = self.retry.delay_for(attempt);
                    if e.is_rate_limited() {
                        delay *= 2;
                    }
                    if is_debug_rpc_enabled() {
                        log(
                            LogTag::Rpc,
                            "RETRY",
                            &format!(
                                "{} attempt {}/{} failed ({}), retrying in {:?}",
                                method,
                                attempt + 1,
                                self.retry.max_attempts,
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

    /// Single JSON-RPC round trip with timeout and error classification.
    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify_reqwest_error(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(RpcError::RateLimited(format!("{} returned 429", method)));
        }
        if !status.is_success() {
            return Err(RpcError::Transport(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Malformed(format!("{}: {}", method, e)))?;

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            if code == -32429 || message.to_lowercase().contains("rate") {
                return Err(RpcError::RateLimited(message));
            }
            return Err(RpcError::Node { code, message });
        }

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    fn classify_reqwest_error(&self, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout(self.timeout)
        } else {
            RpcError::Transport(e.to_string())
        }
    }
}

/// Strip query parameters (API keys live there) from an endpoint for logging
pub fn mask_endpoint(endpoint: &str) -> String {
    match Url::parse(endpoint) {
        Ok(url) => {
            let mut masked = format!(
                "{}://{}{}",
                url.scheme(),
                url.host_str().unwrap_or_default(),
                url.path()
            );
            if url.query().is_some() {
                masked.push_str("?<redacted>");
            }
            masked
        }
        Err(_) => endpoint.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_endpoint_hides_api_keys() {
        assert_eq!(
            mask_endpoint("https://mainnet.helius-rpc.com/?api-key=secret"),
            "https://mainnet.helius-rpc.com/?<redacted>"
        );
        assert_eq!(
            mask_endpoint("https://api.mainnet-beta.solana.com"),
            "https://api.mainnet-beta.solana.com/"
        );
    }

    #[test]
    fn signature_info_parses_rpc_shape() {
        let raw = serde_json::json!({
            "signature": "5h4s",
            "slot": 1234,
            "err": null,
            "blockTime": 1700000000,
            "confirmationStatus": "confirmed",
            "memo": null
        });
        let info: SignatureInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(info.signature, "5h4s");
        assert_eq!(info.slot, Some(1234));
        assert!(info.err.is_none());
        assert_eq!(info.confirmation_status.as_deref(), Some("confirmed"));
    }

    #[test]
    fn transaction_details_tolerates_missing_fields() {
        let raw = serde_json::json!({
            "slot": 1,
            "meta": { "err": null },
            "transaction": { "message": { "accountKeys": [] } }
        });
        let tx: TransactionDetails = serde_json::from_value(raw).unwrap();
        let meta = tx.meta.unwrap();
        assert!(meta.err.is_none());
        assert!(meta.log_messages.is_empty());
    }

    #[test]
    fn failed_transaction_meta_keeps_error() {
        let raw = serde_json::json!({
            "meta": { "err": { "InstructionError": [0, "Custom"] }, "logMessages": ["log"] }
        });
        let tx: TransactionDetails = serde_json::from_value(raw).unwrap();
        assert!(tx.meta.unwrap().err.is_some());
    }
}
