//! Launch-candidate extraction from observed transactions.
//!
//! A transaction qualifies as a launch iff its logs carry a
//! metadata-creation marker and its account list mentions the tracked
//! update authority. The candidate mint is the first account that is
//! neither the metadata program nor the authority and has the shape of a
//! mint address.

use serde_json::Value;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use crate::constants::{
    METADATA_CREATION_MARKER, METADATA_PROGRAM_ID, METADATA_PROGRAM_LOG_HINT, MIN_MINT_ADDRESS_LEN,
};
use crate::global::is_debug_detector_enabled;
use crate::logger::{log, LogTag};
use crate::rpc::TransactionDetails;
use crate::utils::truncate_address;

/// One observed log/transaction notification, reduced to the fields the
/// extraction rule needs. Built per event, discarded after extraction.
#[derive(Debug, Clone)]
pub struct RawChainEvent {
    pub signature: String,
    pub logs: Vec<String>,
    pub account_keys: Vec<String>,
    /// Error if the transaction failed on-chain, None if successful
    pub err: Option<Value>,
}

impl RawChainEvent {
    pub fn from_transaction(signature: &str, tx: &TransactionDetails) -> Self {
        let (err, logs) = match &tx.meta {
            Some(meta) => (meta.err.clone(), meta.log_messages.clone()),
            None => (None, Vec::new()),
        };

        let account_keys = tx
            .transaction
            .as_ref()
            .map(|payload| extract_account_keys(&payload.message))
            .unwrap_or_default();

        Self {
            signature: signature.to_string(),
            logs,
            account_keys,
            err,
        }
    }
}

/// Extract account keys from a raw transaction message.
///
/// Providers encode keys either as bare strings or as
/// `{ "pubkey": "..." }` objects; both are accepted.
pub fn extract_account_keys(message: &Value) -> Vec<String> {
    let Some(keys) = message.get("accountKeys").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut account_keys = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(s) = key.as_str() {
            account_keys.push(s.to_string());
        } else if let Some(s) = key.get("pubkey").and_then(Value::as_str) {
            account_keys.push(s.to_string());
        }
    }
    account_keys
}

/// Check the transaction logs for a metadata-creation instruction
pub fn has_metadata_creation_marker(logs: &[String]) -> bool {
    logs.iter().any(|line| {
        line.contains(METADATA_CREATION_MARKER)
            || line.to_lowercase().contains(METADATA_PROGRAM_LOG_HINT)
    })
}

/// Apply the launch-detection rule and return the candidate mint.
///
/// Failed transactions are discarded before marker inspection. The
/// positional pick (first qualifying account) matches the launchpad's
/// observed transaction layout; instruction-role decoding would be more
/// robust if that layout ever changes, which is why the rule is isolated
/// here.
pub fn extract_launch_candidate(event: &RawChainEvent, authority: &str) -> Option<String> {
    if event.err.is_some() {
        if is_debug_detector_enabled() {
            log(
                LogTag::Detector,
                "SKIP",
                &format!("Transaction failed on-chain: {}", event.signature),
            );
        }
        return None;
    }

    if !has_metadata_creation_marker(&event.logs) {
        return None;
    }

    if !event.account_keys.iter().any(|key| key == authority) {
        return None;
    }

    let candidate = event.account_keys.iter().find(|key| {
        key.as_str() != METADATA_PROGRAM_ID
            && key.as_str() != authority
            && key.len() >= MIN_MINT_ADDRESS_LEN
            && Pubkey::from_str(key).is_ok()
    })?;

    if is_debug_detector_enabled() {
        log(
            LogTag::Detector,
            "CANDIDATE",
            &format!(
                "🎯 Launch candidate {} in {}",
                truncate_address(candidate),
                truncate_address(&event.signature)
            ),
        );
    }

    Some(candidate.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BAGS_UPDATE_AUTHORITY;
    use serde_json::json;

    // Real mainnet mint from a Bags launch, 44 chars
    const TEST_MINT: &str = "GxTkyDCftKD5PzbWkWg2NHcmcqspWbi31T5skXKEBAGS";

    fn launch_event() -> RawChainEvent {
        RawChainEvent {
            signature: "sig1".to_string(),
            logs: vec![
                "Program metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s invoke [1]".to_string(),
                "Instruction: CreateMetadataAccountV3".to_string(),
            ],
            account_keys: vec![
                METADATA_PROGRAM_ID.to_string(),
                BAGS_UPDATE_AUTHORITY.to_string(),
                TEST_MINT.to_string(),
            ],
            err: None,
        }
    }

    #[test]
    fn extracts_candidate_from_launch_transaction() {
        let candidate = extract_launch_candidate(&launch_event(), BAGS_UPDATE_AUTHORITY);
        assert_eq!(candidate.as_deref(), Some(TEST_MINT));
    }

    #[test]
    fn failed_transactions_are_discarded() {
        let mut event = launch_event();
        event.err = Some(json!({ "InstructionError": [0, "Custom"] }));
        assert!(extract_launch_candidate(&event, BAGS_UPDATE_AUTHORITY).is_none());
    }

    #[test]
    fn requires_metadata_creation_marker() {
        let mut event = launch_event();
        event.logs = vec!["Program 11111111111111111111111111111111 invoke [1]".to_string()];
        assert!(extract_launch_candidate(&event, BAGS_UPDATE_AUTHORITY).is_none());
    }

    #[test]
    fn lowercase_program_hint_counts_as_marker() {
        let mut event = launch_event();
        event.logs = vec!["Program metaq invoke [1]".to_string()];
        assert_eq!(
            extract_launch_candidate(&event, BAGS_UPDATE_AUTHORITY).as_deref(),
            Some(TEST_MINT)
        );
    }

    #[test]
    fn requires_tracked_authority() {
        let mut event = launch_event();
        event.account_keys.retain(|k| k != BAGS_UPDATE_AUTHORITY);
        assert!(extract_launch_candidate(&event, BAGS_UPDATE_AUTHORITY).is_none());
    }

    #[test]
    fn skips_short_and_invalid_keys() {
        let mut event = launch_event();
        event.account_keys = vec![
            METADATA_PROGRAM_ID.to_string(),
            BAGS_UPDATE_AUTHORITY.to_string(),
            // System program: valid pubkey but too short to be a mint here
            "11111111111111111111111111111111".to_string(),
            // Right length, not base58
            "!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!".to_string(),
            TEST_MINT.to_string(),
        ];
        assert_eq!(
            extract_launch_candidate(&event, BAGS_UPDATE_AUTHORITY).as_deref(),
            Some(TEST_MINT)
        );
    }

    #[test]
    fn account_keys_accept_both_encodings() {
        let message = json!({
            "accountKeys": [
                TEST_MINT,
                { "pubkey": BAGS_UPDATE_AUTHORITY, "signer": true },
                42
            ]
        });
        let keys = extract_account_keys(&message);
        assert_eq!(keys, vec![TEST_MINT, BAGS_UPDATE_AUTHORITY]);
    }

    #[test]
    fn missing_account_keys_yield_empty_list() {
        assert!(extract_account_keys(&json!({})).is_empty());
        assert!(extract_account_keys(&json!({ "accountKeys": "bogus" })).is_empty());
    }
}
