//! Merge the per-source partial records into one display record.
//!
//! The authority table is fixed and per-field:
//!
//! | field          | priority                                  |
//! |----------------|-------------------------------------------|
//! | name, symbol   | on-chain asset, then storage, then default |
//! | image          | on-chain asset, then storage               |
//! | website        | on-chain asset, then storage               |
//! | creator        | fee-split page only                        |
//! | fee recipient  | fee-split page only                        |
//! | royalty        | fee-split page only                        |
//!
//! Mixing sources outside this table is where display bugs come from, so
//! every field reads from exactly the columns above - first non-null wins.

use crate::global::is_debug_pipeline_enabled;
use crate::logger::{log, LogTag};
use crate::tokens::types::{
    royalty_in_bounds, PartialTokenMetadata, TokenDisplayRecord, DEFAULT_TOKEN_NAME,
    DEFAULT_TOKEN_SYMBOL,
};
use crate::utils::truncate_address;

/// Build the canonical display record for `mint` from the three source
/// contributions. Pure and deterministic.
pub fn reconcile(
    mint: &str,
    onchain: &PartialTokenMetadata,
    storage: &PartialTokenMetadata,
    fee_split: &PartialTokenMetadata,
) -> TokenDisplayRecord {
    let record = TokenDisplayRecord {
        name: onchain
            .name
            .clone()
            .or_else(|| storage.name.clone())
            .unwrap_or_else(|| DEFAULT_TOKEN_NAME.to_string()),
        symbol: onchain
            .symbol
            .clone()
            .or_else(|| storage.symbol.clone())
            .unwrap_or_else(|| DEFAULT_TOKEN_SYMBOL.to_string()),
        image: onchain.image.clone().or_else(|| storage.image.clone()),
        website: onchain.website.clone().or_else(|| storage.website.clone()),
        creator_handle: fee_split.creator_handle.clone(),
        fee_recipient_handle: fee_split.fee_recipient_handle.clone(),
        royalty_percent: fee_split.royalty_percent.filter(|p| royalty_in_bounds(*p)),
    };

    if is_debug_pipeline_enabled() {
        log(
            LogTag::Pipeline,
            "RECONCILED",
            &format!(
                "📋 {}: name=\"{}\" symbol=\"{}\" image={} split={}",
                truncate_address(mint),
                record.name,
                record.symbol,
                record.image.is_some(),
                record.is_split()
            ),
        );
    }

    record
}
