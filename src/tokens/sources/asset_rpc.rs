//! On-chain asset source backed by the DAS `getAsset` RPC method.
//!
//! Holds authority over name and symbol; also reports the off-chain
//! metadata URI so the storage source can follow it. Field extraction is
//! independently tolerant - one missing sub-object never aborts the rest.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{FetchError, MetadataSource};
use crate::global::is_debug_metadata_enabled;
use crate::logger::{log, LogTag};
use crate::rpc::RpcClient;
use crate::tokens::types::PartialTokenMetadata;
use crate::utils::truncate_address;

pub struct AssetRpcSource {
    rpc: Arc<RpcClient>,
}

impl AssetRpcSource {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl MetadataSource for AssetRpcSource {
    fn name(&self) -> &'static str {
        "asset-rpc"
    }

    async fn fetch(&self, mint: &str) -> Result<PartialTokenMetadata, FetchError> {
        let asset = self
            .rpc
            .get_asset(mint)
            .await
            .map_err(FetchError::from)?
            .ok_or(FetchError::NotIndexedYet)?;

        if !asset.is_object() {
            return Err(FetchError::MalformedResponse(format!(
                "getAsset returned {} for {}",
                asset,
                truncate_address(mint)
            )));
        }

        let record = map_asset_response(&asset);
        if is_debug_metadata_enabled() {
            log(
                LogTag::Metadata,
                "ASSET",
                &format!(
                    "✅ {}: name={:?} symbol={:?} uri={}",
                    truncate_address(mint),
                    record.name,
                    record.symbol,
                    record.metadata_uri.is_some()
                ),
            );
        }
        Ok(record)
    }
}

/// Map a getAsset result into a partial record.
///
/// Every field is pulled independently; the asset being present but
/// sparse yields a sparse record ("indexed but empty"), which callers
/// distinguish from `NotIndexedYet`.
pub fn map_asset_response(asset: &Value) -> PartialTokenMetadata {
    let content = asset.get("content");
    let metadata = content.and_then(|c| c.get("metadata"));
    let links = content.and_then(|c| c.get("links"));

    let name = metadata
        .and_then(|m| m.get("name"))
        .and_then(Value::as_str)
        .and_then(clean_onchain_string);

    let symbol = metadata
        .and_then(|m| m.get("symbol"))
        .and_then(Value::as_str)
        .and_then(clean_onchain_string);

    let image = links
        .and_then(|l| l.get("image"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| first_file_uri(content));

    let website = links
        .and_then(|l| l.get("external_url"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| attribute_value(metadata, "website"));

    let metadata_uri = content
        .and_then(|c| c.get("json_uri"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    PartialTokenMetadata {
        name,
        symbol,
        image,
        website,
        metadata_uri,
        ..PartialTokenMetadata::default()
    }
}

/// On-chain strings are fixed-width and NUL padded; blank means absent
fn clean_onchain_string(raw: &str) -> Option<String> {
    let cleaned = raw.trim_matches('\0').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn first_file_uri(content: Option<&Value>) -> Option<String> {
    let file = content
        .and_then(|c| c.get("files"))
        .and_then(Value::as_array)
        .and_then(|files| files.first())?;

    file.get("cdn_uri")
        .or_else(|| file.get("uri"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Look up one entry of the `attributes` list of trait_type/value pairs
fn attribute_value(metadata: Option<&Value>, trait_type: &str) -> Option<String> {
    metadata
        .and_then(|m| m.get("attributes"))
        .and_then(Value::as_array)?
        .iter()
        .find(|attr| {
            attr.get("trait_type")
                .and_then(Value::as_str)
                .map(|t| t.eq_ignore_ascii_case(trait_type))
                .unwrap_or(false)
        })
        .and_then(|attr| attr.get("value"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
