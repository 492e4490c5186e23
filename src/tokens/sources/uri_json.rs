//! Storage source: follows the metadata URI reported by the on-chain
//! asset and extracts name/symbol/image overrides from the referenced
//! JSON document. Supplement only - the reconciler consults it when the
//! on-chain fields are absent.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

use super::FetchError;
use crate::constants::IPFS_GATEWAY_URL;
use crate::global::is_debug_metadata_enabled;
use crate::logger::{log, LogTag};
use crate::tokens::types::PartialTokenMetadata;

pub struct StorageUriSource {
    http: reqwest::Client,
    timeout: Duration,
}

impl StorageUriSource {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
        }
    }

    /// Fetch the metadata document behind `uri` and map its fields.
    pub async fn fetch_document(&self, uri: &str) -> Result<PartialTokenMetadata, FetchError> {
        let url = normalize_storage_uri(uri);

        if is_debug_metadata_enabled() {
            log(LogTag::Metadata, "URI", &format!("Fetching metadata document: {}", url));
        }

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout)
                } else {
                    FetchError::NetworkError(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(FetchError::NotIndexedYet),
            StatusCode::TOO_MANY_REQUESTS => {
                return Err(FetchError::RateLimited(format!("{} returned 429", url)))
            }
            status if !status.is_success() => {
                return Err(FetchError::NetworkError(format!(
                    "{} returned HTTP {}",
                    url, status
                )))
            }
            _ => {}
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(format!("{}: {}", url, e)))?;

        Ok(map_uri_document(&document))
    }
}

/// Rewrite ipfs:// URIs to an HTTP gateway; everything else passes through
pub fn normalize_storage_uri(uri: &str) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(hash) => format!("{}{}", IPFS_GATEWAY_URL, hash),
        None => uri.to_string(),
    }
}

/// Map a metadata JSON document into a partial record
pub fn map_uri_document(document: &Value) -> PartialTokenMetadata {
    let field = |key: &str| {
        document
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    PartialTokenMetadata {
        name: field("name"),
        symbol: field("symbol"),
        image: field("image"),
        website: field("external_url").or_else(|| field("website")),
        ..PartialTokenMetadata::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ipfs_uris_normalize_to_gateway() {
        assert_eq!(
            normalize_storage_uri("ipfs://QmHash123"),
            "https://ipfs.io/ipfs/QmHash123"
        );
        assert_eq!(
            normalize_storage_uri("https://arweave.net/abc"),
            "https://arweave.net/abc"
        );
    }

    #[test]
    fn maps_document_fields() {
        let document = json!({
            "name": "Foo Token",
            "symbol": "FOO",
            "image": "ipfs://QmImage",
            "external_url": "https://foo.example",
            "description": "ignored"
        });
        let record = map_uri_document(&document);
        assert_eq!(record.name.as_deref(), Some("Foo Token"));
        assert_eq!(record.symbol.as_deref(), Some("FOO"));
        assert_eq!(record.image.as_deref(), Some("ipfs://QmImage"));
        assert_eq!(record.website.as_deref(), Some("https://foo.example"));
    }

    #[test]
    fn website_falls_back_to_website_key() {
        let record = map_uri_document(&json!({ "website": "https://bar.example" }));
        assert_eq!(record.website.as_deref(), Some("https://bar.example"));
    }

    #[test]
    fn social_fields_are_never_claimed() {
        // Even when the document carries them, this source has no
        // authority over social/fee fields
        let document = json!({
            "name": "Foo",
            "twitter": "alice",
            "sellerFeeBasisPoints": 500
        });
        let record = map_uri_document(&document);
        assert!(record.creator_handle.is_none());
        assert!(record.fee_recipient_handle.is_none());
        assert!(record.royalty_percent.is_none());
    }

    #[test]
    fn blank_fields_count_as_absent() {
        let record = map_uri_document(&json!({ "name": "  ", "symbol": "" }));
        assert!(record.is_empty());
    }
}
