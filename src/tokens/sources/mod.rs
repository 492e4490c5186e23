//! One adapter per external metadata provider.
//!
//! Each source converts a provider-specific response into the common
//! `PartialTokenMetadata` shape, or a `FetchError` describing why it had
//! nothing. Source failures never abort a token's pipeline - the
//! reconciler treats a failed source as an empty contribution.

pub mod asset_rpc;
pub mod fee_page;
pub mod uri_json;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::rpc::RpcError;
use crate::tokens::types::PartialTokenMetadata;

pub use asset_rpc::AssetRpcSource;
pub use fee_page::FeePageSource;
pub use uri_json::StorageUriSource;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider legitimately has no data for this token yet
    #[error("not indexed yet")]
    NotIndexedYet,
    #[error("rate limited: {0}")]
    RateLimited(String),
    /// Response parsed but the expected shape was missing
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Whether another attempt could produce data. Malformed responses
    /// will stay malformed; everything else is transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, FetchError::MalformedResponse(_))
    }

    /// Rate limits need a longer backoff, not an immediate retry
    pub fn wants_longer_backoff(&self) -> bool {
        matches!(self, FetchError::RateLimited(_))
    }
}

impl From<RpcError> for FetchError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Timeout(d) => FetchError::Timeout(d),
            RpcError::RateLimited(msg) => FetchError::RateLimited(msg),
            RpcError::Transport(msg) => FetchError::NetworkError(msg),
            RpcError::Malformed(msg) => FetchError::MalformedResponse(msg),
            RpcError::Node { code, message } => {
                FetchError::NetworkError(format!("node error {}: {}", code, message))
            }
        }
    }
}

/// Capability interface for mint-keyed metadata providers. The storage
/// source is keyed by a document URI instead and lives outside the trait.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, mint: &str) -> Result<PartialTokenMetadata, FetchError>;
}
