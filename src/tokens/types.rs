use serde::{Deserialize, Serialize};

/// Display name used when no source resolved one
pub const DEFAULT_TOKEN_NAME: &str = "Unknown Token";

/// Ticker used when no source resolved one
pub const DEFAULT_TOKEN_SYMBOL: &str = "UNKNOWN";

/// Royalty percentages must lie in (0, 100]; anything else is noise
pub fn royalty_in_bounds(percent: f64) -> bool {
    percent > 0.0 && percent <= 100.0
}

/// One source's sparse contribution to a token's display record.
///
/// `None` means "this source had no opinion", which is distinct from an
/// empty string - reconciliation falls through to the next source only on
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialTokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub image: Option<String>,
    pub website: Option<String>,
    /// Where the off-chain metadata document lives, reported by the
    /// on-chain source so the storage source can follow it
    pub metadata_uri: Option<String>,
    pub creator_handle: Option<String>,
    pub fee_recipient_handle: Option<String>,
    pub royalty_percent: Option<f64>,
}

impl PartialTokenMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the source contributed nothing at all
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Store a royalty percentage if it is in bounds. Returns whether the
    /// value was accepted; out-of-range values are never stored.
    pub fn set_royalty(&mut self, percent: f64) -> bool {
        if royalty_in_bounds(percent) {
            self.royalty_percent = Some(percent);
            true
        } else {
            false
        }
    }
}

/// The reconciled record handed to the notifier. Created once per token,
/// immutable afterwards, not persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenDisplayRecord {
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub website: Option<String>,
    pub creator_handle: Option<String>,
    pub fee_recipient_handle: Option<String>,
    pub royalty_percent: Option<f64>,
}

impl TokenDisplayRecord {
    /// True when creator and fee recipient are both known and differ
    /// (case-insensitively). Drives the notifier's split display branch.
    pub fn is_split(&self) -> bool {
        match (&self.creator_handle, &self.fee_recipient_handle) {
            (Some(creator), Some(fee)) => !creator.eq_ignore_ascii_case(fee),
            _ => false,
        }
    }

    /// The handle shown under the "Creator" label. When only a fee
    /// recipient is known it is displayed as the creator - an intentional
    /// labeling fallback, not a guessed value.
    pub fn effective_creator(&self) -> Option<&str> {
        self.creator_handle
            .as_deref()
            .or(self.fee_recipient_handle.as_deref())
    }

    /// True when reconciliation produced nothing displayable; the notifier
    /// uses this to fall back to a minimal message.
    pub fn is_fully_empty(&self) -> bool {
        self.name == DEFAULT_TOKEN_NAME
            && self.symbol == DEFAULT_TOKEN_SYMBOL
            && self.image.is_none()
    }
}
