//! Outbound notification seam.
//!
//! Message delivery (Telegram or otherwise) is an external collaborator;
//! this module defines the contract the pipeline produces - one
//! `(mint, TokenDisplayRecord)` pair per launch, invoked fire-and-forget
//! so delivery can never block detection - plus a console implementation
//! used when no delivery backend is wired up.

pub mod types;

use async_trait::async_trait;

use crate::logger::{log, LogTag};
use crate::tokens::types::TokenDisplayRecord;
use crate::utils::truncate_address;

pub use types::HandleDisplay;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, mint: &str, record: &TokenDisplayRecord) -> Result<(), String>;
}

/// Logs each launch to the console in the shape a delivery backend would
/// render it.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, mint: &str, record: &TokenDisplayRecord) -> Result<(), String> {
        if record.is_fully_empty() {
            // Minimal fallback: announce the mint even with no metadata
            log(
                LogTag::Notify,
                "LAUNCH",
                &format!(
                    "🚀 New launch {} (details temporarily unavailable)",
                    truncate_address(mint)
                ),
            );
            return Ok(());
        }

        let handles = match HandleDisplay::from_record(record) {
            HandleDisplay::Split {
                creator,
                fee_recipient,
            } => format!(" creator=@{} fee-recipient=@{}", creator, fee_recipient),
            HandleDisplay::Single(handle) => format!(" @{}", handle),
            HandleDisplay::CreatorOnly(handle) => format!(" creator=@{}", handle),
            HandleDisplay::Unknown => String::new(),
        };

        let royalty = record
            .royalty_percent
            .map(|p| format!(" royalty={}%", p))
            .unwrap_or_default();

        log(
            LogTag::Notify,
            "LAUNCH",
            &format!(
                "🚀 {} ({}) mint={}{}{}",
                record.name,
                record.symbol,
                truncate_address(mint),
                handles,
                royalty
            ),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::types::{DEFAULT_TOKEN_NAME, DEFAULT_TOKEN_SYMBOL};

    #[tokio::test]
    async fn console_notifier_accepts_any_record() {
        let record = TokenDisplayRecord {
            name: DEFAULT_TOKEN_NAME.to_string(),
            symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
            image: None,
            website: None,
            creator_handle: None,
            fee_recipient_handle: None,
            royalty_percent: None,
        };
        assert!(ConsoleNotifier.notify("MintA", &record).await.is_ok());
    }
}
