use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    BAGS_UPDATE_AUTHORITY, DEFAULT_PAGE_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_POLL_SIGNATURE_LIMIT, DEFAULT_RECONNECT_DELAY_SECS, DEFAULT_ROYALTY_MAX_PERCENT,
    DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_RPC_URL, DEFAULT_URI_TIMEOUT_SECS, DEFAULT_WS_URL,
};

/// Runtime configuration, sourced from environment variables.
///
/// Every field has a working default so the watcher runs with no
/// configuration at all (on the public mainnet endpoints).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Update authority whose transactions signal a launch
    pub tracked_authority: String,
    pub rpc_url: String,
    pub ws_url: String,
    pub poll_interval_secs: u64,
    pub reconnect_delay_secs: u64,
    pub poll_signature_limit: usize,
    pub rpc_timeout_secs: u64,
    pub page_timeout_secs: u64,
    pub uri_timeout_secs: u64,
    /// Royalty percentages above this are treated as page noise
    pub royalty_max_percent: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracked_authority: BAGS_UPDATE_AUTHORITY.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            ws_url: DEFAULT_WS_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            reconnect_delay_secs: DEFAULT_RECONNECT_DELAY_SECS,
            poll_signature_limit: DEFAULT_POLL_SIGNATURE_LIMIT,
            rpc_timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT_SECS,
            uri_timeout_secs: DEFAULT_URI_TIMEOUT_SECS,
            royalty_max_percent: DEFAULT_ROYALTY_MAX_PERCENT,
        }
    }
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// `HELIUS_API_KEY` expands both endpoints to the Helius URLs unless
    /// `RPC_URL`/`WS_URL` are set explicitly.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(authority) = env::var("TRACKED_AUTHORITY") {
            config.tracked_authority = authority;
        }

        if let Ok(api_key) = env::var("HELIUS_API_KEY") {
            config.rpc_url = format!("https://mainnet.helius-rpc.com/?api-key={}", api_key);
            config.ws_url = format!("wss://mainnet.helius-rpc.com/?api-key={}", api_key);
        }

        // Explicit endpoints win over the Helius expansion
        if let Ok(url) = env::var("RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(url) = env::var("WS_URL") {
            config.ws_url = url;
        }

        if let Some(v) = env_parse::<u64>("POLL_INTERVAL_SECS")? {
            config.poll_interval_secs = v;
        }
        if let Some(v) = env_parse::<u64>("RECONNECT_DELAY_SECS")? {
            config.reconnect_delay_secs = v;
        }
        if let Some(v) = env_parse::<usize>("POLL_SIGNATURE_LIMIT")? {
            config.poll_signature_limit = v;
        }
        if let Some(v) = env_parse::<u64>("RPC_TIMEOUT_SECS")? {
            config.rpc_timeout_secs = v;
        }
        if let Some(v) = env_parse::<u64>("PAGE_TIMEOUT_SECS")? {
            config.page_timeout_secs = v;
        }
        if let Some(v) = env_parse::<u64>("URI_TIMEOUT_SECS")? {
            config.uri_timeout_secs = v;
        }
        if let Some(v) = env_parse::<f64>("ROYALTY_MAX_PERCENT")? {
            config.royalty_max_percent = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        Pubkey::from_str(&self.tracked_authority).with_context(|| {
            format!(
                "TRACKED_AUTHORITY is not a valid pubkey: {}",
                self.tracked_authority
            )
        })?;

        if self.poll_interval_secs == 0 {
            anyhow::bail!("POLL_INTERVAL_SECS must be greater than zero");
        }
        if self.reconnect_delay_secs == 0 {
            anyhow::bail!("RECONNECT_DELAY_SECS must be greater than zero");
        }
        if self.poll_signature_limit == 0 {
            anyhow::bail!("POLL_SIGNATURE_LIMIT must be greater than zero");
        }
        if self.royalty_max_percent <= 0.0 || self.royalty_max_percent > 100.0 {
            anyhow::bail!("ROYALTY_MAX_PERCENT must lie in (0, 100]");
        }

        Ok(())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn uri_timeout(&self) -> Duration {
        Duration::from_secs(self.uri_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => {
            let value = raw
                .parse::<T>()
                .with_context(|| format!("Failed to parse {}: {}", key, raw))?;
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}
