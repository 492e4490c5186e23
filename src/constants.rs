/// Global constants used across BagWatch
///
/// This module contains system-wide constants that are not configurable
/// and are used across multiple modules. Tunable values (intervals,
/// timeouts, endpoints) live in `config.rs` and only their defaults are
/// defined here.

// ============================================================================
// SOLANA BLOCKCHAIN CONSTANTS
// ============================================================================

/// Bags launchpad update authority - every launch transaction mentions it
pub const BAGS_UPDATE_AUTHORITY: &str = "BAGSB9TpGrZxQbEsrEznv5jXXdwyP6AXerN8aVRiAmcv";

/// Metaplex Token Metadata program ID
pub const METADATA_PROGRAM_ID: &str = "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s";

/// Log line marker emitted when a metadata account is created
pub const METADATA_CREATION_MARKER: &str = "CreateMetadataAccount";

/// Lowercase program-id fragment that also marks metadata instructions
pub const METADATA_PROGRAM_LOG_HINT: &str = "metaq";

/// Minimum base58 length for a mint address candidate
pub const MIN_MINT_ADDRESS_LEN: usize = 44;

// ============================================================================
// ENDPOINT DEFAULTS
// ============================================================================

/// Public mainnet RPC endpoint (rate limited, Helius recommended)
pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Public mainnet WebSocket endpoint
pub const DEFAULT_WS_URL: &str = "wss://api.mainnet-beta.solana.com";

/// Bags token page, one document per mint
pub const FEE_PAGE_BASE_URL: &str = "https://bags.fm";

/// Public IPFS gateway used to resolve ipfs:// metadata URIs
pub const IPFS_GATEWAY_URL: &str = "https://ipfs.io/ipfs/";

// ============================================================================
// TIMING DEFAULTS
// ============================================================================

/// Backup polling interval - WebSocket catches most launches, this covers gaps
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Delay before reconnecting a dropped WebSocket subscription
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

/// Signatures fetched per polling cycle
pub const DEFAULT_POLL_SIGNATURE_LIMIT: usize = 5;

/// Timeout for JSON-RPC calls
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Timeout for the fee-split page fetch (the page is slow to render)
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 15;

/// Timeout for off-chain metadata document fetches
pub const DEFAULT_URI_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// EXTRACTION HEURISTICS
// ============================================================================

/// Characters of surrounding text inspected around a handle occurrence
pub const PROXIMITY_WINDOW_CHARS: usize = 300;

/// Royalty percentages above this ceiling are treated as page noise.
/// Site convention, not a protocol rule - configurable via ROYALTY_MAX_PERCENT.
pub const DEFAULT_ROYALTY_MAX_PERCENT: f64 = 50.0;

/// Link path segments that are never profile handles
pub const EXCLUDED_LINK_HANDLES: &[&str] = &["intent", "share", "home"];
