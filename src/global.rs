use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

// Startup timestamp, logged at boot and used for uptime reporting
pub static STARTUP_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

fn has_flag(flag: &str) -> bool {
    if let Ok(args) = CMD_ARGS.lock() {
        args.iter().any(|a| a == flag)
    } else {
        false
    }
}

/// Check if help output was requested via command line args
pub fn is_help_requested() -> bool {
    has_flag("--help") || has_flag("-h")
}

/// Check if debug websocket mode is enabled via command line args
pub fn is_debug_websocket_enabled() -> bool {
    has_flag("--debug-websocket")
}

/// Check if debug polling mode is enabled via command line args
pub fn is_debug_polling_enabled() -> bool {
    has_flag("--debug-polling")
}

/// Check if debug detector mode is enabled via command line args
pub fn is_debug_detector_enabled() -> bool {
    has_flag("--debug-detector")
}

/// Check if debug RPC mode is enabled via command line args
pub fn is_debug_rpc_enabled() -> bool {
    has_flag("--debug-rpc")
}

/// Check if debug metadata-sources mode is enabled via command line args
pub fn is_debug_metadata_enabled() -> bool {
    has_flag("--debug-metadata")
}

/// Check if debug pipeline mode is enabled via command line args
pub fn is_debug_pipeline_enabled() -> bool {
    has_flag("--debug-pipeline")
}
