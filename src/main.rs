use bagwatch::{
    config::Config,
    global,
    logger::{log, LogTag},
    rpc::mask_endpoint,
    run,
    utils::truncate_address,
};

/// Main entry point for BagWatch.
///
/// The watcher always runs; the only special mode is `--help`.
/// Per-module diagnostics are enabled with `--debug-<module>` flags
/// (websocket, polling, detector, rpc, metadata, pipeline).
#[tokio::main]
async fn main() {
    if global::is_help_requested() {
        print_help();
        return;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log(LogTag::System, "ERROR", &format!("Invalid configuration: {:#}", e));
            std::process::exit(1);
        }
    };

    log(
        LogTag::System,
        "START",
        &format!(
            "🚀 BagWatch starting up at {}...",
            global::STARTUP_TIME.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    );
    log(
        LogTag::System,
        "CONFIG",
        &format!(
            "Watching authority {} via {} (poll every {}s)",
            truncate_address(&config.tracked_authority),
            mask_endpoint(&config.rpc_url),
            config.poll_interval_secs
        ),
    );

    if let Err(e) = run::run(config).await {
        log(LogTag::System, "ERROR", &format!("Fatal error: {}", e));
        std::process::exit(1);
    }
}

fn print_help() {
    println!("BagWatch - Bags launchpad launch watcher");
    println!();
    println!("USAGE:");
    println!("    bagwatch [--debug-<module>]");
    println!();
    println!("CONFIGURATION (environment variables):");
    println!("    TRACKED_AUTHORITY      update authority to watch (default: Bags)");
    println!("    RPC_URL                JSON-RPC endpoint");
    println!("    WS_URL                 WebSocket endpoint");
    println!("    HELIUS_API_KEY         expands both endpoints to Helius");
    println!("    POLL_INTERVAL_SECS     backup polling interval (default 30)");
    println!("    RECONNECT_DELAY_SECS   WebSocket reconnect delay (default 5)");
    println!("    POLL_SIGNATURE_LIMIT   signatures per polling cycle (default 5)");
    println!("    RPC_TIMEOUT_SECS       per-RPC-call timeout (default 10)");
    println!("    PAGE_TIMEOUT_SECS      fee page fetch timeout (default 15)");
    println!("    URI_TIMEOUT_SECS       metadata document timeout (default 5)");
    println!("    ROYALTY_MAX_PERCENT    royalty noise ceiling (default 50)");
    println!();
    println!("DEBUG FLAGS:");
    println!("    --debug-websocket --debug-polling --debug-detector");
    println!("    --debug-rpc --debug-metadata --debug-pipeline");
}
