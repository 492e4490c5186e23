use chrono::Local;
use colored::*;
use std::io::{self, Write};

/// Column width for the tag field
const TAG_WIDTH: usize = 10;

/// Column width for the log type field
const LOG_TYPE_WIDTH: usize = 14;

/// Log tags identify which subsystem produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTag {
    System,
    Websocket,
    Poller,
    Detector,
    Rpc,
    Metadata,
    Pipeline,
    Notify,
}

impl LogTag {
    /// Plain uppercase label for the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Websocket => "WS",
            LogTag::Poller => "POLLER",
            LogTag::Detector => "DETECTOR",
            LogTag::Rpc => "RPC",
            LogTag::Metadata => "METADATA",
            LogTag::Pipeline => "PIPELINE",
            LogTag::Notify => "NOTIFY",
        }
    }

    fn colored(&self) -> ColoredString {
        let label = format!("{:<width$}", self.as_str(), width = TAG_WIDTH);
        match self {
            LogTag::System => label.bright_yellow().bold(),
            LogTag::Websocket => label.bright_cyan().bold(),
            LogTag::Poller => label.bright_blue().bold(),
            LogTag::Detector => label.bright_white().bold(),
            LogTag::Rpc => label.bright_green().bold(),
            LogTag::Metadata => label.bright_magenta().bold(),
            LogTag::Pipeline => label.bright_yellow().bold(),
            LogTag::Notify => label.bright_green().bold(),
        }
    }
}

/// Color the log type by severity-ish keywords so errors stand out
fn format_log_type(log_type: &str) -> ColoredString {
    let label = format!("{:<width$}", log_type, width = LOG_TYPE_WIDTH);
    match log_type {
        "ERROR" | "FAILED" => label.bright_red().bold(),
        "WARN" | "RETRY" | "SKIP" => label.bright_yellow(),
        "SUCCESS" | "SUBSCRIBED" | "SENT" => label.bright_green(),
        _ => label.normal(),
    }
}

/// Write one formatted log line to stdout.
///
/// Debug-level call sites gate themselves with the `--debug-<module>`
/// predicates in `global.rs` before calling this; the logger itself
/// prints everything it is given.
pub fn log(tag: LogTag, log_type: &str, message: &str) {
    let time = Local::now().format("%H:%M:%S").to_string();
    println!(
        "{} [{}] [{}] {}",
        format!("[{}]", time).dimmed(),
        tag.colored(),
        format_log_type(log_type),
        message
    );
    let _ = io::stdout().flush();
}
