use std::time::Duration;
use tokio::sync::Notify;

/// Characters Telegram MarkdownV2 treats as markup and requires escaped
const MARKDOWN_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// URL prefixes stripped from raw Twitter/X handle values
const HANDLE_URL_PREFIXES: &[&str] = &[
    "https://www.x.com/",
    "https://www.twitter.com/",
    "https://x.com/",
    "https://twitter.com/",
    "http://www.x.com/",
    "http://www.twitter.com/",
    "http://x.com/",
    "http://twitter.com/",
    "www.x.com/",
    "www.twitter.com/",
    "x.com/",
    "twitter.com/",
];

/// Clean a Twitter/X handle removing prefixes, URLs, and path suffixes.
///
/// Never fails: unresolvable input yields an empty string. Idempotent on
/// already-bare handles.
pub fn clean_twitter_handle(handle: &str) -> String {
    if handle.is_empty() {
        return String::new();
    }

    let mut cleaned = handle.trim().trim_start_matches('@').to_string();

    for prefix in HANDLE_URL_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.to_string();
            break;
        }
    }

    // Drop status-URL suffixes and any other path components
    if let Some(idx) = cleaned.find('/') {
        cleaned.truncate(idx);
    }

    cleaned.trim().to_string()
}

/// Escape special characters for Telegram MarkdownV2.
///
/// Not idempotent: escaping already-escaped text double-escapes it, so
/// callers must escape exactly once.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Truncate a mint/wallet address for display
pub fn truncate_address(address: &str) -> String {
    if address.len() > 12 {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}

/// Waits for a delay or shutdown signal. Returns true if shutdown was signaled.
pub async fn check_shutdown_or_delay(shutdown: &Notify, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.notified() => true,
    }
}

/// Waits for a delay or shutdown signal, whichever comes first.
pub async fn delay_with_shutdown(shutdown: &Notify, duration: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(duration) => {},
        _ = shutdown.notified() => {},
    }
}
