//! Fee-split source: scrapes the per-token page for creator and
//! fee-recipient handles plus the royalty percentage.
//!
//! The page has no stable schema, so extraction is a fixed rule table
//! over the raw markup: collect profile links, then classify each handle
//! by the anchor phrases found in a symmetric window around its
//! occurrences. No positional guessing - a role with no phrase-anchored
//! match stays absent.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use std::time::Duration;

use super::{FetchError, MetadataSource};
use crate::constants::EXCLUDED_LINK_HANDLES;
use crate::global::is_debug_metadata_enabled;
use crate::logger::{log, LogTag};
use crate::tokens::types::PartialTokenMetadata;
use crate::utils::{clean_twitter_handle, truncate_address};

/// Profile links on the page, `twitter.com/<handle>` or `x.com/<handle>`
static PROFILE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:twitter\.com|x\.com)/([A-Za-z0-9_]{1,30})").unwrap());

/// Percent tokens in the visible text, integer or fractional
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)%").unwrap());

/// Anchor phrases, checked in order against the lowercased window
const CREATOR_PHRASE: &str = "created by";
const FEE_PHRASES: &[&str] = &["royalties to", "earns 100%"];
const CREATOR_ALT_PHRASE: &str = "earns 0%";

/// Extracted fee-split facts, all optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeeSplit {
    pub creator: Option<String>,
    pub fee_recipient: Option<String>,
    pub royalty_percent: Option<f64>,
}

pub struct FeePageSource {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    window: usize,
    royalty_ceiling: f64,
}

impl FeePageSource {
    pub fn new(base_url: String, timeout: Duration, window: usize, royalty_ceiling: f64) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
            window,
            royalty_ceiling,
        }
    }

    async fn fetch_page(&self, mint: &str) -> Result<String, FetchError> {
        let url = format!("{}/{}", self.base_url, mint);

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

        response
            .text()
            .await
            .map_err(|e| FetchError::NetworkError(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl MetadataSource for FeePageSource {
    fn name(&self) -> &'static str {
        "fee-page"
    }

    async fn fetch(&self, mint: &str) -> Result<PartialTokenMetadata, FetchError> {
        let markup = self.fetch_page(mint).await?;
        let split = extract_fee_split(&markup, self.window, self.royalty_ceiling);

        if is_debug_metadata_enabled() {
            log(
                LogTag::Metadata,
                "FEE_SPLIT",
                &format!(
                    "💰 {}: creator={:?} fee={:?} royalty={:?}",
                    truncate_address(mint),
                    split.creator,
                    split.fee_recipient,
                    split.royalty_percent
                ),
            );
        }

        let mut record = PartialTokenMetadata {
            creator_handle: split.creator.map(|h| clean_twitter_handle(&h)),
            fee_recipient_handle: split.fee_recipient.map(|h| clean_twitter_handle(&h)),
            ..PartialTokenMetadata::default()
        };
        if let Some(percent) = split.royalty_percent {
            record.set_royalty(percent);
        }
        Ok(record)
    }
}

/// Run the rule table over raw page markup.
///
/// For every profile link, every occurrence of its handle is inspected
/// inside a ±`window` character slice. The first phrase-anchored match
/// wins per role; one link element assigns at most one role, so a handle
/// only ends up in both roles when it is linked more than once.
pub fn extract_fee_split(markup: &str, window: usize, royalty_ceiling: f64) -> FeeSplit {
    let haystack = markup.to_lowercase();
    let mut split = FeeSplit::default();

    for capture in PROFILE_LINK_RE.captures_iter(markup) {
        let handle = &capture[1];
        if EXCLUDED_LINK_HANDLES
            .iter()
            .any(|skip| handle.eq_ignore_ascii_case(skip))
        {
            continue;
        }

        classify_handle(&haystack, handle, window, &mut split);

        if split.creator.is_some() && split.fee_recipient.is_some() {
            break;
        }
    }

    split.royalty_percent = scan_royalty_percent(markup, royalty_ceiling);
    split
}

/// Assign `handle` to the first unfilled role whose anchor phrase appears
/// near one of its occurrences. Stops at the first assignment.
fn classify_handle(haystack: &str, handle: &str, window: usize, split: &mut FeeSplit) {
    let needle = handle.to_lowercase();
    let mut search_from = 0;

    while let Some(found) = haystack[search_from..].find(&needle) {
        let pos = search_from + found;
        let context = window_slice(haystack, pos, needle.len(), window);

        if split.creator.is_none() && context.contains(CREATOR_PHRASE) {
            split.creator = Some(handle.to_string());
            return;
        }
        if split.fee_recipient.is_none()
            && FEE_PHRASES.iter().any(|phrase| context.contains(phrase))
        {
            split.fee_recipient = Some(handle.to_string());
            return;
        }
        if split.creator.is_none() && context.contains(CREATOR_ALT_PHRASE) {
            split.creator = Some(handle.to_string());
            return;
        }

        search_from = pos + 1;
    }
}

/// Symmetric window around an occurrence, clamped to char boundaries
fn window_slice(text: &str, pos: usize, match_len: usize, window: usize) -> &str {
    let start = floor_char_boundary(text, pos.saturating_sub(window));
    let end = ceil_char_boundary(text, (pos + match_len + window).min(text.len()));
    &text[start..end]
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// First percent token strictly within (0, ceiling]. Values above the
/// ceiling are page noise by site convention - logged, then skipped
/// rather than silently swallowed, since the ceiling is a heuristic.
fn scan_royalty_percent(markup: &str, ceiling: f64) -> Option<f64> {
    for capture in PERCENT_RE.captures_iter(markup) {
        let Ok(percent) = capture[1].parse::<f64>() else {
            continue;
        };
        if percent > 0.0 && percent <= ceiling {
            return Some(percent);
        }
        if percent > ceiling && is_debug_metadata_enabled() {
            log(
                LogTag::Metadata,
                "ROYALTY_SKIP",
                &format!("Percent {}% above ceiling {}%, treating as noise", percent, ceiling),
            );
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_ROYALTY_MAX_PERCENT, PROXIMITY_WINDOW_CHARS};

    fn extract(markup: &str) -> FeeSplit {
        extract_fee_split(markup, PROXIMITY_WINDOW_CHARS, DEFAULT_ROYALTY_MAX_PERCENT)
    }

    /// Filler wider than the proximity window, so fixture sections only
    /// see their own anchor phrases
    fn pad() -> String {
        "x".repeat(2 * PROXIMITY_WINDOW_CHARS)
    }

    #[test]
    fn classifies_roles_by_anchor_phrases() {
        let markup = format!(
            r#"<a href="https://x.com/alice">p</a><a href="https://x.com/bob">p</a>
            {pad}<div>Created by ALICE yesterday</div>
            {pad}<div>Royalties to BOB forever</div>"#,
            pad = pad()
        );
        let split = extract(&markup);
        assert_eq!(split.creator.as_deref(), Some("alice"));
        assert_eq!(split.fee_recipient.as_deref(), Some("bob"));
    }

    #[test]
    fn classification_ignores_link_order() {
        // Same anchors, link elements reversed in the DOM
        let markup = format!(
            r#"<a href="https://x.com/bob">p</a><a href="https://x.com/alice">p</a>
            {pad}<div>created by alice</div>
            {pad}<div>royalties to bob</div>"#,
            pad = pad()
        );
        let split = extract(&markup);
        assert_eq!(split.creator.as_deref(), Some("alice"));
        assert_eq!(split.fee_recipient.as_deref(), Some("bob"));
    }

    #[test]
    fn earns_phrases_classify_inversely() {
        let markup = format!(
            r#"<a href="https://twitter.com/carol">c</a><a href="https://twitter.com/dave">d</a>
            {pad}<p>carol earns 0% of fees</p>
            {pad}<p>dave earns 100% of fees</p>"#,
            pad = pad()
        );
        let split = extract(&markup);
        assert_eq!(split.creator.as_deref(), Some("carol"));
        assert_eq!(split.fee_recipient.as_deref(), Some("dave"));
    }

    #[test]
    fn unanchored_handles_stay_absent() {
        // No anchor phrase anywhere: no positional guessing
        let markup = r#"
            <a href="https://x.com/alice">a</a>
            <a href="https://x.com/bob">b</a>
            <div>alice and bob are here</div>
        "#;
        let split = extract(markup);
        assert!(split.creator.is_none());
        assert!(split.fee_recipient.is_none());
    }

    #[test]
    fn phrase_outside_window_does_not_match() {
        // The phrase sits farther than the window from every occurrence
        // of the handle, including the link href itself
        let markup = format!(
            r#"<a href="https://x.com/alice">a</a>{pad}created by{pad}alice"#,
            pad = pad()
        );
        let split = extract(&markup);
        assert!(split.creator.is_none());
    }

    #[test]
    fn same_handle_can_fill_both_roles_when_linked_twice() {
        let markup = r#"
            <a href="https://x.com/alice">a</a>
            <a href="https://x.com/alice">a</a>
            <p>created by alice, royalties to alice</p>
        "#;
        let split = extract(markup);
        assert_eq!(split.creator.as_deref(), Some("alice"));
        assert_eq!(split.fee_recipient.as_deref(), Some("alice"));
    }

    #[test]
    fn intent_and_share_links_are_skipped() {
        let markup = r#"
            <a href="https://twitter.com/intent">tweet</a>
            <a href="https://twitter.com/share">share</a>
            <a href="https://x.com/alice">a</a>
            <p>created by alice</p>
        "#;
        let split = extract(markup);
        assert_eq!(split.creator.as_deref(), Some("alice"));
    }

    #[test]
    fn royalty_takes_first_value_inside_ceiling() {
        let markup = "fees are 0% then 75% then 12.5% then 30%";
        let split = extract(markup);
        assert_eq!(split.royalty_percent, Some(12.5));
    }

    #[test]
    fn royalty_absent_when_every_percent_is_noise() {
        let split = extract("supply 100% and 0% burned");
        assert!(split.royalty_percent.is_none());
    }

    #[test]
    fn window_slicing_survives_multibyte_text() {
        let markup = format!(
            "{}<a href=\"https://x.com/alice\">a</a> created by alice",
            "é".repeat(200)
        );
        let split = extract(&markup);
        assert_eq!(split.creator.as_deref(), Some("alice"));
    }
}
