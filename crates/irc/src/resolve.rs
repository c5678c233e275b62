//! Passive toot resolution for channel chatter.
//!
//! Channels with `resolve` enabled get linked toots echoed back as NOTICEs:
//! a message mentioning "notice" or "@" is scanned for URLs, the first one
//! is resolved through the instance's search, and the status content is
//! stripped, sanitized, and wrapped for IRC.

use std::sync::LazyLock;

use {regex::Regex, tracing::debug};

use {
    tootbridge_common::text::{sanitize_irc, strip_html, wrap_lines},
    tootbridge_config::ChannelConfig,
    tootbridge_mastodon::Status,
};

use crate::{NOTICE_MAX_LEN, handlers, strings};

static URL_RE: LazyLock<Regex> = LazyLock::new(url_regex);

#[allow(clippy::expect_used)]
fn url_regex() -> Regex {
    Regex::new(r"https?://[^\s>]+").expect("static regex")
}

/// Cheap pre-filter: only messages mentioning "notice" or "@" are scanned.
#[must_use]
pub fn should_scan(text: &str) -> bool {
    text.contains("notice") || text.contains('@')
}

/// First URL in the message, if any.
#[must_use]
pub fn extract_url(text: &str) -> Option<&str> {
    URL_RE.find(text).map(|m| m.as_str())
}

/// NOTICE lines announcing a resolved status.
#[must_use]
pub fn announcement_lines(status: &Status) -> Vec<String> {
    let text = strip_html(&status.content);
    let message = sanitize_irc(&strings::toot_announcement(&status.account.acct, &text));
    wrap_lines(&message, NOTICE_MAX_LEN)
}

/// Scan a channel message and produce the NOTICE lines for it, if any.
/// Resolution failures are logged and otherwise silent; chatter must never
/// draw error replies.
pub async fn announce(cfg: &ChannelConfig, text: &str) -> Vec<String> {
    let Some(url) = extract_url(text) else {
        return Vec::new();
    };

    let client = match handlers::api_client(cfg) {
        Ok(client) => client,
        Err(e) => {
            debug!(error = %e, "mastodon client for resolve");
            return Vec::new();
        },
    };

    match client.resolve_status(url).await {
        Ok(Some(status)) => announcement_lines(&status),
        Ok(None) => Vec::new(),
        Err(e) => {
            debug!(url, error = %e, "toot resolution failed");
            Vec::new()
        },
    }
}
