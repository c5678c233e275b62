//! Serde views of the Mastodon entities the relay consumes.
//!
//! Only the fields actually read are declared; everything else in the API
//! payloads is ignored on deserialization.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    /// Webfinger-style handle, without the leading `@`. Local accounts
    /// carry no domain part.
    pub acct: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    /// HTML permalink; absent for some remote statuses, where `uri` (the
    /// federation identifier) still applies.
    #[serde(default)]
    pub url: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub content: String,
    pub account: Account,
}

impl Status {
    /// Best link to hand to humans: the permalink, or the URI as fallback.
    #[must_use]
    pub fn link(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.uri)
    }
}

/// Result set of `GET /api/v2/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub statuses: Vec<Status>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Mention,
    Favourite,
    Reblog,
    Follow,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub account: Account,
    /// Present for mention/favourite/reblog notifications.
    #[serde(default)]
    pub status: Option<Status>,
}
