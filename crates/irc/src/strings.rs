//! User-facing reply texts, kept in the bot's original German in one place.

pub const NO_ACCOUNT: &str = "Dieser Kanal hat keinen Mastodon Account.";
pub const FAILED: &str = "Das hat nicht geklappt.";
pub const OK: &str = "Alles klar.";
pub const NEED_TOOT: &str =
    "Du musst mir schon einen Toot geben, auf den sich der Unsinn beziehen soll.";

#[must_use]
pub fn usage(usage: &str) -> String {
    format!("Benutzung: {usage}")
}

#[must_use]
pub fn toot_announcement(acct: &str, text: &str) -> String {
    format!("Toot von @{acct}: {text}")
}
