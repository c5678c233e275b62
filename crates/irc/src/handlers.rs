//! Command handlers.
//!
//! Each handler builds a short-lived Mastodon client from the channel's
//! credentials, makes exactly one round of delegated calls, and reduces the
//! outcome to the reply lines for the channel. External failures are logged
//! with the command name and answered with the generic failure text; there
//! are no retries.

use tracing::error;

use {
    tootbridge_common::text::ellipsize,
    tootbridge_config::ChannelConfig,
    tootbridge_mastodon::{Client, Credentials, Error, Status},
};

use crate::{
    TOOT_MAX_CHARS,
    commands::{Command, Parsed},
    strings,
};

/// Build the per-invocation API client for a channel.
pub fn api_client(cfg: &ChannelConfig) -> Result<Client, Error> {
    Client::new(&Credentials {
        client_id: cfg.client_id.clone(),
        client_secret: cfg.client_secret.clone(),
        access_token: cfg.access_token.clone(),
        api_base_url: cfg.api_base_url.clone(),
    })
}

/// Run one parsed command against a channel's account and return the reply
/// lines. Gating comes first: disabled channels refuse every command.
pub async fn handle_command(cfg: &ChannelConfig, parsed: Parsed<'_>) -> Vec<String> {
    let command = match parsed {
        Parsed::Usage(usage) => return vec![strings::usage(usage)],
        Parsed::Command(command) => command,
    };

    if !cfg.bot_enabled {
        return vec![strings::NO_ACCOUNT.to_string()];
    }

    let client = match api_client(cfg) {
        Ok(client) => client,
        Err(e) => return failed("client", &e),
    };

    match command {
        Command::Mastodon => match client.verify_credentials().await {
            Ok(account) => vec![account.url],
            Err(e) => failed("mastodon", &e),
        },
        Command::Toot(text) => post(&client, text, None).await,
        Command::Reply { toot, text } => match client.resolve_status(toot).await {
            Ok(Some(status)) => post(&client, text, Some(&status)).await,
            Ok(None) => vec![strings::NEED_TOOT.to_string()],
            Err(e) => failed("reply", &e),
        },
        Command::Fav(toot) => status_action(&client, toot, StatusAction::Fav).await,
        Command::Boost(toot) => status_action(&client, toot, StatusAction::Boost).await,
        Command::Delete(toot) => status_action(&client, toot, StatusAction::Delete).await,
        Command::Follow(user) => account_action(&client, user, false).await,
        Command::Unfollow(user) => account_action(&client, user, true).await,
    }
}

/// Post a status, optionally as a reply. Replies get the conventional
/// leading mention; the whole message is truncated to the platform limit.
async fn post(client: &Client, text: &str, reply_to: Option<&Status>) -> Vec<String> {
    let message = match reply_to {
        Some(status) => ellipsize(&format!("@{} {text}", status.account.acct), TOOT_MAX_CHARS),
        None => ellipsize(text, TOOT_MAX_CHARS),
    };
    match client
        .post_status(&message, reply_to.map(|s| s.id.as_str()))
        .await
    {
        Ok(status) => vec![status.link().to_string()],
        Err(e) => failed("toot", &e),
    }
}

#[derive(Clone, Copy)]
enum StatusAction {
    Fav,
    Boost,
    Delete,
}

impl StatusAction {
    fn name(self) -> &'static str {
        match self {
            Self::Fav => "fav",
            Self::Boost => "boost",
            Self::Delete => "delete",
        }
    }
}

/// Resolve a toot URL and apply one of the per-status actions. An
/// unresolvable target stays silent, matching the bot's historic behavior.
async fn status_action(client: &Client, toot: &str, action: StatusAction) -> Vec<String> {
    let status = match client.resolve_status(toot).await {
        Ok(Some(status)) => status,
        Ok(None) => return Vec::new(),
        Err(e) => return failed(action.name(), &e),
    };

    let result = match action {
        StatusAction::Fav => client.favourite(&status.id).await.map(|_| ()),
        StatusAction::Boost => client.reblog(&status.id).await.map(|_| ()),
        StatusAction::Delete => client.delete_status(&status.id).await,
    };

    match result {
        Ok(()) => vec![strings::OK.to_string()],
        Err(e) => failed(action.name(), &e),
    }
}

/// Follow or unfollow the first account matching the given URI/handle.
/// No hits means no action and no reply, as with unresolvable toots.
async fn account_action(client: &Client, user: &str, unfollow: bool) -> Vec<String> {
    let name = if unfollow { "unfollow" } else { "follow" };
    let accounts = match client.search_accounts(user, unfollow).await {
        Ok(accounts) => accounts,
        Err(e) => return failed(name, &e),
    };
    let Some(account) = accounts.first() else {
        return Vec::new();
    };

    let result = if unfollow {
        client.unfollow(&account.id).await
    } else {
        client.follow(&account.id).await
    };

    match result {
        Ok(()) => vec![strings::OK.to_string()],
        Err(e) => failed(name, &e),
    }
}

fn failed(command: &str, error: &Error) -> Vec<String> {
    error!(command, error = %error, "mastodon call failed");
    vec![strings::FAILED.to_string()]
}
