use std::collections::BTreeMap;

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Top-level config: one IRC connection, one Mastodon account per channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TootbridgeConfig {
    pub irc: IrcConfig,

    /// Keyed by channel name, including the leading `#`.
    pub channels: BTreeMap<String, ChannelConfig>,
}

/// IRC connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IrcConfig {
    pub server: String,
    pub port: u16,
    pub use_tls: bool,
    pub nickname: String,

    /// Ident username; defaults to the nickname when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,

    /// Server password (PASS), rarely needed outside bouncers.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_secret"
    )]
    pub password: Option<Secret<String>>,

    /// Prefix that marks a channel message as a bot command.
    pub command_prefix: String,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: 6697,
            use_tls: true,
            nickname: "tootbridge".into(),
            username: None,
            realname: None,
            password: None,
            command_prefix: "!".into(),
        }
    }
}

/// Per-channel Mastodon account configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Master switch; every command on a disabled channel is refused.
    pub bot_enabled: bool,

    /// OAuth application ID, kept for token reissue tooling.
    pub client_id: String,

    #[serde(serialize_with = "serialize_secret")]
    pub client_secret: Secret<String>,

    #[serde(serialize_with = "serialize_secret")]
    pub access_token: Secret<String>,

    /// Instance base URL, e.g. `https://mastodon.example`.
    pub api_base_url: String,

    /// Passively resolve toot links seen in channel chatter.
    pub resolve: bool,

    /// Announce mentions from the account's streaming API.
    pub streaming: bool,
}

impl std::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("bot_enabled", &self.bot_enabled)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("access_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("resolve", &self.resolve)
            .field("streaming", &self.streaming)
            .finish()
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            bot_enabled: false,
            client_id: String::new(),
            client_secret: Secret::new(String::new()),
            access_token: Secret::new(String::new()),
            api_base_url: String::new(),
            resolve: false,
            streaming: false,
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_opt_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}
