//! Configuration for the relay: IRC connection settings plus a Mastodon
//! account per channel, loaded from TOML with `${ENV}` substitution.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config, validate},
    schema::{ChannelConfig, IrcConfig, TootbridgeConfig},
};
