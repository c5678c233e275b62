use std::path::{Path, PathBuf};

use {secrecy::ExposeSecret, tootbridge_common::is_channel_name, tracing::debug};

use crate::{env_subst::substitute_env, schema::TootbridgeConfig};

/// Standard config file name.
const CONFIG_FILENAME: &str = "tootbridge.toml";

/// Load config from the given path.
pub fn load_config(path: &Path) -> anyhow::Result<TootbridgeConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tootbridge.toml` (project-local)
/// 2. `~/.config/tootbridge/tootbridge.toml` (user-global)
pub fn discover_and_load() -> anyhow::Result<TootbridgeConfig> {
    let path = find_config_file()
        .ok_or_else(|| anyhow::anyhow!("no {CONFIG_FILENAME} found (searched ./ and the user config dir)"))?;
    debug!(path = %path.display(), "loading config");
    load_config(&path)
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILENAME);
    if local.exists() {
        return Some(local);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "tootbridge") {
        let p = dirs.config_dir().join(CONFIG_FILENAME);
        if p.exists() {
            return Some(p);
        }
    }

    None
}

/// Reject configs that cannot possibly run: no server, no nickname, or an
/// enabled channel missing its Mastodon credentials.
pub fn validate(config: &TootbridgeConfig) -> anyhow::Result<()> {
    let mut problems = Vec::new();

    if config.irc.server.is_empty() {
        problems.push("irc.server is not set".to_string());
    }
    if config.irc.nickname.is_empty() {
        problems.push("irc.nickname is not set".to_string());
    }
    if config.irc.command_prefix.is_empty() {
        problems.push("irc.command_prefix must not be empty".to_string());
    }

    for (channel, cfg) in &config.channels {
        if !is_channel_name(channel) {
            problems.push(format!("channel {channel:?} is not a channel name"));
        }
        if cfg.bot_enabled || cfg.resolve || cfg.streaming {
            if cfg.access_token.expose_secret().is_empty() {
                problems.push(format!("channel {channel}: access_token is not set"));
            }
            if cfg.api_base_url.is_empty() {
                problems.push(format!("channel {channel}: api_base_url is not set"));
            }
        }
        if cfg.streaming && !cfg.bot_enabled {
            problems.push(format!(
                "channel {channel}: streaming requires bot_enabled"
            ));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("invalid config:\n  {}", problems.join("\n  ")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, std::io::Write};

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn load_valid_config() {
        let file = write_config(
            r##"
            [irc]
            server = "irc.example.org"
            nickname = "relay"

            [channels."#chat"]
            bot_enabled = true
            access_token = "tok"
            api_base_url = "https://mastodon.example"
            "##,
        );
        let cfg = load_config(file.path()).unwrap();
        assert!(validate(&cfg).is_ok());
        assert_eq!(cfg.channels.len(), 1);
    }

    #[test]
    fn unresolved_placeholder_stays_visible() {
        let file = write_config(
            r##"
            [irc]
            server = "irc.example.org"

            [channels."#chat"]
            access_token = "${TOOTBRIDGE_UNSET_TEST_VAR}"
            "##,
        );
        let cfg = load_config(file.path()).unwrap();
        let chan = cfg.channels.get("#chat").unwrap();
        assert_eq!(
            chan.access_token.expose_secret(),
            "${TOOTBRIDGE_UNSET_TEST_VAR}"
        );
    }

    #[test]
    fn validate_rejects_enabled_channel_without_credentials() {
        let file = write_config(
            r##"
            [irc]
            server = "irc.example.org"

            [channels."#chat"]
            bot_enabled = true
            "##,
        );
        let cfg = load_config(file.path()).unwrap();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("access_token"));
        assert!(err.contains("api_base_url"));
    }

    #[test]
    fn validate_rejects_missing_server() {
        let cfg = TootbridgeConfig::default();
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn validate_accepts_every_channel_prefix() {
        let file = write_config(
            r##"
            [irc]
            server = "irc.example.org"

            [channels."+modeless"]
            bot_enabled = true
            access_token = "tok"
            api_base_url = "https://mastodon.example"

            [channels."!00000safe"]
            bot_enabled = true
            access_token = "tok"
            api_base_url = "https://mastodon.example"
            "##,
        );
        let cfg = load_config(file.path()).unwrap();
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn validate_rejects_non_channel_key() {
        let file = write_config(
            r##"
            [irc]
            server = "irc.example.org"

            [channels."alice"]
            bot_enabled = false
            "##,
        );
        let cfg = load_config(file.path()).unwrap();
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("not a channel name"));
    }

    #[test]
    fn missing_file_errors() {
        assert!(load_config(Path::new("/nonexistent/tootbridge.toml")).is_err());
    }
}
