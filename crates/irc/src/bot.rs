//! IRC connection loop.
//!
//! Connects with the `irc` crate, joins every configured channel, and routes
//! incoming PRIVMSGs: prefixed lines go to command dispatch, everything else
//! to passive resolution. Handler errors are logged per message; they never
//! tear down the connection.

use {
    futures::StreamExt,
    irc::{
        client::{Client, Sender, prelude::Config as IrcClientConfig},
        proto::{Command, Message},
    },
    secrecy::ExposeSecret,
    tracing::{error, info},
};

use {tootbridge_common::is_channel_name, tootbridge_config::TootbridgeConfig};

use crate::{commands, handlers, resolve, stream};

/// Connect and run until the connection closes.
pub async fn run(config: TootbridgeConfig) -> anyhow::Result<()> {
    let mut client = Client::from_config(irc_config(&config)).await?;
    client.identify()?;
    info!(
        server = config.irc.server,
        nick = config.irc.nickname,
        channels = config.channels.len(),
        "connected to IRC"
    );

    let sender = client.sender();
    let announcers = stream::spawn_announcers(&config, sender.clone());

    let mut messages = client.stream()?;
    while let Some(message) = messages.next().await.transpose()? {
        if let Err(e) = handle_message(&config, &sender, &message).await {
            error!(error = %e, "error handling IRC message");
        }
    }

    announcers.cancel();
    Ok(())
}

fn irc_config(config: &TootbridgeConfig) -> IrcClientConfig {
    IrcClientConfig {
        server: Some(config.irc.server.clone()),
        port: Some(config.irc.port),
        use_tls: Some(config.irc.use_tls),
        nickname: Some(config.irc.nickname.clone()),
        username: config.irc.username.clone(),
        realname: config.irc.realname.clone(),
        password: config
            .irc
            .password
            .as_ref()
            .map(|p| p.expose_secret().clone()),
        channels: config.channels.keys().cloned().collect(),
        ..IrcClientConfig::default()
    }
}

async fn handle_message(
    config: &TootbridgeConfig,
    sender: &Sender,
    message: &Message,
) -> anyhow::Result<()> {
    let Command::PRIVMSG(ref target, ref text) = message.command else {
        return Ok(());
    };
    // Commands are channel-only; direct messages to the bot are ignored.
    if !is_channel_name(target) {
        return Ok(());
    }

    let chan_cfg = config.channels.get(target).cloned().unwrap_or_default();

    let (text, is_action) = match classify_ctcp(text) {
        CtcpKind::Plain => (text.as_str(), false),
        CtcpKind::Action(inner) => (inner, true),
        CtcpKind::Other => return Ok(()),
    };

    if !is_action && let Some(parsed) = commands::parse(&config.irc.command_prefix, text) {
        let nick = message.source_nickname().unwrap_or_default();
        for line in handlers::handle_command(&chan_cfg, parsed).await {
            sender.send_privmsg(target, format!("{nick}: {line}"))?;
        }
        return Ok(());
    }

    if chan_cfg.resolve && resolve::should_scan(text) {
        for line in resolve::announce(&chan_cfg, text).await {
            sender.send_notice(target, line)?;
        }
    }

    Ok(())
}

enum CtcpKind<'a> {
    /// Not a CTCP message.
    Plain,
    /// `\x01ACTION …\x01` — treated as chatter, scanned but never a command.
    Action(&'a str),
    /// Any other CTCP (VERSION, PING, …); ignored entirely.
    Other,
}

fn classify_ctcp(text: &str) -> CtcpKind<'_> {
    let Some(inner) = text.strip_prefix('\u{1}') else {
        return CtcpKind::Plain;
    };
    let inner = inner.strip_suffix('\u{1}').unwrap_or(inner);
    match inner.strip_prefix("ACTION ") {
        Some(action) => CtcpKind::Action(action),
        None => CtcpKind::Other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn ctcp_classification() {
        assert!(matches!(classify_ctcp("hallo"), CtcpKind::Plain));
        assert!(matches!(
            classify_ctcp("\u{1}VERSION\u{1}"),
            CtcpKind::Other
        ));
        match classify_ctcp("\u{1}ACTION zeigt auf @alice\u{1}") {
            CtcpKind::Action(inner) => assert_eq!(inner, "zeigt auf @alice"),
            _ => panic!("expected action"),
        }
    }

    #[test]
    fn irc_config_maps_connection_settings() {
        let mut config = TootbridgeConfig::default();
        config.irc.server = "irc.example.org".into();
        config.irc.port = 6667;
        config.irc.use_tls = false;
        config
            .channels
            .insert("#chat".into(), tootbridge_config::ChannelConfig::default());

        let irc_cfg = irc_config(&config);
        assert_eq!(irc_cfg.server.as_deref(), Some("irc.example.org"));
        assert_eq!(irc_cfg.port, Some(6667));
        assert_eq!(irc_cfg.use_tls, Some(false));
        assert_eq!(irc_cfg.channels, vec!["#chat".to_string()]);
    }
}
