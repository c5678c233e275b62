//! Background mention announcer fed by the Mastodon streaming API.
//!
//! One task per streaming-enabled channel holds the account's user stream
//! open and echoes incoming mentions into the channel as NOTICEs. A dropped
//! stream is reconnected after a fixed delay; shutdown goes through a
//! `CancellationToken` shared by all announcer tasks.

use std::time::Duration;

use {
    futures::StreamExt,
    irc::client::Sender,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info, warn},
};

use {
    tootbridge_config::{ChannelConfig, TootbridgeConfig},
    tootbridge_mastodon::{NotificationKind, StreamEvent},
};

use crate::{handlers, resolve};

const RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// Where announcer output goes. The IRC [`Sender`] is the production
/// implementation; tests substitute a recording sink.
pub trait NoticeSink: Send + Sync + 'static {
    fn notice(&self, channel: &str, line: &str) -> anyhow::Result<()>;
}

impl NoticeSink for Sender {
    fn notice(&self, channel: &str, line: &str) -> anyhow::Result<()> {
        Ok(self.send_notice(channel, line)?)
    }
}

/// A channel gets an announcer only when both switches are on.
fn wants_announcer(cfg: &ChannelConfig) -> bool {
    cfg.bot_enabled && cfg.streaming
}

/// Spawn one announcer task per channel with `bot_enabled && streaming`.
/// Returns the token that cancels all of them.
pub fn spawn_announcers(config: &TootbridgeConfig, sender: Sender) -> CancellationToken {
    let cancel = CancellationToken::new();

    for (channel, cfg) in &config.channels {
        if !wants_announcer(cfg) {
            continue;
        }
        info!(channel, "starting mention announcer");
        tokio::spawn(run_announcer(
            channel.clone(),
            cfg.clone(),
            sender.clone(),
            cancel.clone(),
        ));
    }

    cancel
}

async fn run_announcer<S: NoticeSink>(
    channel: String,
    cfg: ChannelConfig,
    sink: S,
    cancel: CancellationToken,
) {
    let client = match handlers::api_client(&cfg) {
        Ok(client) => client,
        Err(e) => {
            warn!(channel, error = %e, "mention announcer cannot start");
            return;
        },
    };

    loop {
        let stream = client.stream_user();
        tokio::pin!(stream);

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(channel, "mention announcer stopped");
                    return;
                },
                event = stream.next() => match event {
                    Some(Ok(StreamEvent::Notification(n)))
                        if n.kind == NotificationKind::Mention =>
                    {
                        let Some(status) = n.status else { continue };
                        debug!(channel, from = %status.account.acct, "announcing mention");
                        for line in resolve::announcement_lines(&status) {
                            if let Err(e) = sink.notice(&channel, &line) {
                                warn!(channel, error = %e, "failed to send notice");
                            }
                        }
                    },
                    Some(Ok(_)) => {},
                    Some(Err(e)) => {
                        warn!(channel, error = %e, "user stream error");
                        break;
                    },
                    None => {
                        debug!(channel, "user stream closed");
                        break;
                    },
                },
            }
        }

        if backoff_or_cancelled(&cancel).await {
            return;
        }
    }
}

/// Wait out the reconnect delay. Returns true when cancelled, which ends
/// the announcer instead of reconnecting.
async fn backoff_or_cancelled(cancel: &CancellationToken) -> bool {
    tokio::select! {
        () = cancel.cancelled() => true,
        () = tokio::time::sleep(RECONNECT_DELAY) => false,
    }
}
