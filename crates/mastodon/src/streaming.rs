//! Server-sent-events binding for `/api/v1/streaming/user`.
//!
//! The streaming endpoint delivers `event:`/`data:` framed payloads with
//! `:`-prefixed heartbeat comments in between. Only the event types the
//! relay reacts to are surfaced; everything else is skipped.

use {
    async_stream::try_stream,
    futures::{Stream, StreamExt},
};

use crate::{
    client::{Client, api_error},
    entities::{Notification, Status},
    error::{Error, Result},
};

/// A parsed event from the user stream.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Notification(Notification),
    Update(Status),
    /// A status was deleted; payload is its id.
    Delete(String),
}

impl Client {
    /// Open the account's user stream and yield parsed events until the
    /// connection drops. No reconnect here; the caller owns that policy.
    pub fn stream_user(&self) -> impl Stream<Item = Result<StreamEvent>> + Send + use<> {
        // Built eagerly so the stream owns the request and stays 'static.
        let request = self.get("/api/v1/streaming/user");

        try_stream! {
            let response = request.send().await.map_err(Error::Http)?;
            let status = response.status();
            if !status.is_success() {
                Err(api_error(status, response).await)?;
                return;
            }

            let mut body = response.bytes_stream();
            let mut pending = String::new();
            let mut event_name = String::new();
            let mut data = String::new();

            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(Error::Http)?;
                pending.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline) = pending.find('\n') {
                    let line = pending[..newline].trim_end_matches('\r').to_string();
                    pending.drain(..=newline);

                    if line.is_empty() {
                        // Frame boundary.
                        if let Some(event) = parse_event(&event_name, &data)? {
                            yield event;
                        }
                        event_name.clear();
                        data.clear();
                    } else if line.starts_with(':') {
                        // Heartbeat comment (":thump").
                    } else if let Some(rest) = line.strip_prefix("event:") {
                        event_name = rest.trim().to_string();
                    } else if let Some(rest) = line.strip_prefix("data:") {
                        if !data.is_empty() {
                            data.push('\n');
                        }
                        data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
                    }
                }
            }
        }
    }
}

fn parse_event(event: &str, data: &str) -> Result<Option<StreamEvent>> {
    match event {
        "notification" => serde_json::from_str(data)
            .map(|n| Some(StreamEvent::Notification(n)))
            .map_err(|e| Error::Stream(format!("bad notification payload: {e}"))),
        "update" => serde_json::from_str(data)
            .map(|s| Some(StreamEvent::Update(s)))
            .map_err(|e| Error::Stream(format!("bad update payload: {e}"))),
        "delete" => Ok(Some(StreamEvent::Delete(data.trim().to_string()))),
        // Unframed data or event types we don't handle (filters_changed, ...).
        _ => Ok(None),
    }
}
