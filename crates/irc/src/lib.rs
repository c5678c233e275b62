//! IRC side of the relay: connection loop, command dispatch, passive toot
//! resolution, and the streaming mention announcer.

pub mod bot;
pub mod commands;
pub mod handlers;
pub mod resolve;
pub mod stream;
pub mod strings;

/// Mastodon's status length limit, in characters.
pub const TOOT_MAX_CHARS: usize = 500;

/// Budget for a single relayed NOTICE line, in bytes. Kept well under the
/// 512-byte IRC frame so the server-added prefix and CRLF always fit.
pub const NOTICE_MAX_LEN: usize = 400;
