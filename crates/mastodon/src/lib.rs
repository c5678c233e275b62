//! Minimal Mastodon REST binding.
//!
//! Covers exactly the calls the relay makes — credential verification,
//! v2 search, status actions, account follow/unfollow, and the user
//! notification stream. Not a general-purpose client library.

pub mod client;
pub mod entities;
pub mod error;
pub mod streaming;

pub use {
    client::{Client, Credentials},
    entities::{Account, Notification, NotificationKind, SearchResults, Status},
    error::{Error, Result},
    streaming::StreamEvent,
};
