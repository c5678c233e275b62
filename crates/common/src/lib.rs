//! Shared utilities used across the tootbridge crates.

pub mod chan;
pub mod text;

pub use {
    chan::is_channel_name,
    text::{ellipsize, sanitize_irc, strip_html, wrap_lines},
};
