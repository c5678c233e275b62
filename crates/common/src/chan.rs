//! IRC channel-name checks shared by config validation and message routing.

/// RFC 1459/2811 channel type prefixes.
const CHANNEL_PREFIXES: [char; 4] = ['#', '&', '+', '!'];

/// True when `target` names an IRC channel rather than a nick.
#[must_use]
pub fn is_channel_name(target: &str) -> bool {
    target.starts_with(CHANNEL_PREFIXES)
}
