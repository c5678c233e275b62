//! Text shaping helpers for relaying Mastodon content into IRC.
//!
//! Two hard limits drive everything here: Mastodon rejects statuses over
//! 500 characters, and a single IRC NOTICE line must stay well under the
//! 512-byte protocol frame, so relayed content is wrapped at 400 bytes.

/// Truncate `text` to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. The result never exceeds `max_chars` characters.
#[must_use]
pub fn ellipsize(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    let kept = out.trim_end().len();
    out.truncate(kept);
    out.push('…');
    out
}

/// Reduce an HTML fragment (a Mastodon status `content` field) to plain text:
/// tags dropped, entities decoded, all whitespace collapsed to single spaces.
#[must_use]
pub fn strip_html(content: &str) -> String {
    let mut text = String::with_capacity(content.len());
    let mut in_tag = false;
    for ch in content.chars() {
        match ch {
            '<' => {
                in_tag = true;
                // Block and break tags separate words; a space is collapsed
                // away later if it turns out to be redundant.
                text.push(' ');
            },
            '>' if in_tag => in_tag = false,
            c if !in_tag => text.push(c),
            _ => {},
        }
    }
    let decoded = decode_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode the named entities Mastodon emits plus numeric character
/// references. Unknown entities are passed through untouched.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        // Entity names are short; anything without a ';' nearby is a bare '&'.
        let semi = rest
            .char_indices()
            .take(12)
            .find(|&(_, c)| c == ';')
            .map(|(i, _)| i);
        match semi.and_then(|i| decode_entity(&rest[1..i]).map(|d| (i, d))) {
            Some((i, decoded)) => {
                out.push_str(&decoded);
                rest = &rest[i + 1..];
            },
            None => {
                out.push('&');
                rest = &rest[1..];
            },
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".into()),
        "lt" => Some("<".into()),
        "gt" => Some(">".into()),
        "quot" => Some("\"".into()),
        "apos" => Some("'".into()),
        "nbsp" => Some(" ".into()),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value).map(String::from)
        },
    }
}

/// Strip characters that would let relayed content inject IRC protocol
/// lines: CR/LF become spaces, NUL and the CTCP delimiter are dropped.
#[must_use]
pub fn sanitize_irc(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\r' | '\n' => Some(' '),
            '\0' | '\u{1}' => None,
            c => Some(c),
        })
        .collect()
}

/// Word-wrap `text` into lines of at most `max_len` bytes, splitting at
/// spaces where possible and hard-splitting (at a char boundary) otherwise.
#[must_use]
pub fn wrap_lines(text: &str, max_len: usize) -> Vec<String> {
    if max_len == 0 {
        return Vec::new();
    }

    let mut lines = Vec::new();
    let mut remaining = text.trim();

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            lines.push(remaining.to_string());
            break;
        }

        let mut window_end = remaining.floor_char_boundary(max_len);
        if window_end == 0 {
            window_end = remaining
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(remaining.len());
        }

        // A space right at the window edge means the window itself is a
        // clean line; otherwise back up to the last space inside it.
        let split_at = if remaining.as_bytes().get(window_end) == Some(&b' ') {
            window_end
        } else {
            match remaining[..window_end].rfind(' ') {
                Some(0) | None => window_end,
                Some(i) => i,
            }
        };

        lines.push(remaining[..split_at].trim_end().to_string());
        remaining = remaining[split_at..].trim_start();
    }

    lines
}
