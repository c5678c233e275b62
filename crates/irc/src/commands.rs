//! Parsing of prefixed channel commands into typed requests.

/// A fully parsed relay command.
#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    /// Link to the bot's Mastodon profile.
    Mastodon,
    Toot(&'a str),
    Reply { toot: &'a str, text: &'a str },
    Fav(&'a str),
    Boost(&'a str),
    Delete(&'a str),
    Follow(&'a str),
    Unfollow(&'a str),
}

/// Outcome of matching a channel line against the command prefix.
#[derive(Debug, PartialEq, Eq)]
pub enum Parsed<'a> {
    Command(Command<'a>),
    /// A known command with missing/extra arguments; reply with usage.
    Usage(&'static str),
}

/// Parse a channel message. `None` means the line is not a command at all
/// (no prefix, or an unknown command name) and should fall through to
/// passive resolution.
pub fn parse<'a>(prefix: &str, text: &'a str) -> Option<Parsed<'a>> {
    let rest = text.strip_prefix(prefix)?.trim();
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let parsed = match name {
        "mastodon" => {
            if args.is_empty() {
                Parsed::Command(Command::Mastodon)
            } else {
                Parsed::Usage("mastodon")
            }
        },
        "toot" => {
            if args.is_empty() {
                Parsed::Usage("toot <text>")
            } else {
                Parsed::Command(Command::Toot(args))
            }
        },
        "reply" => match args.split_once(char::is_whitespace) {
            Some((toot, text)) if !text.trim().is_empty() => Parsed::Command(Command::Reply {
                toot,
                text: text.trim(),
            }),
            _ => Parsed::Usage("reply <toot-url> <text>"),
        },
        "fav" => single_arg(args, Command::Fav, "fav <toot-url>"),
        "boost" => single_arg(args, Command::Boost, "boost <toot-url>"),
        "delete" => single_arg(args, Command::Delete, "delete <toot-url>"),
        "follow" => single_arg(args, Command::Follow, "follow <user-uri>"),
        "unfollow" => single_arg(args, Command::Unfollow, "unfollow <user-uri>"),
        _ => return None,
    };
    Some(parsed)
}

fn single_arg<'a>(
    args: &'a str,
    build: fn(&'a str) -> Command<'a>,
    usage: &'static str,
) -> Parsed<'a> {
    let mut words = args.split_whitespace();
    match (words.next(), words.next()) {
        (Some(arg), None) => Parsed::Command(build(arg)),
        _ => Parsed::Usage(usage),
    }
}
