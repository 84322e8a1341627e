//! User command parsing.
//!
//! ```text
//! /key add [-known] [<target>] <key>
//! /key drop -all [known | default]
//! /key drop -known <key>
//! /key drop <target>
//! /idea <message>
//! /ideam <target> <message>
//! ```
//!
//! Options start with `-`, precede the positional arguments and are matched
//! case-insensitively. Command names are matched case-insensitively too.

use crate::error::CommandError;

/// Which keys `/key drop -all` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropScope {
    /// Known and default keys
    All,
    /// Known keys (default keys follow, since they would be unusable)
    Known,
    /// Default keys only
    Default,
}

/// A parsed plugin command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a known key, or a default key for a target.
    KeyAdd {
        /// `-known`: register for decryption only
        known: bool,
        /// Target channel or nick, `None` for the active window
        target: Option<String>,
        /// Passphrase
        key: String,
    },

    /// Drop keys in bulk.
    KeyDropAll {
        /// Which table to clear
        scope: DropScope,
    },

    /// Drop a known key by passphrase.
    KeyDropKnown {
        /// Passphrase
        key: String,
    },

    /// Drop the default key of a target.
    KeyDropDefault {
        /// Channel or nick
        target: String,
    },

    /// Send an encrypted message to the active window.
    Idea {
        /// Message text
        message: String,
    },

    /// Send an encrypted message to a target.
    IdeaTo {
        /// Channel or nick
        target: String,
        /// Message text
        message: String,
    },
}

impl Command {
    /// Parse an input line.
    ///
    /// Returns `Ok(None)` for lines that are not commands handled here (plain
    /// text or other commands).
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let Some(input) = line.strip_prefix('/') else {
            return Ok(None);
        };
        let (name, rest) = split_word(input);

        match name.to_ascii_lowercase().as_str() {
            "key" => parse_key(rest).map(Some),
            "idea" => {
                let message = rest.trim_start();
                if message.is_empty() {
                    return Err(CommandError::NotEnoughParams);
                }
                Ok(Some(Self::Idea { message: message.to_string() }))
            },
            "ideam" => {
                let (target, message) = split_word(rest);
                let message = message.trim_start();
                if target.is_empty() || message.is_empty() {
                    return Err(CommandError::NotEnoughParams);
                }
                Ok(Some(Self::IdeaTo { target: target.to_string(), message: message.to_string() }))
            },
            _ => Ok(None),
        }
    }
}

fn parse_key(args: &str) -> Result<Command, CommandError> {
    let (sub, rest) = split_word(args);
    match sub.to_ascii_lowercase().as_str() {
        "add" => parse_key_add(rest),
        "drop" => parse_key_drop(rest),
        "" => Err(CommandError::NotEnoughParams),
        other => Err(CommandError::UnknownCommand { name: format!("key {other}") }),
    }
}

fn parse_key_add(args: &str) -> Result<Command, CommandError> {
    let parsed = Args::parse(args, &["known"])?;
    let known = parsed.has("known");

    let (target, key) = match parsed.positional.as_slice() {
        [] => return Err(CommandError::NotEnoughParams),
        [key] => (None, key),
        [target, key] => (Some(target.to_string()), key),
        [_, _, extra, ..] => return Err(CommandError::InvalidArgument { value: extra.to_string() }),
    };

    Ok(Command::KeyAdd { known, target, key: key.to_string() })
}

fn parse_key_drop(args: &str) -> Result<Command, CommandError> {
    let parsed = Args::parse(args, &["known", "all"])?;
    let arg = match parsed.positional.as_slice() {
        [] => None,
        [arg] => Some(*arg),
        [_, extra, ..] => return Err(CommandError::InvalidArgument { value: extra.to_string() }),
    };

    if parsed.has("all") {
        let scope = match arg {
            None => DropScope::All,
            Some(scope) if scope.eq_ignore_ascii_case("known") => DropScope::Known,
            Some(scope) if scope.eq_ignore_ascii_case("default") => DropScope::Default,
            Some(other) => return Err(CommandError::InvalidArgument { value: other.to_string() }),
        };
        return Ok(Command::KeyDropAll { scope });
    }

    let arg = arg.ok_or(CommandError::NotEnoughParams)?;
    if parsed.has("known") {
        Ok(Command::KeyDropKnown { key: arg.to_string() })
    } else {
        Ok(Command::KeyDropDefault { target: arg.to_string() })
    }
}

/// Leading options plus positional words.
struct Args<'a> {
    options: Vec<&'static str>,
    positional: Vec<&'a str>,
}

impl<'a> Args<'a> {
    fn parse(input: &'a str, allowed: &[&'static str]) -> Result<Self, CommandError> {
        let mut options = Vec::new();
        let mut words = input.split_whitespace().peekable();

        while let Some(option) = words.peek().copied().and_then(|word| word.strip_prefix('-')) {
            let known = allowed
                .iter()
                .find(|allowed| allowed.eq_ignore_ascii_case(option))
                .ok_or_else(|| CommandError::UnknownOption { option: option.to_string() })?;
            options.push(*known);
            words.next();
        }

        Ok(Self { options, positional: words.collect() })
    }

    fn has(&self, option: &str) -> bool {
        self.options.iter().any(|known| *known == option)
    }
}

/// First whitespace-delimited word and the untouched remainder.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    input.split_once(char::is_whitespace).unwrap_or((input, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Option<Command>, CommandError> {
        Command::parse(line)
    }

    #[test]
    fn not_ours() {
        assert_eq!(parse("hello"), Ok(None));
        assert_eq!(parse("/join #rust"), Ok(None));
        assert_eq!(parse("/"), Ok(None));
    }

    #[test]
    fn key_add_forms() {
        assert_eq!(
            parse("/key add secret"),
            Ok(Some(Command::KeyAdd { known: false, target: None, key: "secret".into() }))
        );
        assert_eq!(
            parse("/key add #rust secret"),
            Ok(Some(Command::KeyAdd { known: false, target: Some("#rust".into()), key: "secret".into() }))
        );
        assert_eq!(
            parse("/KEY ADD -KNOWN secret"),
            Ok(Some(Command::KeyAdd { known: true, target: None, key: "secret".into() }))
        );
    }

    #[test]
    fn key_add_errors() {
        assert_eq!(parse("/key add"), Err(CommandError::NotEnoughParams));
        assert_eq!(parse("/key add -known"), Err(CommandError::NotEnoughParams));
        assert_eq!(parse("/key add -bogus k"), Err(CommandError::UnknownOption { option: "bogus".into() }));
        assert_eq!(parse("/key add a b c"), Err(CommandError::InvalidArgument { value: "c".into() }));
    }

    #[test]
    fn key_drop_forms() {
        assert_eq!(parse("/key drop -all"), Ok(Some(Command::KeyDropAll { scope: DropScope::All })));
        assert_eq!(
            parse("/key drop -all known"),
            Ok(Some(Command::KeyDropAll { scope: DropScope::Known }))
        );
        assert_eq!(
            parse("/key drop -all DEFAULT"),
            Ok(Some(Command::KeyDropAll { scope: DropScope::Default }))
        );
        assert_eq!(parse("/key drop -known secret"), Ok(Some(Command::KeyDropKnown { key: "secret".into() })));
        assert_eq!(parse("/key drop #rust"), Ok(Some(Command::KeyDropDefault { target: "#rust".into() })));
    }

    #[test]
    fn key_drop_errors() {
        assert_eq!(parse("/key drop"), Err(CommandError::NotEnoughParams));
        assert_eq!(parse("/key drop -known"), Err(CommandError::NotEnoughParams));
        assert_eq!(parse("/key drop -all everything"), Err(CommandError::InvalidArgument { value: "everything".into() }));
    }

    #[test]
    fn key_without_subcommand() {
        assert_eq!(parse("/key"), Err(CommandError::NotEnoughParams));
        assert_eq!(parse("/key list"), Err(CommandError::UnknownCommand { name: "key list".into() }));
    }

    #[test]
    fn idea_keeps_message_spacing() {
        assert_eq!(parse("/idea  hello   world"), Ok(Some(Command::Idea { message: "hello   world".into() })));
        assert_eq!(parse("/idea"), Err(CommandError::NotEnoughParams));
        assert_eq!(parse("/idea   "), Err(CommandError::NotEnoughParams));
    }

    #[test]
    fn ideam_target_and_message() {
        assert_eq!(
            parse("/ideam bob see you at 5"),
            Ok(Some(Command::IdeaTo { target: "bob".into(), message: "see you at 5".into() }))
        );
        assert_eq!(parse("/ideam bob"), Err(CommandError::NotEnoughParams));
        assert_eq!(parse("/ideam"), Err(CommandError::NotEnoughParams));
    }
}
