//! Slash-command parsing for the console

use werewolf_domain::{GameMode, PlayerId};

/// One line typed at the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Join(Option<String>),
    Spectate,
    Bots(usize),
    Mode(GameMode),
    Start,
    Done,
    /// Raw ballot text; the controller decides what it means
    Vote(String),
    Execute(PlayerId),
    Day,
    Night,
    Reset,
    As(String),
    Status,
    Help,
    Quit,
    /// Anything that is not a command
    Chat(String),
}

impl ConsoleCommand {
    /// Parse a trimmed, non-empty line
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(ConsoleCommand::Chat(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name.to_lowercase().as_str() {
            "join" => Ok(ConsoleCommand::Join(
                (!arg.is_empty()).then(|| arg.to_string()),
            )),
            "spectate" => Ok(ConsoleCommand::Spectate),
            "bots" | "addbot" => {
                let count = if arg.is_empty() {
                    1
                } else {
                    arg.parse()
                        .map_err(|_| format!("'{}' is not a number of bots", arg))?
                };
                Ok(ConsoleCommand::Bots(count))
            }
            "mode" => arg.parse().map(ConsoleCommand::Mode),
            "start" => Ok(ConsoleCommand::Start),
            "done" | "skip" => Ok(ConsoleCommand::Done),
            "vote" => {
                if arg.is_empty() {
                    Err("Usage: /vote <seat> or /vote no".to_string())
                } else {
                    Ok(ConsoleCommand::Vote(arg.to_string()))
                }
            }
            "execute" | "kill" => arg
                .parse::<u32>()
                .map(|seat| ConsoleCommand::Execute(PlayerId(seat)))
                .map_err(|_| "Usage: /execute <seat>".to_string()),
            "day" => Ok(ConsoleCommand::Day),
            "night" => Ok(ConsoleCommand::Night),
            "reset" => Ok(ConsoleCommand::Reset),
            "as" => {
                if arg.is_empty() {
                    Err("Usage: /as <user>".to_string())
                } else {
                    Ok(ConsoleCommand::As(arg.to_string()))
                }
            }
            "say" => Ok(ConsoleCommand::Chat(arg.to_string())),
            "status" => Ok(ConsoleCommand::Status),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            other => Err(format!("Unknown command: /{} (try /help)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            ConsoleCommand::parse("  I trust seat 3 "),
            Ok(ConsoleCommand::Chat("I trust seat 3".to_string()))
        );
    }

    #[test]
    fn test_vote_keeps_raw_argument() {
        assert_eq!(
            ConsoleCommand::parse("/vote 4"),
            Ok(ConsoleCommand::Vote("4".to_string()))
        );
        assert_eq!(
            ConsoleCommand::parse("/VOTE no"),
            Ok(ConsoleCommand::Vote("no".to_string()))
        );
        assert!(ConsoleCommand::parse("/vote").is_err());
    }

    #[test]
    fn test_say_is_chat() {
        assert_eq!(
            ConsoleCommand::parse("/say seat 2 is lying"),
            Ok(ConsoleCommand::Chat("seat 2 is lying".to_string()))
        );
    }

    #[test]
    fn test_bots_default_to_one() {
        assert_eq!(ConsoleCommand::parse("/bots"), Ok(ConsoleCommand::Bots(1)));
        assert_eq!(ConsoleCommand::parse("/bots 5"), Ok(ConsoleCommand::Bots(5)));
        assert!(ConsoleCommand::parse("/bots many").is_err());
    }

    #[test]
    fn test_moderator_commands() {
        assert_eq!(
            ConsoleCommand::parse("/execute 2"),
            Ok(ConsoleCommand::Execute(PlayerId(2)))
        );
        assert_eq!(
            ConsoleCommand::parse("/mode offline"),
            Ok(ConsoleCommand::Mode(GameMode::Offline))
        );
        assert!(ConsoleCommand::parse("/mode loud").is_err());
        assert_eq!(
            ConsoleCommand::parse("/join Alice Smith"),
            Ok(ConsoleCommand::Join(Some("Alice Smith".to_string())))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            ConsoleCommand::parse("/dance"),
            Err("Unknown command: /dance (try /help)".to_string())
        );
    }
}
