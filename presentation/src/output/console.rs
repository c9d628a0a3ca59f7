//! Console formatting for room traffic

use colored::Colorize;
use werewolf_domain::UserId;

/// Formats room and private messages for the terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner printed once at startup
    pub fn banner(backend: &str, room: &str) -> String {
        let mut output = Self::header("Werewolf");
        output.push_str(&format!(
            "\n{} {}\n{} {}\n",
            "Room:".cyan().bold(),
            room,
            "AI backend:".cyan().bold(),
            backend
        ));
        output.push_str(&format!("Type {} for commands.\n", "/help".bold()));
        output
    }

    /// A line posted to the shared room channel
    pub fn channel(text: &str) -> String {
        Self::indent_continuation(&format!("{} {}", "[room]".green().bold(), text))
    }

    /// A private message to one human
    pub fn private(user: &UserId, text: &str) -> String {
        let tag = format!("[to {}]", user);
        Self::indent_continuation(&format!("{} {}", tag.magenta().bold(), text))
    }

    /// A private question awaiting a reply
    pub fn prompt(user: &UserId, text: &str) -> String {
        let tag = format!("[ask {}]", user);
        Self::indent_continuation(&format!("{} {}", tag.yellow().bold(), text))
    }

    /// Local feedback for the person at the keyboard
    pub fn notice(text: &str) -> String {
        format!("{} {}", "::".dimmed(), text.dimmed())
    }

    pub fn error(text: &str) -> String {
        format!("{} {}", "error:".red().bold(), text)
    }

    pub fn help() -> String {
        let mut output = Self::section_header("Commands");
        for (command, about) in [
            ("/join <name>", "take a seat (as the active user)"),
            ("/spectate", "watch instead of playing"),
            ("/bots <n>", "seat n autonomous players"),
            ("/mode online|offline", "where narration is delivered"),
            ("/start", "deal roles and begin the first night"),
            ("/done", "end your speaking turn"),
            ("/vote <seat>|no", "cast your ballot or abstain"),
            ("/say <text>", "chat (same as a plain line)"),
            ("/execute <seat>", "moderator: remove a player"),
            ("/day, /night", "administrator: skip to a phase"),
            ("/reset", "moderator: clear the room"),
            ("/as <user>", "act as another local user"),
            ("/status", "show the table"),
            ("/quit", "leave"),
        ] {
            output.push_str(&format!("  {:<24} {}\n", command.bold(), about));
        }
        output.push_str("Any other line is chat from the active user.\n");
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent every line after the first so multi-line posts stay readable
    fn indent_continuation(text: &str) -> String {
        let mut lines = text.lines();
        let Some(first) = lines.next() else {
            return String::new();
        };
        let mut output = first.to_string();
        for line in lines {
            output.push_str("\n    ");
            output.push_str(line);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_line_posts_are_indented() {
        let text = ConsoleFormatter::channel("Roles:\n1. alice: Seer\n2. AI-1: Werewolf");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "    1. alice: Seer");
        assert!(lines[0].ends_with("Roles:"));
    }

    #[test]
    fn test_private_names_the_recipient() {
        let text = ConsoleFormatter::private(&UserId::new("alice"), "You are seat 1.");
        assert!(text.contains("to alice"));
        assert!(text.ends_with("You are seat 1."));
    }

    #[test]
    fn test_help_lists_voting() {
        assert!(ConsoleFormatter::help().contains("/vote <seat>|no"));
    }
}
