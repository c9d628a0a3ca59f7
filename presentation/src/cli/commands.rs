//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for werewolf
#[derive(Parser, Debug)]
#[command(name = "werewolf")]
#[command(author, version, about = "Werewolf game master with AI players")]
#[command(long_about = r#"
Runs a game of Werewolf in the terminal. Autonomous players, night
actions and narration are driven by an AI backend (Gemini CLI, the
Gemini API or a local Ollama server).

Configuration files are loaded from (in priority order):
1. WEREWOLF_<SECTION>__<KEY>            Environment variables
2. --config <path>                      Explicit config file
3. ./werewolf.toml                      Project-level config
4. ~/.config/werewolf/config.toml       Global config

Example:
  werewolf --human alice --bots 5
  werewolf --bots 9 --provider ollama --max-days 6
  werewolf --human alice --human bob --bots 4 --mode offline
"#)]
pub struct Cli {
    /// Seat a human player (can be specified multiple times)
    #[arg(long = "human", value_name = "NAME")]
    pub humans: Vec<String>,

    /// Seat this many autonomous players
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    pub bots: usize,

    /// Wait in the lobby instead of starting immediately
    #[arg(long)]
    pub lobby: bool,

    /// Narration mode: online or offline
    #[arg(long, value_name = "MODE")]
    pub mode: Option<String>,

    /// AI backend: gemini-cli, gemini-api or ollama
    #[arg(short, long, value_name = "NAME")]
    pub provider: Option<String>,

    /// Model for the selected backend
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// End the game without a winner after this many days
    #[arg(long, value_name = "DAYS")]
    pub max_days: Option<u32>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Whether to start as soon as the table is seated
    pub fn autostart(&self) -> bool {
        !self.lobby && (self.bots > 0 || !self.humans.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_table() {
        let cli = Cli::parse_from([
            "werewolf", "--human", "alice", "--human", "bob", "--bots", "4", "-vv",
        ]);
        assert_eq!(cli.humans, vec!["alice", "bob"]);
        assert_eq!(cli.bots, 4);
        assert_eq!(cli.verbose, 2);
        assert!(cli.autostart());
    }

    #[test]
    fn test_lobby_disables_autostart() {
        let cli = Cli::parse_from(["werewolf", "--bots", "6", "--lobby"]);
        assert!(!cli.autostart());
        assert!(!Cli::parse_from(["werewolf"]).autostart());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "werewolf", "-p", "ollama", "-m", "llama3", "--max-days", "5", "--mode", "offline",
        ]);
        assert_eq!(cli.provider.as_deref(), Some("ollama"));
        assert_eq!(cli.model.as_deref(), Some("llama3"));
        assert_eq!(cli.max_days, Some(5));
        assert_eq!(cli.mode.as_deref(), Some("offline"));
    }
}
