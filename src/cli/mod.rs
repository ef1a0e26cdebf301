//! CLI command definitions for join-board
//!
//! This module defines the CLI structure using clap's derive macros.
//! With no subcommand the web UI is served.

use clap::{Parser, Subcommand};

/// Join kanban board: web UI and command-line tools
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Remote database base URL (overrides config)
    #[arg(long, global = true)]
    pub remote_url: Option<String>,

    /// Session storage directory (overrides config)
    #[arg(long, global = true)]
    pub session_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    /// Port for the web UI (default: 31995)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web UI (default if no subcommand given)
    Serve,

    /// Print the board columns
    Board {
        /// Only show tasks whose title or description contains this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Print task counts and the next urgent deadline
    Summary,

    /// Move a task to another column
    Move {
        /// Task id
        task_id: String,
        /// Target column: "to do", "in progress", "await feedback", "done" or a column id
        category: String,
    },

    /// Clear the session so the next run refetches from the remote
    ResetSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_none() {
        let cli = Cli::parse_from(["join-board"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.log, "2");
        assert!(!cli.verbose);
    }

    #[test]
    fn move_takes_id_and_category() {
        let cli = Cli::parse_from(["join-board", "move", "task7", "awaitFeedback", "--session-dir", "/tmp/s"]);
        assert_eq!(cli.session_dir.as_deref(), Some("/tmp/s"));
        match cli.command {
            Some(Command::Move { task_id, category }) => {
                assert_eq!(task_id, "task7");
                assert_eq!(category, "awaitFeedback");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn board_query_flag() {
        let cli = Cli::parse_from(["join-board", "board", "-q", "login"]);
        assert!(matches!(cli.command, Some(Command::Board { query: Some(ref q) }) if q == "login"));
    }
}
