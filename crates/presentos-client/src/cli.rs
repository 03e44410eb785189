//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use presentos_api::Personality;

/// presentos - Present OS goals and scheduling from the terminal
#[derive(Debug, Parser)]
#[command(name = "presentos")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "PRESENTOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with Google
    Login {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Path to Google Cloud Console credentials JSON file
        ///
        /// This is the JSON file downloaded from the Google Cloud Console
        /// OAuth 2.0 credentials page. Alternative to providing client_id
        /// and client_secret separately.
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,

        /// Force re-authentication even if already signed in
        #[arg(long, short)]
        force: bool,
    },

    /// Sign out (asks for confirmation)
    Logout,

    /// Show the signed-in dashboard: calendar status and goals (default)
    Dashboard,

    /// Goal commands
    Goals {
        #[command(subcommand)]
        action: GoalsAction,
    },

    /// Schedule a task toward a goal
    Schedule {
        /// Goal the task serves
        #[arg(long)]
        goal: String,

        /// What to schedule, in your own words
        #[arg(long)]
        prompt: String,

        /// Assistant personality: P, A, E, or I
        #[arg(long, default_value = "P")]
        personality: Personality,
    },

    /// Show session and calendar-grant status
    Status,
}

/// Goal actions.
#[derive(Debug, Subcommand)]
pub enum GoalsAction {
    /// List your goals
    List,

    /// Create a goal
    Create {
        /// Goal name
        #[arg(long)]
        name: String,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Avatar/icon label
        #[arg(long)]
        avatar: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn schedule_parses_personality() {
        let cli = Cli::parse_from([
            "presentos",
            "schedule",
            "--goal",
            "g1",
            "--prompt",
            "read chapter 4",
            "--personality",
            "E",
        ]);
        match cli.command {
            Some(Command::Schedule { personality, .. }) => {
                assert_eq!(personality, Personality::Entrepreneur);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn schedule_defaults_to_producer() {
        let cli = Cli::parse_from(["presentos", "schedule", "--goal", "g1", "--prompt", "x"]);
        match cli.command {
            Some(Command::Schedule { personality, .. }) => {
                assert_eq!(personality, Personality::Producer);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::parse_from(["presentos"]);
        assert!(cli.command.is_none());
    }
}
