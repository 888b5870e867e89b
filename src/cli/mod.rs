//! CLI module - Command-line interface for Facegate
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Facegate - Face-verified attendance backend
#[derive(Parser)]
#[command(name = "facegate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web", alias = "-d", alias = "--daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Validate the config and check database connectivity
    #[command(alias = "-c", alias = "--check")]
    Check,

    /// Manage training catalogue entries
    Training {
        #[command(subcommand)]
        command: TrainingCommands,
    },

    /// Inspect user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum TrainingCommands {
    /// Add a training entry
    Add {
        /// Training title
        title: String,
        /// Category used for filtering
        #[arg(long, default_value = "general")]
        category: String,
        /// Duration in minutes
        #[arg(long, default_value = "0")]
        duration: i32,
        /// Longer description
        #[arg(long, default_value = "")]
        description: String,
        /// Cover image URL
        #[arg(long)]
        image_url: Option<String>,
    },
    /// List training entries
    #[command(alias = "ls")]
    List {
        /// Optional category to filter
        #[arg(long)]
        category: Option<String>,
    },
    /// Remove a training entry
    #[command(alias = "rm")]
    Remove {
        /// Training ID to remove
        id: String,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Show a user by email address or ID
    Show {
        /// Email address or user ID
        query: String,
    },
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_training_add_with_defaults() {
        let cli = Cli::try_parse_from(["facegate", "training", "add", "Fire safety"]).unwrap();
        match cli.command {
            Some(Commands::Training {
                command:
                    TrainingCommands::Add {
                        title,
                        category,
                        duration,
                        image_url,
                        ..
                    },
            }) => {
                assert_eq!(title, "Fire safety");
                assert_eq!(category, "general");
                assert_eq!(duration, 0);
                assert!(image_url.is_none());
            }
            _ => panic!("expected training add"),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["facegate"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn training_list_alias() {
        let cli =
            Cli::try_parse_from(["facegate", "training", "ls", "--category", "safety"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Training {
                command: TrainingCommands::List { category: Some(_) }
            })
        ));
    }
}
