//! Command-line interface definition for Voyagent
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for serving the chat endpoint and for an
//! interactive terminal session.

use clap::{Parser, Subcommand};

/// Voyagent - Conversational travel booking agent
///
/// Search and book flights, hotels, and airport transfers through a
/// chat interface, over HTTP or directly in the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "voyagent")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/voyagent.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Voyagent
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the chat endpoint over HTTP
    Serve {
        /// Override the configured bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start an interactive chat session in the terminal
    Chat {
        /// Session id to converse under
        #[arg(short, long, default_value = "terminal")]
        session: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
