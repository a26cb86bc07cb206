//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Gesture Bridge - Turn hand gestures into card-game commands
#[derive(Parser, Debug)]
#[command(name = "gesture-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the detection pipeline over a recorded observation log
    Run {
        /// Input observation log file
        #[arg(short, long)]
        input: PathBuf,

        /// Camera index reported to the backend
        #[arg(long, default_value = "0")]
        camera: u32,

        /// Bind to an existing game instead of starting a new one
        #[arg(short, long)]
        game: Option<String>,
    },

    /// Start a new game and print its state
    Start,

    /// Submit an explicit higher/lower guess
    Guess {
        /// Guess direction ("higher" or "lower")
        direction: String,

        /// Game to guess against
        #[arg(short, long)]
        game: String,
    },

    /// Fetch and print a game's current state
    State {
        /// Game to fetch
        #[arg(short, long)]
        game: String,
    },

    /// Print metadata for an observation log
    ReplayInfo {
        /// Observation log file
        input: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "detection.classifier", "cooldown.policy")
        key: String,

        /// Value to set
        value: String,
    },

    /// Get a specific configuration value
    Get {
        /// Configuration key
        key: String,
    },

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the observation logs directory
    pub fn logs_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_bridge").join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}
