//! Command-line argument parsing for medpredict
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use super::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// medpredict - disease prediction from symptoms, plus weekly stress insights
#[derive(Parser, Debug)]
#[command(name = "medpredict")]
#[command(version)]
#[command(about = "Serve disease predictions from a trained symptom classifier", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact path (overrides configuration)
    #[arg(long, global = true)]
    pub artifact: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand; `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Listen host (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Predict a disease for the given symptoms
    Predict {
        /// Symptom identifiers, e.g. `high_fever` or "muscle pain"
        #[arg(value_name = "SYMPTOM", required = true)]
        symptoms: Vec<String>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known symptoms in feature order
    Symptoms,

    /// Run startup diagnostics
    Doctor,

    /// Print this week's stress insights
    Stress {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Subcommand to run, defaulting to `serve`
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
        })
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(artifact) = &self.artifact {
            config.model.artifact_path = artifact.to_string_lossy().to_string();
        }
        if let Some(Commands::Serve { host, port }) = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Log level forced by the flags; `None` keeps the configured level
    pub fn log_level(&self) -> Option<&'static str> {
        match self {
            Verbosity::Quiet => Some("warn"),
            Verbosity::Normal => None,
            Verbosity::Verbose => Some("debug"),
            Verbosity::VeryVerbose => Some("trace"),
        }
    }

    /// Check if should show decorated console output
    pub fn show_banner(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}
