//! CLI module for ralph
//!
//! Provides the command-line interface using clap.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Ralph - workflow engine for agent-driven issue pipelines
#[derive(Parser, Debug)]
#[command(name = "ralph")]
#[command(version)]
#[command(about = "Workflow state machine, pipeline detection, work streams and issue routing")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Override the working directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the workflow state table
    States {
        /// Write the active table as JSON to this path, e.g. to seed an override
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Check whether a state transition is allowed
    Transition {
        /// Current workflow state
        from: String,

        /// Requested workflow state
        to: String,
    },

    /// Resolve a requested state or semantic intent for a command
    Resolve {
        /// Direct state name ("Ready for Plan") or intent (__COMPLETE__)
        input: String,

        /// Workflow command, with or without the ralph_ prefix
        #[arg(short, long)]
        command: String,
    },

    /// Detect the pipeline phase of an issue or a group of issues
    Pipeline {
        /// JSON array of issue states
        #[arg(short, long)]
        file: PathBuf,

        /// Primary issue number when the file holds a group
        #[arg(long)]
        group_primary: Option<u64>,
    },

    /// Cluster issues into independent work streams
    Streams {
        /// JSON array of issue file ownership entries
        #[arg(short, long)]
        file: PathBuf,

        /// JSON array of issue states; adds the pipeline position of each stream
        #[arg(long)]
        positions: Option<PathBuf>,
    },

    /// Evaluate routing rules against an issue
    Route {
        /// JSON object describing the issue (repo, labels, issueType)
        #[arg(short, long)]
        issue: PathBuf,

        /// Routing config (defaults to .ralph/routing.yaml)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a routing config
    ValidateConfig {
        /// Routing config (defaults to .ralph/routing.yaml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also check workflow states referenced by enabled rules
        #[arg(long)]
        live: bool,

        /// JSON array of board state names for --live (defaults to the state table)
        #[arg(long, requires = "live")]
        states_file: Option<PathBuf>,
    },
}
