// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Subcommands mirror the control-plane operations.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "Container control plane for local and bridged Docker engines")]
#[command(version)]
pub struct Cli {
    /// Engine source: local, bridged, wsl2, or bridged:<profile>
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Bridge profile (WSL distribution) for bridged sources
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Configuration file (default: discovered from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new berth.yml configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List containers
    Ps {
        /// Include stopped containers
        #[arg(short, long)]
        all: bool,
    },

    /// Show one container in the canonical model
    Get { id: String },

    /// Show the engine's inspect document
    Inspect { id: String },

    Start { id: String },

    Stop { id: String },

    Restart { id: String },

    /// Remove a container
    Rm {
        id: String,
        #[arg(short, long)]
        force: bool,
    },

    /// Show container logs
    Logs {
        id: String,
        /// Lines from the end
        #[arg(long, default_value_t = 100)]
        tail: u64,
        /// Keep streaming new output
        #[arg(short, long)]
        follow: bool,
        /// Omit engine timestamps
        #[arg(long)]
        no_timestamps: bool,
    },

    /// One resource-usage sample
    Stats { id: String },

    /// List a directory inside a container
    Ls {
        id: String,
        #[arg(default_value = "/")]
        path: String,
    },

    /// Download a path from a container as a tar archive
    Cp {
        id: String,
        path: String,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a command inside a container
    Exec {
        id: String,
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },

    /// List images with usage
    Images,

    /// Remove an image
    Rmi {
        id: String,
        #[arg(short, long)]
        force: bool,
    },

    /// List volumes with usage
    Volumes,

    /// Remove a volume
    VolumeRm {
        name: String,
        #[arg(short, long)]
        force: bool,
    },

    /// List networks with usage
    Networks,

    /// Remove a network
    NetworkRm { id: String },

    /// Print a compose project's file
    Compose {
        project: String,
        #[arg(long)]
        working_dir: Option<String>,
        /// Comma-separated compose files
        #[arg(long)]
        config_files: Option<String>,
    },

    /// Engine information
    Info,

    /// Run a docker command through the selected source
    Run { command: String },

    /// List bridge profiles (WSL distributions)
    Profiles,
}
