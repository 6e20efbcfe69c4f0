//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Provision a GitHub repository from a Go service template
#[derive(Parser, Debug)]
#[command(name = "reposcaffold")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a scaffold config file (YAML)
    #[arg(short, long, global = true, env = "REPOSCAFFOLD_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create and populate the repository
    Create(OptionsArgs),

    /// Print the repository state if it exists
    Read(OptionsArgs),

    /// Delete and re-create the repository
    Update(OptionsArgs),

    /// Delete the repository
    Delete(OptionsArgs),
}

/// Plugin options, from a file or from flags
#[derive(Args, Debug)]
pub struct OptionsArgs {
    /// YAML or JSON file with the plugin options
    #[arg(short = 'f', long, conflicts_with_all = ["repo", "owner", "org"])]
    pub options: Option<Utf8PathBuf>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,

    /// Personal account login
    #[arg(long)]
    pub owner: Option<String>,

    /// Organization login; wins over --owner
    #[arg(long)]
    pub org: Option<String>,

    /// Container image repository
    #[arg(long)]
    pub image_repo: Option<String>,

    /// Main branch of the new repository
    #[arg(long)]
    pub branch: Option<String>,
}
