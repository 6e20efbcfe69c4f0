//! reposcaffold CLI - drive the scaffolding plugin from the command line

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS operation
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = commands::load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Create(args) => commands::create(args, config).await,
        Commands::Read(args) => commands::read(args, config).await,
        Commands::Update(args) => commands::update(args, config).await,
        Commands::Delete(args) => commands::delete(args, config).await,
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
