//! Joist CLI - static-site asset pipeline with live reload.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "joist")]
#[command(about = "Static-site asset pipeline with a live-reload dev server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to site.toml config file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a source tree in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Clean, build, serve, and rebuild on changes
    Dev {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// One-shot asset build
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip CSS/JS minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Preview a built output tree
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Delete the output tree
    Clean,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let config = config::load(&cli.config)?;

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(yes).await?;
        }
        Commands::Dev { port, no_open } => {
            commands::dev::run(&config, port, !no_open).await?;
        }
        Commands::Build { out, no_minify } => {
            commands::build::run(&config, out, no_minify).await?;
        }
        Commands::Serve { port, dir } => {
            commands::serve::run(&config, port, dir).await?;
        }
        Commands::Clean => {
            commands::clean::run(&config).await?;
        }
    }

    Ok(())
}
