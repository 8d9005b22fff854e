use clap::{Parser, Subcommand};
use folio_core::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio prefetch: hover-intent and critical-resource preloading for a static site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Site root (defaults to CWD)
    #[arg(long, global = true)]
    pub cd: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Warm a deployed site's cache: seed and idle passes over HTTP
    Warm {
        /// Origin the site is served from
        #[arg(long)]
        base_url: String,

        /// Page being viewed, e.g. "/" or "/pages/about.html"
        #[arg(long, default_value = "/")]
        page: String,

        /// Skip the idle pass
        #[arg(long)]
        no_idle: bool,

        /// Override prefetch.max_concurrent
        #[arg(long)]
        max_concurrent: Option<usize>,
    },

    /// Print the prefetch hints a page view would emit for the local site tree
    Hints {
        /// Page being viewed, e.g. "/" or "/pages/about.html"
        #[arg(long, default_value = "/")]
        page: String,

        /// Skip the idle pass
        #[arg(long)]
        no_idle: bool,
    },

    /// Replay a scripted sequence of hover events against the intent detector
    Simulate {
        /// TOML or JSON file with `[[events]]`
        script: PathBuf,
    },

    /// List navigational elements found in HTML files and how their targets qualify
    Scan {
        /// HTML files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show/manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration (defaults, user and project layers merged)
    Show,

    /// Validate the effective configuration
    Validate,

    /// Write the built-in defaults to .folio/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
