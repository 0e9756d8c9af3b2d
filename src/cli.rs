use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse Duplicati backup logs: list runs, inspect their tags, and show tag
/// values with exclusion-filter matches highlighted
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log file to read; falls back to the path Duplicati exports
    #[arg(global = true, short = 'f', long, env = "DUPLICATI__log_file")]
    pub logfile: Option<PathBuf>,

    /// Settings file overriding the default locations
    #[arg(global = true, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the retained backup runs
    Runs,
    /// List the tags observed in one run
    Tags {
        /// Run label as printed by `runs`
        run: String,
    },
    /// Show the values of one tag, with filter matches highlighted
    Show {
        /// Run label as printed by `runs`
        run: String,
        /// Tag name as printed by `tags`
        tag: String,
    },
}

pub fn cli_parse() -> Cli {
    Cli::parse()
}
