pub mod cli;
pub mod config;
pub mod filter;
pub mod highlight;
pub mod parser;

pub use cli::{Cli, Commands, cli_parse};
pub use config::{ConfigError, ViewerConfig, load_config};
pub use filter::IgnoreFilter;
pub use highlight::{Segment, highlight, render_segments, translate_pattern};
pub use parser::{
    BackupRun, History, IngestError, IngestMode, IngestOptions, ingest_file, ingest_lines,
};

use anyhow::Context;
use comfy_table::Table;

/// Duplicati invokes run-scripts for every operation; only backups carry the
/// filter log this tool reads.
fn skip_for_operation() -> bool {
    match std::env::var("DUPLICATI__OPERATIONNAME") {
        Ok(operation) => operation != "Backup",
        Err(_) => false,
    }
}

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();

    if skip_for_operation() {
        return Ok(());
    }

    let config = load_config(cli.config.as_deref()).context("failed to load config")?;
    let ignore = IgnoreFilter::new(&config.ignore_exclude)?;
    let logfile = cli
        .logfile
        .clone()
        .context("no log file given and DUPLICATI__log_file is not set")?;

    let options = IngestOptions {
        max_runs: config.show_logs_number,
        mode: IngestMode::Lazy,
    };
    let mut history = ingest_file(&logfile, options, &ignore)?;

    match &cli.command {
        Commands::Runs => {
            let mut table = Table::new();
            table.set_header(vec!["#", "Backup run"]);
            for (index, run) in history.iter().enumerate() {
                table.add_row(vec![(index + 1).to_string(), run.label().to_string()]);
            }
            println!("{table}");
        }
        Commands::Tags { run } => {
            let run_label = run.as_str();
            let run = history
                .find_mut(run_label)
                .with_context(|| format!("no run labelled '{run_label}'"))?;
            let mut table = Table::new();
            table.set_header(vec!["Tag", "Distinct values"]);
            for (tag, values) in run.tags(&ignore) {
                table.add_row(vec![tag.clone(), values.len().to_string()]);
            }
            println!("{table}");
        }
        Commands::Show { run, tag } => {
            let run_label = run.as_str();
            let run = history
                .find_mut(run_label)
                .with_context(|| format!("no run labelled '{run_label}'"))?;
            let values = run
                .tags(&ignore)
                .get(tag)
                .with_context(|| format!("no tag '{tag}' in run '{run_label}'"))?;
            for value in values {
                println!("{}", render_segments(&highlight(value)));
            }
        }
    }

    Ok(())
}
