use std::fs;
use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::info;

use nbn_cli::config::RunConfig;
use nbn_cli::pipeline::RuleController;
use nbn_cli::types::RunReport;
use nbn_output::WritePolicy;

use crate::cli::Cli;
use crate::summary::print_rule_types;

pub fn run_export(cli: &Cli) -> Result<RunReport> {
    let config = resolve_config(cli)?;
    let input = cli.input.as_deref().context("--input is required")?;
    let output = cli.output.as_deref().context("--output is required")?;

    let controller = RuleController::new(config)
        .context("build rule types")?
        .with_progress(progress_bar(cli.progress));
    let report = controller
        .run(input, output)
        .with_context(|| format!("export rules from {}", input.display()))?;

    if let Some(path) = &cli.skip_log {
        fs::write(path, report.skip_log())
            .with_context(|| format!("write skip log {}", path.display()))?;
        info!(path = %path.display(), entries = report.skips.len(), "wrote skip log");
    }
    Ok(report)
}

pub fn run_list_rule_types(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;
    let schemas = config.schema_table().context("build rule types")?;
    print_rule_types(&schemas);
    Ok(())
}

/// Configuration file (or defaults) with command line overrides applied.
fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path).context("load run configuration")?,
        None => RunConfig::default(),
    };
    if !cli.skip_folders.is_empty() {
        config.skip_folders = cli.skip_folders.iter().cloned().collect();
    }
    if let Some(path) = &cli.species_list {
        config.species_list.clone_from(path);
    }
    if cli.abort_on_write_error {
        config.write_policy = WritePolicy::Abort;
    }
    if cli.stats {
        config.stats = true;
    }
    Ok(config)
}

fn progress_bar(enabled: bool) -> ProgressBar {
    if enabled && io::stderr().is_terminal() {
        ProgressBar::new(0)
    } else {
        ProgressBar::hidden()
    }
}
