//! NBN rule exporter CLI.

use clap::Parser;
use nbn_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;

use crate::cli::Cli;
use crate::commands::{run_export, run_list_rule_types};
use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let result = if cli.list_rule_types {
        run_list_rule_types(&cli)
    } else {
        run_export(&cli).map(|report| print_summary(&report))
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}
