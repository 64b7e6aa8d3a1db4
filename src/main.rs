use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use nusyst_reweight::logging;
use nusyst_reweight::prelude::*;

#[derive(Parser)]
#[command(name = "reweight-ghep", disable_help_flag = true)]
#[command(about = "Fill validation trees of systematic-response weights for GHEP events")]
struct Cli {
    /// Systematic parameter configuration (YAML)
    config: PathBuf,

    /// GHEP event file (ROOT)
    ghep: PathBuf,

    /// Print usage
    #[arg(short = '?', long = "help", action = ArgAction::Help)]
    help: Option<bool>,
}

fn main() -> ExitCode {
    // Help is only honoured as the sole argument.
    let help_only = std::env::args_os().len() == 2;
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if help_only && err.kind() == ErrorKind::DisplayHelp => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            println!("[ERROR]: Expected to be passed 2 parameters.");
            println!("{}", Cli::command().render_usage());
            return ExitCode::from(1);
        }
    };

    let config = RunConfig::from_path(&cli.config);
    logging::init(&config.as_ref().map(|c| c.logging).unwrap_or_default());

    let result = config
        .map_err(RunError::from)
        .and_then(|config| run(&config, &cli.ghep, Path::new(OUTPUT_FILE)));
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
