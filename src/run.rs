use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ConfigError, RunConfig};
use crate::dispatch::{DispatchError, DispatchSummary, Validator};
use crate::ghep::{GHepFile, InputError};
use crate::parameter::{SystRegistry, ValidationParameters};
use crate::response::TabulatedEngine;
use crate::tables::{OutputError, OutputTables};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

impl RunError {
    pub fn exit_code(&self) -> u8 {
        //! Process exit status for this failure.
        match self {
            Self::Input(InputError::Open { .. }) => 2,
            Self::Input(InputError::MissingTree { .. }) => 3,
            Self::Input(InputError::Bind { .. }) => 4,
            Self::Config(_) => 5,
            Self::Dispatch(_) => 6,
            Self::Output(_) => 7,
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub dispatch: DispatchSummary,
    pub trees: Vec<&'static str>,
}

pub fn validate_events(
    config: &RunConfig,
    input: &Path,
) -> Result<(OutputTables, DispatchSummary), RunError> {
    //! Wire the registry and engine from `config`, then drain the events of `input` through the
    //! [`Validator`]. Nothing is written to disk.
    let registry = SystRegistry::from_config(config);
    info!("Loaded {} parameters: \n{}", registry.len(), registry.header_info());
    let engine = TabulatedEngine::from_config(config);

    let ghep = GHepFile::open(input)?;
    let record = ghep.bind()?;
    info!("Reading {} events from {:?}", ghep.entries(), ghep.path());

    let params = ValidationParameters::resolve(&registry);
    let validator = Validator::new(&params, &engine);
    let outcome = validator.run(record.events()?)?;
    Ok(outcome)
}

pub fn run(config: &RunConfig, input: &Path, output: &Path) -> Result<RunSummary, RunError> {
    //! Run the whole pipeline and write the validation trees to `output`.
    //!
    //! The output file is only created once every event has been processed. If the run fails,
    //! any file already at `output` is removed, so a stale or partial file never outlives it.
    let outcome = process_and_write(config, input, output);
    if outcome.is_err() && output.exists() {
        match fs::remove_file(output) {
            Ok(()) => warn!("Removed stale output {:?}", output),
            Err(err) => warn!("Failed to remove stale output {:?}: {err}", output),
        }
    }
    outcome
}

fn process_and_write(
    config: &RunConfig,
    input: &Path,
    output: &Path,
) -> Result<RunSummary, RunError> {
    let (tables, dispatch) = validate_events(config, input)?;
    info!(
        "Processed {} events ({} charged-current): {} resonant rows, {} QE/MEC rows",
        dispatch.events, dispatch.charged_current, dispatch.resonant_rows, dispatch.qe_mec_rows
    );
    tables.write_root(output)?;
    info!("Wrote {:?} to {:?}", tables.tree_names(), output);
    Ok(RunSummary {
        dispatch,
        trees: tables.tree_names(),
    })
}
