use thiserror::Error;
use tracing::{debug, info};

use crate::classify::classify;
use crate::event::EventRecord;
use crate::parameter::{ParamId, ValidationParameters};
use crate::response::{EventResponse, ResponseEngine, ResponseError};
use crate::tables::{OutputTables, QeMecRow, ResonantRow, N_2P2H_UNIVERSES};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("Event #{event}: {source}")]
    Response {
        event: usize,
        source: ResponseError,
    },
    #[error(
        "Event #{event}: parameter {param} returned {found} universe responses, expected {expected}"
    )]
    UniverseCount {
        event: usize,
        param: ParamId,
        expected: usize,
        found: usize,
    },
}

/// Per-run counters, reported once the input is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    pub events: usize,
    pub charged_current: usize,
    pub resonant_rows: usize,
    pub qe_mec_rows: usize,
}

/// Routes classified events into the live validation tables.
pub struct Validator<E: ResponseEngine> {
    engine: E,
    tables: OutputTables,
    summary: DispatchSummary,
}

impl<E: ResponseEngine> Validator<E> {
    pub fn new(params: &ValidationParameters, engine: E) -> Self {
        Self {
            engine,
            tables: OutputTables::for_parameters(params),
            summary: DispatchSummary::default(),
        }
    }

    pub fn tables(&self) -> &OutputTables {
        &self.tables
    }

    pub fn summary(&self) -> DispatchSummary {
        self.summary
    }

    pub fn process(&mut self, index: usize, event: &EventRecord) -> Result<(), DispatchError> {
        //! Handle one event: compute its responses, gate on charged current, and append at most
        //! one row to each table whose regime test passes.
        //!
        //! # Errors
        //! Any response that can't be retrieved, or a 2p2h response whose universe count isn't
        //! [`N_2P2H_UNIVERSES`], is returned as a [`DispatchError`]. Nothing is appended for the
        //! failing event.
        self.summary.events += 1;
        info!("Event #{index}, Interaction: {}", event.summary());

        let response = self
            .engine
            .event_responses(event)
            .map_err(|source| DispatchError::Response {
                event: index,
                source,
            })?;
        info!("Response = \n{response}");

        let Some(regimes) = classify(event) else {
            return Ok(());
        };
        self.summary.charged_current += 1;

        let resonant_row = match &self.tables.resonant {
            Some(table) if regimes.resonant => Some(ResonantRow {
                w: event.w,
                weight: single(&response, table.param, index)?,
                neut_code: event.neut_code,
            }),
            _ => None,
        };
        let qe_mec_row = match &self.tables.qe_mec {
            Some(table) if regimes.qe_mec => {
                let mut row = QeMecRow {
                    q0: event.q0(),
                    q3: event.q3(),
                    qe_like_target: event.qe_like_target().code(),
                    ..Default::default()
                };
                if let Some(param) = table.rpa {
                    row.weight_rpa = single(&response, param, index)?;
                }
                if let Some(param) = table.two_p_two_h {
                    row.weight_2p2h = universes(&response, param, index)?;
                }
                Some(row)
            }
            _ => None,
        };

        if let (Some(row), Some(table)) = (resonant_row, self.tables.resonant.as_mut()) {
            table.push(row);
            self.summary.resonant_rows += 1;
        }
        if let (Some(row), Some(table)) = (qe_mec_row, self.tables.qe_mec.as_mut()) {
            table.push(row);
            self.summary.qe_mec_rows += 1;
        }
        Ok(())
    }

    pub fn run<I>(mut self, events: I) -> Result<(OutputTables, DispatchSummary), DispatchError>
    where
        I: IntoIterator<Item = EventRecord>,
    {
        //! Drain `events` in order, stopping at the first error.
        for (index, event) in events.into_iter().enumerate() {
            self.process(index, &event)?;
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> (OutputTables, DispatchSummary) {
        (self.tables, self.summary)
    }
}

fn single(response: &EventResponse, param: ParamId, event: usize) -> Result<f64, DispatchError> {
    response
        .discrete_response(param, 0)
        .map_err(|source| DispatchError::Response { event, source })
}

fn universes(
    response: &EventResponse,
    param: ParamId,
    event: usize,
) -> Result<[f64; N_2P2H_UNIVERSES], DispatchError> {
    let values = response
        .discrete_responses(param)
        .map_err(|source| DispatchError::Response { event, source })?;
    debug!("2p2h response size = {}", values.len());
    <[f64; N_2P2H_UNIVERSES]>::try_from(values).map_err(|_| DispatchError::UniverseCount {
        event,
        param,
        expected: N_2P2H_UNIVERSES,
        found: values.len(),
    })
}
