use std::fmt;

use indexmap::IndexMap;
use thiserror::Error;

use crate::classify::Regime;
use crate::config::{BinnedResponse, KinematicVariable, RunConfig, UniverseResponse};
use crate::event::EventRecord;
use crate::parameter::ParamId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    #[error("No response for parameter {param} in this event")]
    MissingParameter { param: ParamId },
    #[error("Parameter {param} has {n_universes} universes, cannot read universe {index}")]
    UniverseOutOfRange {
        param: ParamId,
        index: usize,
        n_universes: usize,
    },
    #[error("Response engine failed: {0}")]
    Engine(String),
}

/// The per-event bundle of responses, one value per universe for each parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventResponse {
    responses: IndexMap<ParamId, Vec<f64>>,
}

impl EventResponse {
    pub fn discrete_responses(&self, param: ParamId) -> Result<&[f64], ResponseError> {
        //! All universe responses for `param`.
        //!
        //! # Errors
        //! [`ResponseError::MissingParameter`] if the engine produced nothing for `param`.
        self.responses
            .get(&param)
            .map(Vec::as_slice)
            .ok_or(ResponseError::MissingParameter { param })
    }

    pub fn discrete_response(&self, param: ParamId, index: usize) -> Result<f64, ResponseError> {
        //! The response of universe `index` for `param`.
        let responses = self.discrete_responses(param)?;
        responses
            .get(index)
            .copied()
            .ok_or(ResponseError::UniverseOutOfRange {
                param,
                index,
                n_universes: responses.len(),
            })
    }
}

impl FromIterator<(ParamId, Vec<f64>)> for EventResponse {
    fn from_iter<T: IntoIterator<Item = (ParamId, Vec<f64>)>>(iter: T) -> Self {
        Self {
            responses: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for EventResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.responses.is_empty() {
            return write!(f, "{{ }}");
        }
        for (i, (param, values)) in self.responses.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let values: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
            write!(f, "  {{ param: {param}, responses: [{}] }}", values.join(", "))?;
        }
        Ok(())
    }
}

/// Computes the responses of every configured parameter for one event.
pub trait ResponseEngine {
    fn event_responses(&self, event: &EventRecord) -> Result<EventResponse, ResponseError>;
}

impl<E: ResponseEngine + ?Sized> ResponseEngine for &E {
    fn event_responses(&self, event: &EventRecord) -> Result<EventResponse, ResponseError> {
        (**self).event_responses(event)
    }
}

impl KinematicVariable {
    pub fn value(&self, event: &EventRecord) -> f64 {
        match self {
            Self::W => event.w,
            Self::Q0 => event.q0(),
            Self::Q3 => event.q3(),
            Self::Enu => event.enu(),
        }
    }
}

impl BinnedResponse {
    pub fn lookup(&self, x: f64) -> f64 {
        //! Piecewise-constant lookup; bins are closed below and open above. Anything outside the
        //! edges, or `NaN`, is the neutral weight `1.0`.
        let (Some(&lo), Some(&hi)) = (self.edges.first(), self.edges.last()) else {
            return 1.0;
        };
        if !(lo..hi).contains(&x) {
            return 1.0;
        }
        let bin = self.edges.partition_point(|&edge| edge <= x) - 1;
        self.values.get(bin).copied().unwrap_or(1.0)
    }
}

impl UniverseResponse {
    pub fn evaluate(&self, event: &EventRecord) -> f64 {
        match self {
            Self::Constant(value) => *value,
            Self::Binned(binned) => binned.lookup(binned.variable.value(event)),
        }
    }
}

#[derive(Debug, Clone)]
struct TabulatedParameter {
    id: ParamId,
    applies_to: Vec<Regime>,
    universes: Vec<UniverseResponse>,
}

impl TabulatedParameter {
    fn applies(&self, event: &EventRecord) -> bool {
        self.applies_to.is_empty()
            || Regime::of(event)
                .iter()
                .any(|regime| self.applies_to.contains(regime))
    }
}

/// A [`ResponseEngine`] whose responses are tabulated in the run configuration.
#[derive(Debug, Clone, Default)]
pub struct TabulatedEngine {
    parameters: Vec<TabulatedParameter>,
}

impl TabulatedEngine {
    pub fn from_config(config: &RunConfig) -> Self {
        let parameters = config
            .parameters
            .iter()
            .enumerate()
            .map(|(index, par)| TabulatedParameter {
                id: ParamId(par.resolved_id(index)),
                applies_to: par.applies_to.clone(),
                universes: par.responses.clone(),
            })
            .collect();
        Self { parameters }
    }
}

impl ResponseEngine for TabulatedEngine {
    fn event_responses(&self, event: &EventRecord) -> Result<EventResponse, ResponseError> {
        Ok(self
            .parameters
            .iter()
            .map(|par| {
                let values = if par.applies(event) {
                    par.universes.iter().map(|u| u.evaluate(event)).collect()
                } else {
                    vec![1.0; par.universes.len()]
                };
                (par.id, values)
            })
            .collect())
    }
}
