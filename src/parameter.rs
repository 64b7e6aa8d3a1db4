use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::classify::Regime;
use crate::config::RunConfig;

pub const MK_SPP_RESPONSE: &str = "MKSPP_Enuq0q3_response";
pub const MINERVA_RPA: &str = "MINERvATune_RPA";
pub const MINERVA_2P2H: &str = "MINERvATune_2p2hGaussEnhancement";

/// Opaque handle to one configured systematic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(pub u32);

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a run knows about one configured parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct SystParamHeader {
    pub id: ParamId,
    pub name: String,
    pub central_value: f64,
    pub variations: Vec<f64>,
    pub applies_to: Vec<Regime>,
    pub n_universes: usize,
}

impl fmt::Display for SystParamHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{ name: {}, id: {}", self.name, self.id)?;
        writeln!(f, "  central value: {}", self.central_value)?;
        if !self.variations.is_empty() {
            let variations: Vec<String> = self.variations.iter().map(|v| v.to_string()).collect();
            writeln!(f, "  variations: [{}]", variations.join(", "))?;
        }
        writeln!(f, "  universes: {}", self.n_universes)?;
        if !self.applies_to.is_empty() {
            writeln!(f, "  applies to: {:?}", self.applies_to)?;
        }
        write!(f, "}}")
    }
}

/// Answers "is parameter X configured in this run?".
pub trait ParameterRegistry {
    fn header_id(&self, name: &str) -> Option<ParamId>;
    fn header(&self, id: ParamId) -> Option<&SystParamHeader>;
    fn have_header(&self, name: &str) -> bool {
        self.header_id(name).is_some()
    }
}

/// A [`ParameterRegistry`] built from the parameters declared in a [`RunConfig`], in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct SystRegistry {
    headers: IndexMap<String, SystParamHeader>,
}

impl SystRegistry {
    pub fn from_config(config: &RunConfig) -> Self {
        //! Build the registry. `config` is assumed validated, so names and ids are unique.
        let headers = config
            .parameters
            .iter()
            .enumerate()
            .map(|(index, par)| {
                let header = SystParamHeader {
                    id: ParamId(par.resolved_id(index)),
                    name: par.name.clone(),
                    central_value: par.central_value,
                    variations: par.variations.clone(),
                    applies_to: par.applies_to.clone(),
                    n_universes: par.responses.len(),
                };
                (par.name.clone(), header)
            })
            .collect();
        Self { headers }
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn header_info(&self) -> String {
        //! Human-readable listing of every loaded parameter header.
        if self.headers.is_empty() {
            return "(no parameters configured)".to_string();
        }
        self.headers
            .values()
            .map(|header| header.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ParameterRegistry for SystRegistry {
    fn header_id(&self, name: &str) -> Option<ParamId> {
        self.headers.get(name).map(|header| header.id)
    }

    fn header(&self, id: ParamId) -> Option<&SystParamHeader> {
        self.headers.values().find(|header| header.id == id)
    }
}

/// The parameters the validation tables are built from, resolved once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationParameters {
    pub mk_spp: Option<ParamId>,
    pub mnv_rpa: Option<ParamId>,
    pub mnv_2p2h: Option<ParamId>,
}

impl ValidationParameters {
    pub fn resolve<R: ParameterRegistry + ?Sized>(registry: &R) -> Self {
        //! Look up each validation parameter by name. Missing parameters resolve to `None`.
        let resolved = Self {
            mk_spp: registry.header_id(MK_SPP_RESPONSE),
            mnv_rpa: registry.header_id(MINERVA_RPA),
            mnv_2p2h: registry.header_id(MINERVA_2P2H),
        };
        debug!(
            "resolved validation parameters: {MK_SPP_RESPONSE} = {:?}, {MINERVA_RPA} = {:?}, {MINERVA_2P2H} = {:?}",
            resolved.mk_spp, resolved.mnv_rpa, resolved.mnv_2p2h
        );
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ParameterConfig, UniverseResponse};

    fn par(name: &str, id: Option<u32>, universes: usize) -> ParameterConfig {
        ParameterConfig {
            name: name.to_string(),
            id,
            central_value: 0.0,
            variations: vec![],
            applies_to: vec![],
            responses: vec![UniverseResponse::Constant(1.0); universes],
        }
    }

    #[test]
    fn registry_assigns_ids() {
        let config = RunConfig {
            parameters: vec![par("a", None, 1), par("b", Some(10), 4), par("c", None, 1)],
            ..Default::default()
        };
        let registry = SystRegistry::from_config(&config);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.header_id("a"), Some(ParamId(0)));
        assert_eq!(registry.header_id("b"), Some(ParamId(10)));
        assert_eq!(registry.header_id("c"), Some(ParamId(2)));
        assert_eq!(registry.header_id("d"), None);
        assert!(registry.have_header("b"));
        assert_eq!(registry.header(ParamId(10)).unwrap().n_universes, 4);
        assert!(registry.header_info().contains("name: b, id: 10"));
    }

    #[test]
    fn resolve_only_configured() {
        let config = RunConfig {
            parameters: vec![par("unrelated", None, 1), par(MINERVA_RPA, None, 1)],
            ..Default::default()
        };
        let registry = SystRegistry::from_config(&config);
        let params = ValidationParameters::resolve(&registry);
        assert_eq!(
            params,
            ValidationParameters {
                mk_spp: None,
                mnv_rpa: Some(ParamId(1)),
                mnv_2p2h: None,
            }
        );
    }

    #[test]
    fn empty_registry() {
        let registry = SystRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(
            ValidationParameters::resolve(&registry),
            ValidationParameters::default()
        );
        assert_eq!(registry.header_info(), "(no parameters configured)");
    }
}
