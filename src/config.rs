//! Run configuration (YAML).
//!
//! The configuration declares which systematic parameters exist for a run and how their
//! responses are tabulated, plus the diagnostic verbosity. A parameter that is not listed is
//! simply not configured; that is never an error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::classify::Regime;
use crate::logging::LoggingConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse configuration {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml_ng::Error,
    },
    #[error("Parameter #{index} has an empty name")]
    EmptyName { index: usize },
    #[error("Parameter {name:?} is declared more than once")]
    DuplicateName { name: String },
    #[error("Parameter id {id} is used by both {first:?} and {second:?}")]
    DuplicateId {
        id: u32,
        first: String,
        second: String,
    },
    #[error("Parameter {name:?} declares no responses")]
    NoResponses { name: String },
    #[error("Parameter {name:?}, universe {universe}: {reason}")]
    InvalidResponse {
        name: String,
        universe: usize,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterConfig {
    pub name: String,
    /// Explicit identifier; defaults to the position in the parameter list.
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub central_value: f64,
    /// Parameter values of each universe, for display only.
    #[serde(default)]
    pub variations: Vec<f64>,
    /// Regimes this parameter responds to. Empty means every event.
    #[serde(default)]
    pub applies_to: Vec<Regime>,
    pub responses: Vec<UniverseResponse>,
}

/// The response of one universe: a flat weight or a lookup in one event variable.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UniverseResponse {
    Constant(f64),
    Binned(BinnedResponse),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinnedResponse {
    pub variable: KinematicVariable,
    pub edges: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KinematicVariable {
    W,
    Q0,
    Q3,
    Enu,
}

impl RunConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        //! Read and validate a configuration file.
        //!
        //! # Errors
        //! Returns [`ConfigError`] if the file can't be read, isn't valid YAML for this schema, or
        //! fails validation (see [`RunConfig::validate`]).
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig =
            serde_yaml_ng::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        let mut ids: Vec<(u32, &str)> = Vec::with_capacity(self.parameters.len());
        for (index, par) in self.parameters.iter().enumerate() {
            if par.name.trim().is_empty() {
                return Err(ConfigError::EmptyName { index });
            }
            if !names.insert(par.name.as_str()) {
                return Err(ConfigError::DuplicateName {
                    name: par.name.clone(),
                });
            }
            let id = par.resolved_id(index);
            if let Some((_, first)) = ids.iter().find(|(other, _)| *other == id) {
                return Err(ConfigError::DuplicateId {
                    id,
                    first: first.to_string(),
                    second: par.name.clone(),
                });
            }
            ids.push((id, par.name.as_str()));
            par.validate()?;
        }
        Ok(())
    }
}

impl ParameterConfig {
    pub fn resolved_id(&self, index: usize) -> u32 {
        self.id.unwrap_or(index as u32)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.responses.is_empty() {
            return Err(ConfigError::NoResponses {
                name: self.name.clone(),
            });
        }
        let invalid = |universe: usize, reason: String| ConfigError::InvalidResponse {
            name: self.name.clone(),
            universe,
            reason,
        };
        for (universe, response) in self.responses.iter().enumerate() {
            match response {
                UniverseResponse::Constant(value) => {
                    if !value.is_finite() {
                        return Err(invalid(universe, format!("weight {value} is not finite")));
                    }
                }
                UniverseResponse::Binned(binned) => {
                    if binned.edges.len() < 2 {
                        return Err(invalid(universe, "fewer than two bin edges".to_string()));
                    }
                    if binned.values.len() + 1 != binned.edges.len() {
                        return Err(invalid(
                            universe,
                            format!(
                                "{} values for {} bins",
                                binned.values.len(),
                                binned.edges.len() - 1
                            ),
                        ));
                    }
                    if binned.edges.iter().any(|e| !e.is_finite())
                        || binned.values.iter().any(|v| !v.is_finite())
                    {
                        return Err(invalid(universe, "non-finite edge or value".to_string()));
                    }
                    if binned.edges.windows(2).any(|pair| pair[0] >= pair[1]) {
                        return Err(invalid(
                            universe,
                            "bin edges are not strictly increasing".to_string(),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;

    const FULL: &str = r#"
logging:
  level: warn
parameters:
  - name: MKSPP_Enuq0q3_response
    responses: [1.1]
  - name: MINERvATune_2p2hGaussEnhancement
    id: 7
    central_value: 0.0
    variations: [0, 1, 2, 3]
    applies_to: [mec]
    responses:
      - 1.0
      - { variable: q3, edges: [0.0, 0.5, 1.2], values: [1.3, 1.1] }
      - 0.9
      - 1.0
"#;

    fn parse(text: &str) -> Result<RunConfig, ConfigError> {
        let config: RunConfig =
            serde_yaml_ng::from_str(text).map_err(|source| ConfigError::Parse {
                path: PathBuf::from("inline"),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn parses_full_config() {
        let config = parse(FULL).unwrap();
        assert_eq!(config.logging.level, Verbosity::Warn);
        assert_eq!(config.parameters.len(), 2);
        assert_eq!(config.parameters[0].resolved_id(0), 0);
        assert_eq!(config.parameters[1].resolved_id(1), 7);
        assert_eq!(config.parameters[1].applies_to, vec![Regime::Mec]);
        assert_eq!(
            config.parameters[1].responses[1],
            UniverseResponse::Binned(BinnedResponse {
                variable: KinematicVariable::Q3,
                edges: vec![0.0, 0.5, 1.2],
                values: vec![1.3, 1.1],
            })
        );
    }

    #[test]
    fn empty_config_is_valid() {
        let config = parse("{}").unwrap();
        assert!(config.parameters.is_empty());
        assert_eq!(config.logging.level, Verbosity::Info);
    }

    #[test]
    fn rejects_duplicates() {
        let text = "parameters:\n  - {name: a, responses: [1]}\n  - {name: a, responses: [1]}\n";
        assert!(matches!(parse(text), Err(ConfigError::DuplicateName { .. })));
        let text = "parameters:\n  - {name: a, id: 1, responses: [1]}\n  - {name: b, responses: [1]}\n";
        assert!(matches!(parse(text), Err(ConfigError::DuplicateId { id: 1, .. })));
    }

    #[test]
    fn rejects_bad_bins() {
        let text = "parameters:\n  - name: a\n    responses:\n      - {variable: w, edges: [1.0, 0.5], values: [1.0]}\n";
        assert!(matches!(parse(text), Err(ConfigError::InvalidResponse { .. })));
        let text = "parameters:\n  - name: a\n    responses:\n      - {variable: w, edges: [0.0, 0.5], values: [1.0, 2.0]}\n";
        assert!(matches!(parse(text), Err(ConfigError::InvalidResponse { .. })));
        let text = "parameters:\n  - {name: a, responses: []}\n";
        assert!(matches!(parse(text), Err(ConfigError::NoResponses { .. })));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            parse("paramters: []"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("syst.yaml");
        std::fs::write(&path, FULL).unwrap();
        let config = RunConfig::from_path(&path).unwrap();
        assert_eq!(config.parameters.len(), 2);
        assert!(matches!(
            RunConfig::from_path(&dir.path().join("missing.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
