//! Configuration for how gas concentrations are completed and decomposed.
//!
//! The configuration file uses [TOML format](https://toml.io/en/). All keys are
//! optional:
//!
//! ```toml
//! # Number of columns per tile when splitting the domain
//! tile_size = 64
//!
//! # Gases that must be supplied by the caller; defaults do not count
//! required = ["h2o", "o3"]
//!
//! # Scalar VMRs to use for gases the caller did not supply
//! [defaults]
//! o2 = 0.2095
//! n2 = 0.7808
//! co2 = 4.0e-4
//! ```
//!
//! A gas listed in both `required` and `[defaults]` is checked after the
//! defaults are applied, so list it in only one place.
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use error_stack::ResultExt;
use indexmap::IndexMap;
use itertools::Itertools;
use num_traits::{Float, NumCast};
use serde::Deserialize;

use crate::gas_concs::GasConcs;
use crate::vmr::VmrInput;

const DEFAULT_TILE_SIZE: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading configuration file: {}", .0.display())]
    Read(PathBuf),
    #[error("Error parsing configuration")]
    Parse,
    #[error("Default VMR {value} for gas '{gas}' cannot be represented at the working precision")]
    Unrepresentable { gas: String, value: f64 },
    #[error("Could not apply default VMR for gas '{0}'")]
    ApplyDefault(String),
    #[error("Required gases are missing: {}", .0.join(", "))]
    MissingGas(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GasConcsConfig {
    /// Number of columns per tile when splitting the domain.
    #[serde(default = "default_tile_size")]
    pub tile_size: NonZeroUsize,

    /// Scalar VMRs for gases the caller may leave out, keyed by gas name.
    #[serde(default)]
    pub defaults: IndexMap<String, f64>,

    /// Gases the caller must supply.
    #[serde(default)]
    pub required: Vec<String>,
}

fn default_tile_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_TILE_SIZE).unwrap_or(NonZeroUsize::MIN)
}

impl Default for GasConcsConfig {
    fn default() -> Self {
        Self { tile_size: default_tile_size(), defaults: IndexMap::new(), required: vec![] }
    }
}

impl GasConcsConfig {
    pub fn from_toml_str(s: &str) -> error_stack::Result<Self, ConfigError> {
        toml::from_str(s).change_context(ConfigError::Parse)
    }

    pub fn from_file(p: &Path) -> error_stack::Result<Self, ConfigError> {
        let buf = std::fs::read_to_string(p).change_context_lazy(|| ConfigError::Read(p.to_path_buf()))?;
        Self::from_toml_str(&buf).attach_printable_lazy(|| format!("in file {}", p.display()))
    }

    /// Insert the default VMR for every configured gas that `concs` does not already have.
    ///
    /// Gases the caller supplied are never overwritten. All defaults are converted to
    /// the working precision before any are inserted, so on error `concs` is unchanged.
    ///
    /// # Returns
    /// The names of the gases that were filled in, in configuration order.
    pub fn apply_defaults<F: Float>(&self, concs: &mut GasConcs<F>) -> error_stack::Result<Vec<String>, ConfigError> {
        let to_fill: Vec<(&String, F, f64)> = self
            .defaults
            .iter()
            .filter(|(gas, _)| !concs.exists(gas))
            .map(|(gas, &value)| {
                if gas.is_empty() {
                    return Err(ConfigError::ApplyDefault(gas.clone()));
                }
                let v = <F as NumCast>::from(value)
                    .filter(|v| v.is_finite() || !value.is_finite())
                    .ok_or_else(|| ConfigError::Unrepresentable { gas: gas.clone(), value })?;
                Ok((gas, v, value))
            })
            .try_collect()?;

        let mut filled = Vec::with_capacity(to_fill.len());
        for (gas, v, value) in to_fill {
            concs
                .set_vmr(gas.as_str(), VmrInput::Scalar(v))
                .change_context_lazy(|| ConfigError::ApplyDefault(gas.clone()))?;
            log::info!("Gas '{gas}' was not supplied, using default VMR {value}");
            filled.push(gas.clone());
        }
        Ok(filled)
    }

    /// Check that every required gas is present in `concs`.
    pub fn check_required<F: Float>(&self, concs: &GasConcs<F>) -> error_stack::Result<(), ConfigError> {
        let missing = self.required.iter().filter(|gas| !concs.exists(gas)).cloned().collect_vec();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingGas(missing).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_concs;
    use crate::vmr::VmrKind;

    const EXAMPLE_CONFIG: &str = r#"
tile_size = 4
required = ["co2", "ch4"]

[defaults]
o2 = 0.2095
n2 = 0.7808
"#;

    #[test]
    fn test_parse_config() {
        let config = GasConcsConfig::from_toml_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.tile_size.get(), 4);
        assert_eq!(config.required, vec!["co2".to_string(), "ch4".to_string()]);
        assert_eq!(config.defaults.keys().collect_vec(), vec!["o2", "n2"]);
        approx::assert_abs_diff_eq!(config.defaults["o2"], 0.2095);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GasConcsConfig::from_toml_str("").unwrap();
        assert_eq!(config, GasConcsConfig::default());
        assert_eq!(config.tile_size.get(), 64);
    }

    #[test]
    fn test_bad_configs_rejected() {
        let err = GasConcsConfig::from_toml_str("tile_size = 0").unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::Parse));
        let err = GasConcsConfig::from_toml_str("tile_sise = 8").unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::Parse));
    }

    #[test]
    fn test_missing_file() {
        let p = Path::new("/nonexistent/gas_concs.toml");
        let err = GasConcsConfig::from_file(p).unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::Read(_)));
    }

    #[test]
    fn test_apply_defaults_fills_only_missing() {
        let mut config = GasConcsConfig::from_toml_str(EXAMPLE_CONFIG).unwrap();
        // n2 is already in the sample set as 3.5e-4 and must not be replaced
        let mut concs = sample_concs();
        let filled = config.apply_defaults(&mut concs).unwrap();
        assert_eq!(filled, vec!["o2".to_string()]);
        assert_eq!(concs.kind("o2"), Some(VmrKind::Scalar));
        assert!(concs.get_vmr("o2").unwrap().iter().all(|&v| v == 0.2095));
        assert!(concs.get_vmr("n2").unwrap().iter().all(|&v| v == 3.5e-4));

        // Applying again is a no-op
        assert!(config.apply_defaults(&mut concs).unwrap().is_empty());

        config.defaults.insert("cfc11".to_string(), 2.3e-10);
        let mut concs32 = GasConcs::<f32>::with_dims(2, 3).unwrap();
        let filled = config.apply_defaults(&mut concs32).unwrap();
        assert_eq!(filled, vec!["o2".to_string(), "n2".to_string(), "cfc11".to_string()]);
        approx::assert_relative_eq!(concs32.get_vmr("cfc11").unwrap()[[1, 2]], 2.3e-10_f32, max_relative = 1e-6);
    }

    #[test]
    fn test_apply_defaults_unrepresentable() {
        let mut config = GasConcsConfig::default();
        config.defaults.insert("o2".to_string(), 0.2095);
        config.defaults.insert("xx".to_string(), 1e300);
        let mut concs = GasConcs::<f32>::new();
        let err = config.apply_defaults(&mut concs).unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::Unrepresentable { .. }));
        assert!(concs.is_empty(), "no defaults should be applied when one fails");
    }

    #[test]
    fn test_check_required() {
        let mut config = GasConcsConfig::from_toml_str(EXAMPLE_CONFIG).unwrap();
        let concs = sample_concs();
        config.check_required(&concs).unwrap();

        config.required.push("o3".to_string());
        config.required.push("h2o".to_string());
        let err = config.check_required(&concs).unwrap_err();
        match err.current_context() {
            ConfigError::MissingGas(missing) => assert_eq!(missing, &vec!["o3".to_string(), "h2o".to_string()]),
            other => panic!("Expected MissingGas, got {other:?}"),
        }
    }
}
