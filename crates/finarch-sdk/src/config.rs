use std::path::Path;

use finarch_chain::ChainConfig;
use finarch_gate::AmlConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Top-level configuration, usually read from a TOML file.
///
/// ```toml
/// screening = true
///
/// [chain]
/// difficulty = 4
/// workers = 4
///
/// [aml]
/// daily_limit = "100000"
/// high_risk_countries = ["XX", "YY", "ZZ"]
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinArchConfig {
    /// Attach the AML gate to the ledger.
    pub screening: bool,
    /// Mirror ledger mutations into an event store.
    pub record_events: bool,
    pub chain: ChainConfig,
    pub aml: AmlConfig,
}

impl FinArchConfig {
    /// Screening and event recording switched on.
    pub fn full() -> Self {
        Self {
            screening: true,
            record_events: true,
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> SdkResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SdkError::Config(format!("{}: {e}", path.display()))),
        }
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use finarch_types::Amount;

    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(FinArchConfig::from_toml_str("").unwrap(), FinArchConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = FinArchConfig::from_toml_str(
            r#"
screening = true

[chain]
difficulty = 3
workers = 2

[aml]
daily_limit = "250000"
"#,
        )
        .unwrap();
        assert!(config.screening);
        assert!(!config.record_events);
        assert_eq!(config.chain.difficulty, 3);
        assert_eq!(config.chain.genesis_proof, 100);
        assert_eq!(config.aml.daily_limit, Amount::from(250_000));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = FinArchConfig::from_toml_str("chain = 5").unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = FinArchConfig::load(Path::new("/nonexistent/finarch.toml")).unwrap();
        assert_eq!(config, FinArchConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let config = FinArchConfig::full();
        let text = config.to_toml_string().unwrap();
        assert_eq!(FinArchConfig::from_toml_str(&text).unwrap(), config);
    }
}
