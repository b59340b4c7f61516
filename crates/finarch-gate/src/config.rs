use finarch_types::Amount;
use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Thresholds and lists used by the built-in AML rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmlConfig {
    /// Amounts strictly above this are high value.
    pub high_value_threshold: Amount,
    /// Amounts strictly above this are refused outright.
    pub daily_limit: Amount,
    /// Exclusive lower bound of the structuring band.
    pub structuring_floor: Amount,
    /// Exclusive upper bound of the structuring band.
    pub structuring_ceiling: Amount,
    /// ISO country codes treated as high-risk jurisdictions.
    pub high_risk_countries: Vec<String>,
    /// Country assumed for ledger postings, which carry none.
    pub default_country: String,
    pub currency: String,
}

impl Default for AmlConfig {
    fn default() -> Self {
        Self {
            high_value_threshold: Amount::from(50_000),
            daily_limit: Amount::from(100_000),
            structuring_floor: Amount::from(9_000),
            structuring_ceiling: Amount::from(10_000),
            high_risk_countries: vec!["XX".into(), "YY".into(), "ZZ".into()],
            default_country: "TR".into(),
            currency: "TRY".into(),
        }
    }
}

impl AmlConfig {
    pub fn validate(&self) -> Result<(), GateError> {
        if self.structuring_floor >= self.structuring_ceiling {
            return Err(GateError::Config(format!(
                "structuring band is empty: {} .. {}",
                self.structuring_floor, self.structuring_ceiling
            )));
        }
        if self.high_value_threshold > self.daily_limit {
            return Err(GateError::Config(format!(
                "high value threshold {} exceeds daily limit {}",
                self.high_value_threshold, self.daily_limit
            )));
        }
        Ok(())
    }

    pub fn is_high_risk_country(&self, code: &str) -> bool {
        self.high_risk_countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(code.trim()))
    }
}
