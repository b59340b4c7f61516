use std::fmt;

use finarch_types::Amount;
use serde::{Deserialize, Serialize};

use crate::config::AmlConfig;

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Risk classification of a screened transfer, in increasing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// ScreeningRequest / ScreeningResult
// ---------------------------------------------------------------------------

/// A single transfer presented for screening.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningRequest {
    pub amount: Amount,
    pub currency: String,
    pub sender: String,
    pub receiver: String,
    pub country_code: String,
}

impl ScreeningRequest {
    /// Request in the default currency.
    pub fn new(
        amount: Amount,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            currency: AmlConfig::default().currency,
            sender: sender.into(),
            receiver: receiver.into(),
            country_code: country_code.into(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// Outcome of screening one request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningResult {
    /// False only for [`RiskLevel::Critical`].
    pub is_valid: bool,
    pub risk_level: RiskLevel,
    /// Flags in the order their rules fired.
    pub flags: Vec<String>,
    /// True for [`RiskLevel::High`] and above.
    pub requires_manual_review: bool,
}

impl ScreeningResult {
    pub fn from_hits(hits: Vec<RuleHit>) -> Self {
        let mut risk_level = RiskLevel::Low;
        let mut flags = Vec::with_capacity(hits.len());
        for hit in hits {
            // Each firing rule sets the level outright; the last one wins.
            risk_level = hit.risk;
            flags.push(hit.flag);
        }
        Self {
            is_valid: risk_level != RiskLevel::Critical,
            risk_level,
            flags,
            requires_manual_review: risk_level >= RiskLevel::High,
        }
    }
}

// ---------------------------------------------------------------------------
// AmlRule trait
// ---------------------------------------------------------------------------

/// A rule that fired.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleHit {
    pub flag: String,
    pub risk: RiskLevel,
}

impl RuleHit {
    pub fn new(flag: impl Into<String>, risk: RiskLevel) -> Self {
        Self {
            flag: flag.into(),
            risk,
        }
    }
}

/// A single screening rule.
///
/// Rules are evaluated in order and all of them run; a rule returns `Some`
/// when it fires. The trait is object-safe so rules can be stored in a
/// `Vec<Box<dyn AmlRule>>`.
pub trait AmlRule: Send + Sync {
    fn name(&self) -> &str;

    fn evaluate(&self, request: &ScreeningRequest, config: &AmlConfig) -> Option<RuleHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn later_hit_overrides_earlier() {
        let result = ScreeningResult::from_hits(vec![
            RuleHit::new("A", RiskLevel::High),
            RuleHit::new("B", RiskLevel::Medium),
        ]);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.flags, vec!["A", "B"]);
        assert!(!result.requires_manual_review);
        assert!(result.is_valid);
    }

    #[test]
    fn no_hits_is_clean() {
        let result = ScreeningResult::from_hits(Vec::new());
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.flags.is_empty());
        assert!(result.is_valid);
    }

    #[test]
    fn risk_level_serializes_upper_case() {
        assert_eq!(serde_json::to_string(&RiskLevel::Critical).unwrap(), r#""CRITICAL""#);
    }
}
