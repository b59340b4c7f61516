use crate::config::AmlConfig;
use crate::rule::{AmlRule, RiskLevel, RuleHit, ScreeningRequest};

/// Flags transfers touching a configured high-risk jurisdiction.
pub struct HighRiskJurisdictionRule;

impl AmlRule for HighRiskJurisdictionRule {
    fn name(&self) -> &str {
        "high-risk-jurisdiction"
    }

    fn evaluate(&self, request: &ScreeningRequest, config: &AmlConfig) -> Option<RuleHit> {
        config
            .is_high_risk_country(&request.country_code)
            .then(|| RuleHit::new("HIGH_RISK_JURISDICTION", RiskLevel::High))
    }
}
