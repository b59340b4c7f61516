use crate::config::AmlConfig;
use crate::rule::{AmlRule, RiskLevel, RuleHit, ScreeningRequest};

/// Amount strictly above `high_value_threshold`.
pub struct HighValueRule;

impl AmlRule for HighValueRule {
    fn name(&self) -> &str {
        "high-value"
    }

    fn evaluate(&self, request: &ScreeningRequest, config: &AmlConfig) -> Option<RuleHit> {
        (request.amount > config.high_value_threshold)
            .then(|| RuleHit::new("HIGH_VALUE_TRANSACTION", RiskLevel::Medium))
    }
}

/// Amount just under the reporting threshold, inside the open band
/// `(structuring_floor, structuring_ceiling)`.
pub struct StructuringRule;

impl AmlRule for StructuringRule {
    fn name(&self) -> &str {
        "structuring"
    }

    fn evaluate(&self, request: &ScreeningRequest, config: &AmlConfig) -> Option<RuleHit> {
        (request.amount > config.structuring_floor && request.amount < config.structuring_ceiling)
            .then(|| RuleHit::new("POTENTIAL_STRUCTURING", RiskLevel::High))
    }
}

/// Amount strictly above `daily_limit`.
pub struct DailyLimitRule;

impl AmlRule for DailyLimitRule {
    fn name(&self) -> &str {
        "daily-limit"
    }

    fn evaluate(&self, request: &ScreeningRequest, config: &AmlConfig) -> Option<RuleHit> {
        (request.amount > config.daily_limit)
            .then(|| RuleHit::new("EXCEEDS_DAILY_LIMIT", RiskLevel::Critical))
    }
}
