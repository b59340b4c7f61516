use tracing::{debug, info};

use crate::config::AmlConfig;
use crate::error::GateError;
use crate::rule::{AmlRule, ScreeningRequest, ScreeningResult};
use crate::rules::{DailyLimitRule, HighRiskJurisdictionRule, HighValueRule, StructuringRule};

/// Ordered AML rule pipeline.
///
/// Unlike a fail-fast gate, every rule runs so that the result carries all
/// flags that apply.
pub struct AmlScreener {
    rules: Vec<Box<dyn AmlRule>>,
    config: AmlConfig,
}

impl AmlScreener {
    /// Create a screener with an empty rule list.
    pub fn new(config: AmlConfig) -> Self {
        Self {
            rules: Vec::new(),
            config,
        }
    }

    /// Create a screener with the standard rules:
    /// HighValue -> HighRiskJurisdiction -> Structuring -> DailyLimit
    pub fn with_default_rules(config: AmlConfig) -> Self {
        let mut screener = Self::new(config);
        screener.add_rule(Box::new(HighValueRule));
        screener.add_rule(Box::new(HighRiskJurisdictionRule));
        screener.add_rule(Box::new(StructuringRule));
        screener.add_rule(Box::new(DailyLimitRule));
        screener
    }

    pub fn add_rule(&mut self, rule: Box<dyn AmlRule>) {
        self.rules.push(rule);
    }

    pub fn config(&self) -> &AmlConfig {
        &self.config
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Screen one transfer.
    ///
    /// Negative amounts are rejected as malformed; screen the absolute value
    /// of a credit instead.
    pub fn screen(&self, request: &ScreeningRequest) -> Result<ScreeningResult, GateError> {
        if request.amount.is_credit() {
            return Err(GateError::Validation(format!(
                "amount must not be negative: {}",
                request.amount
            )));
        }

        let hits: Vec<_> = self
            .rules
            .iter()
            .filter_map(|rule| {
                let hit = rule.evaluate(request, &self.config);
                if let Some(hit) = &hit {
                    debug!(rule = rule.name(), flag = %hit.flag, risk = %hit.risk, "rule fired");
                }
                hit
            })
            .collect();
        let result = ScreeningResult::from_hits(hits);

        info!(
            amount = %request.amount,
            country = %request.country_code,
            risk = %result.risk_level,
            flags = result.flags.len(),
            "transfer screened"
        );
        Ok(result)
    }
}
