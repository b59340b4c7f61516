pub mod jurisdiction;
pub mod threshold;

pub use jurisdiction::HighRiskJurisdictionRule;
pub use threshold::{DailyLimitRule, HighValueRule, StructuringRule};
