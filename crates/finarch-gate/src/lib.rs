//! AML/KYC screening for FinArch.
//!
//! A [`ScreeningRequest`] runs through an ordered list of [`AmlRule`]s; each
//! rule that fires adds a flag and sets the risk level. The final level
//! decides whether the transfer may proceed and whether a human has to look
//! at it.
//!
//! [`AmlGate`] plugs the screener into the ledger as a
//! [`PostingGate`](finarch_ledger::PostingGate).
//!
//! # Quick Start
//!
//! ```rust
//! use finarch_gate::{AmlConfig, AmlScreener, RiskLevel, ScreeningRequest};
//! use finarch_types::Amount;
//!
//! let screener = AmlScreener::with_default_rules(AmlConfig::default());
//! let request = ScreeningRequest::new(Amount::from(9_500), "USER_E", "USER_F", "TR");
//! let result = screener.screen(&request).unwrap();
//! assert_eq!(result.risk_level, RiskLevel::High);
//! assert!(result.requires_manual_review);
//! ```

pub mod config;
pub mod error;
pub mod posting;
pub mod rule;
pub mod rules;
pub mod screener;

pub use config::AmlConfig;
pub use error::GateError;
pub use posting::AmlGate;
pub use rule::{AmlRule, RiskLevel, RuleHit, ScreeningRequest, ScreeningResult};
pub use rules::{DailyLimitRule, HighRiskJurisdictionRule, HighValueRule, StructuringRule};
pub use screener::AmlScreener;
