//! Fixed-odds betting engine.
//!
//! Pure odds arithmetic, arbitrage detection and stake allocation,
//! fractional-Kelly sizing against a session bankroll with daily loss
//! limits, parlay selection and hedging. Market data comes in, sized orders
//! and decision records go out; placing the orders is somebody else's job.

pub mod arbitrage;
pub mod config;
pub mod errors;
pub mod execution;
pub mod odds;
pub mod paper;
pub mod risk;
pub mod types;

pub use arbitrage::{ArbitrageCheck, ArbitrageDetector, HedgePlan, MarketArbitrage};
pub use config::EngineConfig;
pub use errors::{EngineError, EngineResult};
pub use execution::{Allocation, Combination, DecisionRecord, SizedOrder};
pub use paper::{PaperSession, SessionMetrics, Slate};
pub use risk::{BankrollSizer, BetOutcome, RiskLevel, SizingLimits};
pub use types::{CandidateBet, Market, Outcome, StakeLeg, StakePlan};
