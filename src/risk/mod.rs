pub mod bankroll;
pub mod kelly;
pub mod limits;

pub use bankroll::{BankrollSizer, BankrollState, BetOutcome, BetRecord, RiskLevel, SizingLimits};
pub use limits::{ExposureBook, ResponsibleGaming, RiskCheck};
