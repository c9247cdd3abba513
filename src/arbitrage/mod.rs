pub mod allocator;
pub mod coverage;
pub mod detector;

pub use allocator::{allocate, allocate_outcomes};
pub use coverage::{equal_profit_hedge, full_coverage, hedge, Coverage, HedgePlan, OpenBet};
pub use detector::{
    detect, detect_three_way, detect_two_way, ArbitrageCheck, ArbitrageDetector, MarketArbitrage,
};
