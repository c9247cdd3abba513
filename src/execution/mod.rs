pub mod decision;
pub mod ev;
pub mod order;
pub mod portfolio;

pub use decision::{Action, DecisionRecord};
pub use order::SizedOrder;
pub use portfolio::{
    best_combination, optimize_allocation, optimize_allocation_joint, parlay_odds,
    parlay_probability, teaser_odds, Allocation, BetAllocation, Combination,
};
