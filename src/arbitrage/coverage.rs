//! Coverage and hedging on top of the proportional allocator.

use crate::arbitrage::allocator;
use crate::types::{Outcome, StakePlan};
use serde::{Deserialize, Serialize};

/// Full-coverage plan plus whether it is a true arbitrage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub is_arbitrage: bool,
    pub guaranteed_return: f64,
    pub plan: StakePlan,
}

/// Stakes every outcome so that the return is the same whichever one wins.
pub fn full_coverage(outcomes: &[Outcome], bankroll: f64) -> Option<Coverage> {
    let plan = allocator::allocate_outcomes(bankroll, outcomes)?;
    Some(Coverage {
        is_arbitrage: plan.is_arbitrage,
        guaranteed_return: plan.common_return,
        plan,
    })
}

/// A position already placed, to be hedged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenBet {
    pub odds: f64,
    pub stake: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HedgePlan {
    pub hedge_stake: f64,
    pub hedge_odds: f64,
    pub profit_if_original_wins: f64,
    pub profit_if_hedge_wins: f64,
    /// The worse of the two outcomes.
    pub locked_profit: f64,
}

impl HedgePlan {
    fn new(original: &OpenBet, hedge_odds: f64, hedge_stake: f64) -> Self {
        let profit_if_original_wins = original.stake * (original.odds - 1.0) - hedge_stake;
        let profit_if_hedge_wins = hedge_stake * (hedge_odds - 1.0) - original.stake;
        Self {
            hedge_stake,
            hedge_odds,
            profit_if_original_wins,
            profit_if_hedge_wins,
            locked_profit: profit_if_original_wins.min(profit_if_hedge_wins),
        }
    }
}

fn is_hedgeable(original: &OpenBet, hedge_odds: f64) -> bool {
    original.odds > 1.0 && hedge_odds > 1.0 && original.stake > 0.0
}

/// Opposing stake that makes both sides pay the same: `stake * odds / hedge_odds`.
pub fn equal_profit_hedge(original: &OpenBet, hedge_odds: f64) -> Option<HedgePlan> {
    if !is_hedgeable(original, hedge_odds) {
        return None;
    }
    let x = original.stake * original.odds / hedge_odds;
    Some(HedgePlan::new(original, hedge_odds, x))
}

/// Smallest opposing stake at `hedge_odds` that guarantees at least
/// `target_profit` whichever side wins.
///
/// The hedge side needs `x * (h - 1) - stake >= target`, so
/// `x = (target + stake) / (h - 1)`; the plan is feasible only if the
/// original side still clears the target after paying `x`. Returns `None`
/// when the target is out of reach at this price.
pub fn hedge(original: &OpenBet, hedge_odds: f64, target_profit: f64) -> Option<HedgePlan> {
    if !is_hedgeable(original, hedge_odds) || !target_profit.is_finite() {
        return None;
    }

    let x = ((target_profit + original.stake) / (hedge_odds - 1.0)).max(0.0);
    let plan = HedgePlan::new(original, hedge_odds, x);

    if plan.profit_if_original_wins < target_profit - 1e-9 {
        tracing::debug!(
            target = target_profit,
            best = equal_profit_hedge(original, hedge_odds).map(|p| p.locked_profit),
            "hedge target unreachable at this price"
        );
        return None;
    }

    Some(plan)
}
