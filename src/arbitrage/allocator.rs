/// Proportional stake allocation across a covered outcome set.
///
/// stake_i  = bankroll * (1/odds_i) / S
/// return_i = stake_i * odds_i = bankroll / S      for every i
///
/// The equal-return identity holds whether or not S < 1: below 1 the plan
/// locks in a profit, at or above 1 it locks in a bounded loss that is the
/// same on every outcome. The allocator never rejects S >= 1.
use crate::arbitrage::detector::inverse_sum;
use crate::odds::implied_probability;
use crate::types::{Outcome, StakeLeg, StakePlan};
use smallvec::SmallVec;

/// Allocates over a flat price list. Legs are named `outcome_1`, `outcome_2`, ...
///
/// Returns `None` for degenerate input: fewer than two prices, a price
/// <= 1.0, or a non-positive bankroll.
pub fn allocate(bankroll: f64, odds: &[f64]) -> Option<StakePlan> {
    let outcomes: Vec<Outcome> = odds
        .iter()
        .enumerate()
        .map(|(i, &o)| Outcome::new(format!("outcome_{}", i + 1), o))
        .collect();
    allocate_outcomes(bankroll, &outcomes)
}

/// Allocates over named outcomes, carrying each outcome's source into its leg.
pub fn allocate_outcomes(bankroll: f64, outcomes: &[Outcome]) -> Option<StakePlan> {
    if !(bankroll > 0.0) {
        return None;
    }

    let odds: SmallVec<[f64; 4]> = outcomes.iter().map(|o| o.odds).collect();
    let s = inverse_sum(&odds)?;
    let common_return = bankroll / s;

    let legs: SmallVec<[StakeLeg; 4]> = outcomes
        .iter()
        .map(|o| {
            let stake = bankroll * implied_probability(o.odds) / s;
            StakeLeg {
                outcome: o.name.clone(),
                source: o.source.clone(),
                stake,
                odds: o.odds,
                guaranteed_return: stake * o.odds,
            }
        })
        .collect();

    let total_stake = legs.iter().map(|l| l.stake).sum::<f64>();

    Some(StakePlan {
        legs,
        total_stake,
        inverse_sum: s,
        common_return,
        guaranteed_profit: common_return - bankroll,
        margin: (1.0 - s) / s,
        is_arbitrage: s < 1.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rel(a: f64, b: f64, tol: f64) {
        let scale = a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() / scale < tol, "{a} vs {b}");
    }

    #[test]
    fn test_two_way_arbitrage_plan() {
        let plan = allocate(500.0, &[1.95, 2.20]).unwrap();
        assert!(plan.is_arbitrage);
        assert!((plan.margin_percent() - 3.3735).abs() < 1e-3);

        let a = plan.leg("outcome_1").unwrap();
        let b = plan.leg("outcome_2").unwrap();
        assert!((a.stake - 265.06).abs() < 0.01, "stake a {}", a.stake);
        assert!((b.stake - 234.94).abs() < 0.01, "stake b {}", b.stake);
        assert!((plan.common_return - 516.87).abs() < 0.01);
        assert_rel(a.guaranteed_return, b.guaranteed_return, 1e-9);
        assert!(plan.guaranteed_profit > 16.8 && plan.guaranteed_profit < 16.9);
    }

    #[test]
    fn test_full_coverage_without_arbitrage() {
        let bankroll = 300.0;
        let plan = allocate(bankroll, &[2.50, 3.40, 2.70]).unwrap();
        assert!(!plan.is_arbitrage);
        assert!(plan.guaranteed_profit < 0.0, "overround book locks in a loss");
        assert_rel(plan.common_return, bankroll / plan.inverse_sum, 1e-12);
        for leg in &plan.legs {
            assert_rel(leg.guaranteed_return, plan.common_return, 1e-9);
        }
    }

    #[test]
    fn test_stakes_sum_to_bankroll_and_returns_equal() {
        let books: [&[f64]; 5] = [
            &[1.01, 101.0],
            &[2.0, 2.0],
            &[1.5, 4.0, 9.0],
            &[3.1, 3.3, 3.5, 3.7],
            &[11.0, 12.0, 13.0, 2.4, 6.5],
        ];
        for odds in books {
            for bankroll in [0.5, 100.0, 12_345.67] {
                let plan = allocate(bankroll, odds).unwrap();
                assert_rel(plan.total_stake, bankroll, 1e-6);
                let first = plan.legs[0].guaranteed_return;
                for leg in &plan.legs {
                    assert_rel(leg.guaranteed_return, first, 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_degenerate_inputs_yield_none() {
        assert!(allocate(0.0, &[1.95, 2.20]).is_none());
        assert!(allocate(-10.0, &[1.95, 2.20]).is_none());
        assert!(allocate(100.0, &[1.95]).is_none());
        assert!(allocate(100.0, &[1.0, 2.20]).is_none());
        assert!(allocate(f64::NAN, &[1.95, 2.20]).is_none());
    }

    #[test]
    fn test_sources_carried_into_legs() {
        let outcomes = vec![
            Outcome::new("home", 2.10).with_source("betfair"),
            Outcome::new("away", 2.05).with_source("kambi"),
        ];
        let plan = allocate_outcomes(200.0, &outcomes).unwrap();
        assert_eq!(plan.legs[0].source.as_deref(), Some("betfair"));
        assert_eq!(plan.legs[1].outcome, "away");
    }
}
