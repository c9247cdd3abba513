//! Parlay search and portfolio sizing over independent candidate bets.
//!
//! Independence is assumed throughout: a parlay's probability and odds are
//! plain products of its legs'. No covariance is modelled.

use crate::errors::{EngineError, EngineResult};
use crate::odds;
use crate::risk::kelly::{compute_kelly, KellyParams};
use crate::types::CandidateBet;
use serde::Serialize;

/// Product of leg probabilities. `0.0` for an empty list.
pub fn parlay_probability(probabilities: &[f64]) -> f64 {
    if probabilities.is_empty() {
        return 0.0;
    }
    probabilities.iter().product()
}

/// Product of leg odds. `1.0` for an empty list.
pub fn parlay_odds(odds: &[f64]) -> f64 {
    odds.iter().product()
}

/// Teaser price: every leg shaded by `adjustment` (< 1.0 shortens), then multiplied.
pub fn teaser_odds(odds: &[f64], adjustment: f64) -> f64 {
    odds.iter().map(|o| o * adjustment).product()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combination {
    /// Indices into the candidate list, ascending.
    pub indices: Vec<usize>,
    pub events: Vec<CandidateBet>,
    pub parlay_probability: f64,
    pub parlay_odds: f64,
    /// Per unit staked: `probability * odds - 1`.
    pub expected_value: f64,
}

impl Combination {
    pub fn expected_value_percent(&self) -> f64 {
        self.expected_value * 100.0
    }
}

/// Lexicographic walk over k-subsets of `0..n`.
struct Combinations {
    n: usize,
    indices: Vec<usize>,
    first: bool,
}

impl Combinations {
    fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            first: true,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let k = self.indices.len();
        if k > self.n {
            return None;
        }
        if self.first {
            self.first = false;
            return Some(self.indices.clone());
        }

        // Rightmost index that can still move right.
        let i = (0..k).rev().find(|&i| self.indices[i] < self.n - k + i)?;
        self.indices[i] += 1;
        for j in i + 1..k {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(self.indices.clone())
    }
}

/// Highest expected-value parlay of exactly `k` candidates.
///
/// Every size-`k` subset is scored; a later subset replaces the best only
/// with a strictly greater EV, so the first of tied subsets wins. `Ok(None)`
/// when no subset has positive EV. Cost is C(n, k): keep `n` small.
pub fn best_combination(candidates: &[CandidateBet], k: usize) -> EngineResult<Option<Combination>> {
    if k > candidates.len() {
        return Err(EngineError::InvalidArgument(format!(
            "combination size {k} exceeds {} candidates",
            candidates.len()
        )));
    }
    if k == 0 {
        return Ok(None);
    }

    let mut best: Option<(Vec<usize>, f64, f64, f64)> = None;
    let mut best_ev = 0.0;
    let mut probs: Vec<f64> = Vec::with_capacity(k);
    let mut prices: Vec<f64> = Vec::with_capacity(k);

    for combo in Combinations::new(candidates.len(), k) {
        probs.clear();
        prices.clear();
        for &i in &combo {
            probs.push(candidates[i].probability);
            prices.push(candidates[i].odds);
        }

        let p = parlay_probability(&probs);
        let o = parlay_odds(&prices);
        let ev = odds::value(p, o);

        if ev > best_ev {
            best_ev = ev;
            best = Some((combo, p, o, ev));
        }
    }

    Ok(best.map(|(indices, parlay_probability, parlay_odds, expected_value)| {
        tracing::debug!(
            legs = indices.len(),
            parlay_odds = parlay_odds,
            ev = expected_value,
            "best parlay selected"
        );
        Combination {
            events: indices.iter().map(|&i| candidates[i].clone()).collect(),
            indices,
            parlay_probability,
            parlay_odds,
            expected_value,
        }
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetAllocation {
    pub event_id: String,
    pub selection: Option<String>,
    pub stake: f64,
    pub probability: f64,
    pub odds: f64,
    pub kelly_fraction: f64,
    /// `stake * (p * odds - 1)`.
    pub expected_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub allocations: Vec<BetAllocation>,
    pub total_allocated: f64,
    /// Negative when independent sizing over-commits the bankroll.
    pub remaining_bankroll: f64,
    pub total_expected_value: f64,
    pub overcommitted: bool,
}

impl Allocation {
    fn from_bets(allocations: Vec<BetAllocation>, bankroll: f64) -> Self {
        let total_allocated: f64 = allocations.iter().map(|a| a.stake).sum();
        let total_expected_value = allocations.iter().map(|a| a.expected_value).sum();
        Self {
            allocations,
            total_allocated,
            remaining_bankroll: bankroll - total_allocated,
            total_expected_value,
            overcommitted: total_allocated > bankroll,
        }
    }
}

/// Quarter-Kelly stake per candidate, each sized against the full bankroll
/// as if it had its own capital pool. No cross-bet normalization: the sum
/// can exceed the bankroll, which `overcommitted` reports.
pub fn optimize_allocation(candidates: &[CandidateBet], bankroll: f64) -> Allocation {
    let capital = bankroll.max(0.0);
    let allocations = candidates
        .iter()
        .map(|c| {
            let kelly = compute_kelly(&KellyParams {
                win_probability: c.probability,
                odds: c.odds,
                bankroll: capital,
            });
            BetAllocation {
                event_id: c.event_id.clone(),
                selection: c.selection.clone(),
                stake: kelly.stake,
                probability: c.probability,
                odds: c.odds,
                kelly_fraction: kelly.fraction,
                expected_value: kelly.stake * kelly.edge,
            }
        })
        .collect();

    let allocation = Allocation::from_bets(allocations, bankroll);
    if allocation.overcommitted {
        tracing::warn!(
            total = allocation.total_allocated,
            bankroll = bankroll,
            "independent sizing exceeds bankroll"
        );
    }
    allocation
}

/// Same sizing drawn from one shared pool: if the independent stakes sum past
/// the bankroll they are scaled down proportionally to fit it exactly.
pub fn optimize_allocation_joint(candidates: &[CandidateBet], bankroll: f64) -> Allocation {
    let mut independent = optimize_allocation(candidates, bankroll);
    if !independent.overcommitted || !(independent.total_allocated > 0.0) {
        return independent;
    }

    let capital = bankroll.max(0.0);
    let scale = capital / independent.total_allocated;
    for a in independent.allocations.iter_mut() {
        a.stake *= scale;
        a.kelly_fraction *= scale;
        a.expected_value *= scale;
    }

    // Re-summing scaled stakes can land an ulp above the bankroll.
    Allocation {
        total_expected_value: independent.allocations.iter().map(|a| a.expected_value).sum(),
        allocations: independent.allocations,
        total_allocated: capital,
        remaining_bankroll: bankroll - capital,
        overcommitted: false,
    }
}
