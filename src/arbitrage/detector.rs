/// Arbitrage detection over mutually exclusive outcomes.
///
/// S = Σ 1/odds_i
/// arbitrage  <=>  S < 1
/// margin     =    (1 - S) / S        (return on total stake, not on bankroll)
///
/// Any price <= 1.0 makes the whole book degenerate: the result is
/// "no arbitrage, zero margin", never an error.
use crate::arbitrage::allocator;
use crate::errors::{EngineError, EngineResult};
use crate::odds::implied_probability;
use crate::types::{Market, Outcome, StakePlan};
use serde::Serialize;

/// Default minimum margin before an opportunity is worth acting on.
pub const DEFAULT_MIN_MARGIN: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArbitrageCheck {
    pub is_arbitrage: bool,
    pub margin: f64,
}

impl ArbitrageCheck {
    const NONE: Self = Self {
        is_arbitrage: false,
        margin: 0.0,
    };
}

/// Sum of implied probabilities, or `None` if the book is degenerate
/// (fewer than two outcomes, or any price <= 1.0 or non-finite).
pub(crate) fn inverse_sum(odds: &[f64]) -> Option<f64> {
    if odds.len() < 2 || odds.iter().any(|&o| !(o > 1.0 && o.is_finite())) {
        return None;
    }
    Some(odds.iter().map(|&o| implied_probability(o)).sum())
}

/// Pure arbitrage test over an N-way book. No threshold is applied.
#[inline]
pub fn detect(odds: &[f64]) -> ArbitrageCheck {
    match inverse_sum(odds) {
        Some(s) if s < 1.0 => ArbitrageCheck {
            is_arbitrage: true,
            margin: (1.0 - s) / s,
        },
        _ => ArbitrageCheck::NONE,
    }
}

/// Binary market (e.g. player A / player B).
#[inline]
pub fn detect_two_way(odds_1: f64, odds_2: f64) -> ArbitrageCheck {
    detect(&[odds_1, odds_2])
}

/// Three-way market (home / draw / away).
#[inline]
pub fn detect_three_way(odds_1: f64, odds_2: f64, odds_3: f64) -> ArbitrageCheck {
    detect(&[odds_1, odds_2, odds_3])
}

/// Best price chosen for one outcome of a market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub outcome: String,
    pub source: String,
    pub odds: f64,
}

/// Cross-source arbitrage on a whole market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketArbitrage {
    pub event_id: String,
    pub selections: Vec<Selection>,
    pub inverse_sum: f64,
    pub margin: f64,
}

impl MarketArbitrage {
    pub fn margin_percent(&self) -> f64 {
        self.margin * 100.0
    }

    /// The selected prices as allocator input, source attached.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.selections
            .iter()
            .map(|s| Outcome::new(s.outcome.clone(), s.odds).with_source(s.source.clone()))
            .collect()
    }
}

/// Best price per outcome across every quoting source, in market order.
/// `None` if any outcome has no quotes.
pub fn best_prices(market: &Market) -> Option<Vec<Selection>> {
    market
        .outcomes
        .iter()
        .map(|o| {
            o.best_quote().map(|q| Selection {
                outcome: o.name.clone(),
                source: q.source.clone(),
                odds: q.odds,
            })
        })
        .collect()
}

/// Detector with a minimum-margin filter against stale-quote noise.
#[derive(Debug, Clone, Copy)]
pub struct ArbitrageDetector {
    min_margin: f64,
}

impl Default for ArbitrageDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MARGIN)
    }
}

impl ArbitrageDetector {
    pub fn new(min_margin: f64) -> Self {
        Self { min_margin }
    }

    pub fn min_margin(&self) -> f64 {
        self.min_margin
    }

    /// True when the check is an arbitrage AND clears the margin threshold.
    #[inline]
    pub fn is_actionable(&self, check: &ArbitrageCheck) -> bool {
        check.is_arbitrage && check.margin >= self.min_margin
    }

    /// Thresholded test over a flat price list.
    pub fn detect(&self, odds: &[f64]) -> ArbitrageCheck {
        let check = detect(odds);
        if check.is_arbitrage && !self.is_actionable(&check) {
            tracing::debug!(
                margin = check.margin,
                min_margin = self.min_margin,
                "arbitrage below margin threshold"
            );
            return ArbitrageCheck::NONE;
        }
        check
    }

    /// Picks the best price per outcome across sources and tests the resulting book.
    pub fn find_market_arbitrage(&self, market: &Market) -> Option<MarketArbitrage> {
        let selections = best_prices(market)?;
        let odds: Vec<f64> = selections.iter().map(|s| s.odds).collect();
        let s = inverse_sum(&odds)?;

        let check = detect(&odds);
        if !self.is_actionable(&check) {
            if check.is_arbitrage {
                tracing::debug!(
                    event = %market.event_id,
                    margin = check.margin,
                    "market arbitrage filtered by threshold"
                );
            }
            return None;
        }

        tracing::info!(
            event = %market.event_id,
            outcomes = selections.len(),
            margin = check.margin,
            "market arbitrage found"
        );

        Some(MarketArbitrage {
            event_id: market.event_id.clone(),
            selections,
            inverse_sum: s,
            margin: check.margin,
        })
    }

    /// Stakes for an arbitrage given parallel lists of prices, sources and
    /// outcome names. Mismatched lengths are a caller error.
    pub fn arbitrage_stakes(
        &self,
        bankroll: f64,
        odds: &[f64],
        sources: &[&str],
        outcomes: &[&str],
    ) -> EngineResult<Option<StakePlan>> {
        if odds.len() != sources.len() || odds.len() != outcomes.len() {
            return Err(EngineError::InvalidArgument(format!(
                "parallel lists differ in length: {} odds, {} sources, {} outcomes",
                odds.len(),
                sources.len(),
                outcomes.len()
            )));
        }

        if !self.is_actionable(&detect(odds)) {
            return Ok(None);
        }

        let priced: Vec<Outcome> = odds
            .iter()
            .zip(sources)
            .zip(outcomes)
            .map(|((&o, &src), &name)| Outcome::new(name, o).with_source(src))
            .collect();

        Ok(allocator::allocate_outcomes(bankroll, &priced))
    }
}
