//! Odds arithmetic.
//!
//! Conversions between decimal odds, implied probability, and the fractional
//! and American quoting formats. Every function is total: a non-positive
//! input that would divide by zero returns `0.0`, which callers treat as
//! "no information".

/// Implied probability of decimal odds: `1 / odds`, or `0.0` when `odds <= 0`.
#[inline]
pub fn implied_probability(odds: f64) -> f64 {
    if odds > 0.0 {
        1.0 / odds
    } else {
        0.0
    }
}

/// Break-even decimal odds for a probability: `1 / p`, or `0.0` when `p <= 0`.
#[inline]
pub fn probability_to_odds(probability: f64) -> f64 {
    if probability > 0.0 {
        1.0 / probability
    } else {
        0.0
    }
}

/// Implied probabilities of a price list. Non-positive odds are skipped.
pub fn implied_probabilities(odds: &[f64]) -> Vec<f64> {
    odds.iter()
        .filter(|&&o| o > 0.0)
        .map(|&o| implied_probability(o))
        .collect()
}

/// Bookmaker overround: `Σ 1/odds − 1`. Negative means the book is arbitrageable.
pub fn overround(odds: &[f64]) -> f64 {
    odds.iter().map(|&o| implied_probability(o)).sum::<f64>() - 1.0
}

/// Fractional odds (e.g. 5/1) to decimal (6.0).
#[inline]
pub fn fractional_to_decimal(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    numerator / denominator + 1.0
}

/// American moneyline to decimal odds. `+150` -> 2.5, `-200` -> 1.5.
#[inline]
pub fn american_to_decimal(american: f64) -> f64 {
    if american > 0.0 {
        american / 100.0 + 1.0
    } else if american < 0.0 {
        100.0 / american.abs() + 1.0
    } else {
        0.0
    }
}

/// Decimal odds to American moneyline. Evens (2.0) maps to `+100`.
#[inline]
pub fn decimal_to_american(decimal: f64) -> f64 {
    if decimal <= 1.0 {
        return 0.0;
    }
    if decimal >= 2.0 {
        (decimal - 1.0) * 100.0
    } else {
        -100.0 / (decimal - 1.0)
    }
}

/// Expected return per unit staked beyond break-even: `p * odds - 1`.
#[inline]
pub fn value(probability: f64, odds: f64) -> f64 {
    probability * odds - 1.0
}
