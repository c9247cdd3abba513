/// Value-bet signal: model probability against the market price.
///
/// value = p * odds - 1
/// edge  = p - 1/odds
///
/// where:
///   p    = model probability for the selection
///   odds = best decimal price available
///
/// Pure function, no side effects, no allocations.
use crate::odds;
use crate::risk::kelly;

/// Parameters for value computation. Stack-allocated.
#[derive(Debug, Clone, Copy)]
pub struct ValueParams {
    pub probability: f64, // Model probability for the selection
    pub odds: f64,        // Decimal price
}

/// Result of value computation. Stack-allocated.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ValueResult {
    /// Expected return per unit staked
    pub value: f64,
    /// Whether this exceeds the threshold
    pub is_signal: bool,
    /// Market-implied probability
    pub implied_probability: f64,
    /// Model probability minus implied probability
    pub edge: f64,
    /// Quarter-Kelly fraction for sizing
    pub kelly_fraction: f64,
}

/// Compute value for one selection. Degenerate prices (<= 1.0) never signal.
#[inline]
pub fn compute_value(params: &ValueParams, threshold: f64) -> ValueResult {
    let p = params.probability;
    let o = params.odds;

    if !(o > 1.0) {
        return ValueResult {
            value: 0.0,
            is_signal: false,
            implied_probability: odds::implied_probability(o),
            edge: 0.0,
            kelly_fraction: 0.0,
        };
    }

    let value = odds::value(p, o);
    let implied = odds::implied_probability(o);

    ValueResult {
        value,
        is_signal: value > threshold,
        implied_probability: implied,
        edge: p - implied,
        kelly_fraction: kelly::kelly_fraction(p, o),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fair_price_zero_value() {
        let result = compute_value(&ValueParams { probability: 0.5, odds: 2.0 }, 0.05);
        assert!(!result.is_signal, "fair price should not signal");
        assert!(result.value.abs() < 1e-12);
        assert!(result.edge.abs() < 1e-12);
    }

    #[test]
    fn test_edge_signals() {
        let result = compute_value(&ValueParams { probability: 0.65, odds: 1.80 }, 0.05);
        assert!(result.is_signal, "should signal when model has edge");
        assert!((result.value - 0.17).abs() < 1e-9);
        assert!((result.edge - (0.65 - 1.0 / 1.8)).abs() < 1e-12);
        assert!(result.kelly_fraction > 0.0);
    }

    #[test]
    fn test_below_threshold() {
        // value = 0.03
        let params = ValueParams { probability: 0.515, odds: 2.0 };
        assert!(!compute_value(&params, 0.05).is_signal);
        assert!(compute_value(&params, 0.01).is_signal);
    }

    #[test]
    fn test_degenerate_price_never_signals() {
        let result = compute_value(&ValueParams { probability: 0.99, odds: 1.0 }, 0.0);
        assert!(!result.is_signal);
        assert_eq!(result.kelly_fraction, 0.0);
    }
}
