/// Quarter-Kelly bet sizing.
///
/// f* = (b * p - q) / b
///
/// where:
///   b = odds - 1   (net decimal odds)
///   p = win probability
///   q = 1 - p
///
/// The raw fraction is damped by `KELLY_DAMPING` and clamped to
/// `[0, MAX_KELLY_FRACTION]`. No edge means no bet, never a negative stake.
///
/// All inputs/outputs are f64. Pure functions.

/// Fraction of full Kelly applied (quarter Kelly).
pub const KELLY_DAMPING: f64 = 0.25;

/// Hard ceiling on the damped fraction.
pub const MAX_KELLY_FRACTION: f64 = 0.25;

/// Full Kelly fraction. Negative when the bet has no edge; `0.0` for
/// odds <= 1 or a non-positive probability.
#[inline]
pub fn raw_kelly(win_probability: f64, odds: f64) -> f64 {
    let b = odds - 1.0;
    if !(b > 0.0) || !(win_probability > 0.0) {
        return 0.0;
    }
    let q = 1.0 - win_probability;
    (b * win_probability - q) / b
}

/// Damped, clamped Kelly fraction in `[0, 0.25]`.
#[inline]
pub fn kelly_fraction(win_probability: f64, odds: f64) -> f64 {
    (raw_kelly(win_probability, odds) * KELLY_DAMPING).clamp(0.0, MAX_KELLY_FRACTION)
}

/// Kelly sizing inputs. Stack-allocated.
#[derive(Debug, Clone, Copy)]
pub struct KellyParams {
    pub win_probability: f64,
    pub odds: f64,
    pub bankroll: f64,
}

/// Kelly sizing result. Stack-allocated.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct KellyResult {
    pub raw_fraction: f64, // Full Kelly
    pub fraction: f64,     // After damping + clamp
    pub stake: f64,        // fraction * bankroll
    pub edge: f64,         // p * odds - 1
}

#[inline]
pub fn compute_kelly(params: &KellyParams) -> KellyResult {
    let raw_fraction = raw_kelly(params.win_probability, params.odds);
    let fraction = kelly_fraction(params.win_probability, params.odds);
    KellyResult {
        raw_fraction,
        fraction,
        stake: fraction * params.bankroll.max(0.0),
        edge: crate::odds::value(params.win_probability, params.odds),
    }
}
