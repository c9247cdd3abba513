/// Paper session metrics.
/// All functions are pure -- they take the ledger history and return computed values.
use crate::risk::bankroll::{BetOutcome, BetRecord};

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SessionMetrics {
    pub total_bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub voids: usize,
    /// Wins over settled (non-void) bets.
    pub win_rate: f64,
    pub total_wagered: f64,
    pub initial_bankroll: f64,
    pub current_bankroll: f64,
    pub total_profit: f64,
    pub roi_percent: f64,
    pub average_stake: f64,
}

/// Compute session metrics from the bankroll history. Pure function.
pub fn compute_metrics(history: &[BetRecord], initial_bankroll: f64) -> SessionMetrics {
    let count = |o: BetOutcome| history.iter().filter(|r| r.outcome == o).count();
    let wins = count(BetOutcome::Won);
    let losses = count(BetOutcome::Lost);
    let voids = count(BetOutcome::Voided);

    let total_bets = history.len();
    let settled = wins + losses;
    let total_wagered: f64 = history.iter().map(|r| r.stake).sum();
    let current_bankroll = history.last().map_or(initial_bankroll, |r| r.balance_after);
    let total_profit = current_bankroll - initial_bankroll;

    SessionMetrics {
        total_bets,
        wins,
        losses,
        voids,
        win_rate: if settled == 0 { 0.0 } else { wins as f64 / settled as f64 },
        total_wagered,
        initial_bankroll,
        current_bankroll,
        total_profit,
        roi_percent: if initial_bankroll > 0.0 {
            total_profit / initial_bankroll * 100.0
        } else {
            0.0
        },
        average_stake: if total_bets == 0 { 0.0 } else { total_wagered / total_bets as f64 },
    }
}
