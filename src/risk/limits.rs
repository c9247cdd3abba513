use crate::risk::bankroll::{BankrollState, BetOutcome};
use std::collections::HashMap;

/// Risk limit check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskCheck {
    /// Betting allowed
    Allowed,
    /// Blocked with reason
    Blocked(&'static str),
}

impl RiskCheck {
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, RiskCheck::Allowed)
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            RiskCheck::Allowed => None,
            RiskCheck::Blocked(reason) => Some(reason),
        }
    }
}

/// Loss-streak and daily-count safeguards. Tracks its own streak; the
/// daily count comes from the bankroll ledger.
#[derive(Debug, Clone)]
pub struct ResponsibleGaming {
    pause_after_losses: u32,
    max_daily_bets: u32,
    consecutive_losses: u32,
    paused: bool,
}

impl ResponsibleGaming {
    pub fn new(pause_after_losses: u32, max_daily_bets: u32) -> Self {
        Self {
            pause_after_losses,
            max_daily_bets,
            consecutive_losses: 0,
            paused: false,
        }
    }

    /// Feeds a settled result. Returns true when this result triggers a pause.
    pub fn check_loss_streak(&mut self, outcome: BetOutcome) -> bool {
        if outcome != BetOutcome::Lost {
            self.consecutive_losses = 0;
            return false;
        }

        self.consecutive_losses += 1;
        if self.consecutive_losses >= self.pause_after_losses {
            self.paused = true;
            tracing::warn!(
                losses = self.consecutive_losses,
                pause_minutes = self.pause_duration().num_minutes(),
                "loss streak detected, pausing"
            );
            return true;
        }
        false
    }

    /// True while under the daily bet limit.
    pub fn check_daily_limit(&self, bets_today: u32) -> bool {
        if bets_today >= self.max_daily_bets {
            tracing::warn!(bets_today = bets_today, limit = self.max_daily_bets, "daily bet limit reached");
            return false;
        }
        true
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn consecutive_losses(&self) -> u32 {
        self.consecutive_losses
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.consecutive_losses = 0;
    }

    /// Recommended cool-off after a loss streak.
    pub fn pause_duration(&self) -> chrono::Duration {
        chrono::Duration::hours(1)
    }
}

/// Accumulated stake per sport and per team, capped as fractions of the
/// current balance.
#[derive(Debug, Clone)]
pub struct ExposureBook {
    max_per_sport: f64,
    max_per_team: f64,
    exposure: HashMap<String, HashMap<String, f64>>,
}

impl ExposureBook {
    pub fn new(max_per_sport: f64, max_per_team: f64) -> Self {
        Self {
            max_per_sport,
            max_per_team,
            exposure: HashMap::new(),
        }
    }

    pub fn add(&mut self, sport: &str, team: &str, amount: f64) {
        *self
            .exposure
            .entry(sport.to_string())
            .or_default()
            .entry(team.to_string())
            .or_insert(0.0) += amount;
    }

    pub fn sport_exposure(&self, sport: &str) -> f64 {
        self.exposure
            .get(sport)
            .map(|teams| teams.values().sum())
            .unwrap_or(0.0)
    }

    pub fn team_exposure(&self, sport: &str, team: &str) -> f64 {
        self.exposure
            .get(sport)
            .and_then(|teams| teams.get(team))
            .copied()
            .unwrap_or(0.0)
    }

    /// Whether adding `amount` keeps both caps. Pure function.
    pub fn check(&self, sport: &str, team: &str, amount: f64, balance: f64) -> RiskCheck {
        if self.sport_exposure(sport) + amount > balance * self.max_per_sport {
            return RiskCheck::Blocked("sport exposure limit exceeded");
        }
        if self.team_exposure(sport, team) + amount > balance * self.max_per_team {
            return RiskCheck::Blocked("team exposure limit exceeded");
        }
        RiskCheck::Allowed
    }
}

/// Check all session safeguards before placing a discretionary bet.
/// Pure function, no side effects.
#[inline]
pub fn check_bet(
    gaming: &ResponsibleGaming,
    state: &BankrollState,
    proposed_stake: f64,
    odds: f64,
    min_odds: f64,
    max_odds: f64,
) -> RiskCheck {
    // 1. Loss-streak pause
    if gaming.is_paused() {
        return RiskCheck::Blocked("paused after loss streak");
    }

    // 2. Daily bet count
    if !gaming.check_daily_limit(state.period_bets) {
        return RiskCheck::Blocked("daily bet limit reached");
    }

    // 3. Price band
    if odds < min_odds || odds > max_odds {
        return RiskCheck::Blocked("odds outside accepted band");
    }

    // 4. Nothing to place
    if !(proposed_stake > 0.0) {
        return RiskCheck::Blocked("zero stake");
    }

    // 5. Cannot stake more than the balance
    if proposed_stake > state.balance {
        return RiskCheck::Blocked("stake exceeds balance");
    }

    RiskCheck::Allowed
}
