/// Session bankroll ledger and capped fractional-Kelly sizing.
///
/// One `BankrollSizer` owns one `BankrollState` for the duration of a run.
/// `record_result` is the only mutator of balance and period figures;
/// `optimal_stake` only rolls the accounting period when its boundary has
/// passed. Callers sharing a sizer across threads must serialize access
/// (wrap it in a mutex), otherwise two stakes can both pass the loss-budget
/// check before either loss is recorded.
use crate::risk::kelly;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Per-session sizing limits. Fractions apply to the *current* balance on
/// every call, not to the initial one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SizingLimits {
    pub max_daily_loss_fraction: f64,
    pub max_single_bet_fraction: f64,
    /// Smallest tradable stake; positive sizes below it are raised to it.
    pub min_stake: f64,
}

impl Default for SizingLimits {
    fn default() -> Self {
        Self {
            max_daily_loss_fraction: 0.05,
            max_single_bet_fraction: 0.02,
            min_stake: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetOutcome {
    Won,
    Lost,
    Voided,
}

impl std::fmt::Display for BetOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
            Self::Voided => write!(f, "voided"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Immutable history entry appended by `record_result`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub stake: f64,
    pub outcome: BetOutcome,
    pub winnings: f64,
    pub balance_after: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankrollState {
    pub initial_balance: f64,
    pub balance: f64,
    /// Stake lost since `period_start`.
    pub period_loss: f64,
    pub period_bets: u32,
    pub period_start: NaiveDate,
}

impl BankrollState {
    pub fn new(balance: f64, period_start: NaiveDate) -> Self {
        Self {
            initial_balance: balance,
            balance,
            period_loss: 0.0,
            period_bets: 0,
            period_start,
        }
    }

    /// Resets period figures once `today` is past the period start.
    /// Returns whether a reset happened.
    fn roll_period(&mut self, today: NaiveDate) -> bool {
        if today <= self.period_start {
            return false;
        }
        tracing::debug!(
            from = %self.period_start,
            to = %today,
            period_loss = self.period_loss,
            period_bets = self.period_bets,
            "accounting period reset"
        );
        self.period_loss = 0.0;
        self.period_bets = 0;
        self.period_start = today;
        true
    }
}

#[derive(Debug, Clone)]
pub struct BankrollSizer {
    state: BankrollState,
    limits: SizingLimits,
    history: Vec<BetRecord>,
}

impl BankrollSizer {
    pub fn new(initial_balance: f64, limits: SizingLimits) -> Self {
        Self::starting_on(initial_balance, limits, Utc::now().date_naive())
    }

    /// Sizer whose first accounting period starts on `date`.
    pub fn starting_on(initial_balance: f64, limits: SizingLimits, date: NaiveDate) -> Self {
        Self {
            state: BankrollState::new(initial_balance, date),
            limits,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> &BankrollState {
        &self.state
    }

    pub fn limits(&self) -> &SizingLimits {
        &self.limits
    }

    pub fn history(&self) -> &[BetRecord] {
        &self.history
    }

    #[inline]
    pub fn balance(&self) -> f64 {
        self.state.balance
    }

    /// Loss still allowed this period: `balance * max_daily_loss - period_loss`.
    #[inline]
    pub fn remaining_loss_budget(&self) -> f64 {
        self.state.balance * self.limits.max_daily_loss_fraction - self.state.period_loss
    }

    #[inline]
    pub fn max_single_bet(&self) -> f64 {
        self.state.balance * self.limits.max_single_bet_fraction
    }

    /// Quarter-Kelly fraction of bankroll for a bet, in `[0, 0.25]`.
    #[inline]
    pub fn kelly_fraction(&self, win_probability: f64, odds: f64) -> f64 {
        kelly::kelly_fraction(win_probability, odds)
    }

    pub fn optimal_stake(&mut self, predicted_prob: f64, odds: f64, use_kelly: bool) -> f64 {
        self.optimal_stake_at(Utc::now(), predicted_prob, odds, use_kelly)
    }

    /// Stake for one discretionary bet as of `now`.
    ///
    /// `min(raw, remaining loss budget, max single bet)`, where raw is the
    /// Kelly stake or, without Kelly, the single-bet cap. A positive size
    /// below `min_stake` is raised to it; zero stays zero (skip the bet).
    pub fn optimal_stake_at(
        &mut self,
        now: DateTime<Utc>,
        predicted_prob: f64,
        odds: f64,
        use_kelly: bool,
    ) -> f64 {
        self.state.roll_period(now.date_naive());

        let remaining = self.remaining_loss_budget();
        if remaining <= 0.0 {
            tracing::warn!(
                period_loss = self.state.period_loss,
                balance = self.state.balance,
                "daily loss limit reached"
            );
            return 0.0;
        }

        let max_single = self.max_single_bet();
        let raw = if use_kelly {
            self.state.balance * self.kelly_fraction(predicted_prob, odds)
        } else {
            max_single
        };

        let stake = raw.min(remaining).min(max_single);
        if !(stake > 0.0) {
            return 0.0;
        }
        stake.max(self.limits.min_stake)
    }

    pub fn record_result(&mut self, stake: f64, outcome: BetOutcome, winnings: f64) -> &BetRecord {
        self.record_result_at(Utc::now(), stake, outcome, winnings)
    }

    /// Settles a bet: `+winnings` on a win, `-stake` on a loss (also added to
    /// the period loss), nothing on a void. Every call counts as a bet.
    pub fn record_result_at(
        &mut self,
        now: DateTime<Utc>,
        stake: f64,
        outcome: BetOutcome,
        winnings: f64,
    ) -> &BetRecord {
        self.state.roll_period(now.date_naive());

        match outcome {
            BetOutcome::Won => {
                self.state.balance += winnings;
                tracing::info!(winnings = winnings, balance = self.state.balance, "bet won");
            }
            BetOutcome::Lost => {
                self.state.balance -= stake;
                self.state.period_loss += stake;
                tracing::warn!(stake = stake, balance = self.state.balance, "bet lost");
            }
            BetOutcome::Voided => {
                tracing::info!(stake = stake, "bet voided, stake returned");
            }
        }

        self.state.period_bets += 1;
        self.history.push(BetRecord {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            stake,
            outcome,
            winnings,
            balance_after: self.state.balance,
        });

        &self.history[self.history.len() - 1]
    }

    /// Advisory health from period loss relative to the current balance.
    /// Breakpoints at 50%, 75% and 100% of the daily loss limit. Does not
    /// block betting by itself.
    pub fn health(&self) -> RiskLevel {
        if !(self.state.balance > 0.0) {
            return RiskLevel::Critical;
        }
        let ratio = self.state.period_loss / self.state.balance;
        let max = self.limits.max_daily_loss_fraction;

        if ratio > max {
            RiskLevel::Critical
        } else if ratio > max * 0.75 {
            RiskLevel::High
        } else if ratio > max * 0.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, 0, 0).unwrap()
    }

    fn sizer(balance: f64) -> BankrollSizer {
        BankrollSizer::starting_on(balance, SizingLimits::default(), day(1))
    }

    #[test]
    fn test_kelly_stake_capped_by_single_bet() {
        let mut s = sizer(1000.0);
        // Quarter kelly = 5.3% of 1000 = 53.1, single-bet cap 2% = 20
        let stake = s.optimal_stake_at(at(1, 10), 0.65, 1.80, true);
        assert!((stake - 20.0).abs() < 1e-9, "stake {stake}");
    }

    #[test]
    fn test_kelly_stake_below_caps() {
        let limits = SizingLimits {
            max_daily_loss_fraction: 0.5,
            max_single_bet_fraction: 0.5,
            min_stake: 0.01,
        };
        let mut s = BankrollSizer::starting_on(1000.0, limits, day(1));
        let stake = s.optimal_stake_at(at(1, 10), 0.65, 1.80, true);
        assert!((stake - 53.125).abs() < 1e-9, "stake {stake}");
    }

    #[test]
    fn test_flat_stake_without_kelly() {
        let mut s = sizer(1000.0);
        let stake = s.optimal_stake_at(at(1, 10), 0.1, 1.5, false);
        assert!((stake - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_edge_stays_zero() {
        let mut s = sizer(1000.0);
        assert_eq!(s.optimal_stake_at(at(1, 10), 0.4, 2.0, true), 0.0);
    }

    #[test]
    fn test_small_positive_stake_floored_to_min() {
        let limits = SizingLimits {
            min_stake: 2.0,
            ..SizingLimits::default()
        };
        let mut s = BankrollSizer::starting_on(10.0, limits, day(1));
        // single-bet cap 0.2 < min stake
        let stake = s.optimal_stake_at(at(1, 10), 0.65, 1.80, true);
        assert_eq!(stake, 2.0);
    }

    #[test]
    fn test_loss_budget_limits_stake() {
        let mut s = sizer(1000.0);
        s.record_result_at(at(1, 9), 45.0, BetOutcome::Lost, 0.0);
        // balance 955, budget 955 * 0.05 - 45 = 2.75
        let stake = s.optimal_stake_at(at(1, 10), 0.65, 1.80, true);
        assert!((stake - 2.75).abs() < 1e-9, "stake {stake}");
    }

    #[test]
    fn test_loss_budget_exhausted() {
        let mut s = sizer(1000.0);
        s.record_result_at(at(1, 9), 60.0, BetOutcome::Lost, 0.0);
        assert_eq!(s.optimal_stake_at(at(1, 10), 0.65, 1.80, true), 0.0);
        assert_eq!(s.optimal_stake_at(at(1, 11), 0.65, 1.80, false), 0.0);
    }

    #[test]
    fn test_period_resets_once_on_new_day() {
        let mut s = sizer(1000.0);
        s.record_result_at(at(1, 9), 60.0, BetOutcome::Lost, 0.0);
        assert_eq!(s.state().period_bets, 1);

        let stake = s.optimal_stake_at(at(2, 8), 0.65, 1.80, true);
        assert!(stake > 0.0, "new period restores the loss budget");
        assert_eq!(s.state().period_loss, 0.0);
        assert_eq!(s.state().period_start, day(2));

        s.record_result_at(at(2, 9), 10.0, BetOutcome::Lost, 0.0);
        s.optimal_stake_at(at(2, 23), 0.65, 1.80, true);
        assert!((s.state().period_loss - 10.0).abs() < 1e-9, "no second reset within the day");
        assert_eq!(s.state().period_bets, 1);
    }

    #[test]
    fn test_earlier_timestamp_does_not_reset() {
        let mut s = sizer(1000.0);
        s.record_result_at(at(1, 9), 30.0, BetOutcome::Lost, 0.0);
        s.optimal_stake_at(Utc.with_ymd_and_hms(2026, 2, 28, 23, 0, 0).unwrap(), 0.6, 2.0, true);
        assert!((s.state().period_loss - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_record_result_mutations() {
        let mut s = sizer(1000.0);
        let won = s.record_result_at(at(1, 9), 20.0, BetOutcome::Won, 16.0).clone();
        assert!((won.balance_after - 1016.0).abs() < 1e-9);

        s.record_result_at(at(1, 10), 20.0, BetOutcome::Voided, 0.0);
        assert!((s.balance() - 1016.0).abs() < 1e-9);
        assert_eq!(s.state().period_loss, 0.0);

        s.record_result_at(at(1, 11), 20.0, BetOutcome::Lost, 0.0);
        assert!((s.balance() - 996.0).abs() < 1e-9);
        assert!((s.state().period_loss - 20.0).abs() < 1e-9);

        assert_eq!(s.state().period_bets, 3);
        assert_eq!(s.history().len(), 3);
        assert_ne!(s.history()[0].id, s.history()[1].id);
        assert_eq!(s.history()[2].outcome, BetOutcome::Lost);
    }

    #[test]
    fn test_optimal_stake_is_read_only() {
        let mut s = sizer(1000.0);
        let before = s.state().clone();
        s.optimal_stake_at(at(1, 10), 0.65, 1.80, true);
        s.optimal_stake_at(at(1, 11), 0.70, 1.60, false);
        assert_eq!(s.state(), &before);
        assert!(s.history().is_empty());
    }

    #[test]
    fn test_caps_follow_current_balance() {
        let mut s = sizer(1000.0);
        s.record_result_at(at(1, 9), 0.0, BetOutcome::Won, 1000.0);
        assert!((s.max_single_bet() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_health_breakpoints() {
        let mut s = sizer(1000.0);
        assert_eq!(s.health(), RiskLevel::Low);

        s.record_result_at(at(1, 9), 30.0, BetOutcome::Lost, 0.0); // 30/970 ≈ 3.1%
        assert_eq!(s.health(), RiskLevel::Medium);

        s.record_result_at(at(1, 10), 10.0, BetOutcome::Lost, 0.0); // 40/960 ≈ 4.2%
        assert_eq!(s.health(), RiskLevel::High);

        s.record_result_at(at(1, 11), 15.0, BetOutcome::Lost, 0.0); // 55/945 ≈ 5.8%
        assert_eq!(s.health(), RiskLevel::Critical);
    }

    #[test]
    fn test_health_critical_when_broke() {
        let mut s = sizer(100.0);
        s.record_result_at(at(1, 9), 100.0, BetOutcome::Lost, 0.0);
        assert_eq!(s.health(), RiskLevel::Critical);
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&BetOutcome::Voided).unwrap(), "\"voided\"");
        let parsed: BetOutcome = serde_json::from_str("\"lost\"").unwrap();
        assert_eq!(parsed, BetOutcome::Lost);
    }
}
