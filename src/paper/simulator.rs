use crate::arbitrage::{allocate_outcomes, ArbitrageDetector};
use crate::config::EngineConfig;
use crate::errors::EngineResult;
use crate::execution::decision::{Action, DecisionRecord};
use crate::execution::ev::{self, ValueParams};
use crate::execution::order::SizedOrder;
use crate::execution::portfolio::{self, Combination};
use crate::paper::tracker::{self, SessionMetrics};
use crate::risk::bankroll::{BankrollSizer, BetOutcome};
use crate::risk::limits::{self, ExposureBook, ResponsibleGaming};
use crate::types::{CandidateBet, Market, StakePlan};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use smallvec::SmallVec;

/// Input for one paper run: markets to scan for arbitrage and candidate
/// bets priced against model probabilities.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Slate {
    #[serde(default)]
    pub markets: Vec<Market>,
    #[serde(default)]
    pub candidates: Vec<SlateBet>,
}

impl Slate {
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlateBet {
    #[serde(flatten)]
    pub bet: CandidateBet,
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    /// Known result, settled straight after placement in a paper run.
    #[serde(default)]
    pub result: Option<BetOutcome>,
}

/// Output actions from the session's decision loop.
#[derive(Debug)]
pub enum SessionAction {
    Arbitrage {
        event_id: String,
        plan: StakePlan,
        orders: SmallVec<[SizedOrder; 4]>,
    },
    PlaceBet {
        order: SizedOrder,
        record: DecisionRecord,
    },
    Skip(DecisionRecord),
    Parlay(Combination),
}

/// One paper-trading session: a single ledger driven from one thread.
pub struct PaperSession {
    config: EngineConfig,
    detector: ArbitrageDetector,
    sizer: BankrollSizer,
    gaming: ResponsibleGaming,
    exposure: ExposureBook,
}

impl PaperSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            detector: ArbitrageDetector::new(config.min_arbitrage_margin),
            sizer: BankrollSizer::new(config.initial_bankroll, config.sizing_limits()),
            gaming: ResponsibleGaming::new(config.pause_after_losses, config.max_daily_bets),
            exposure: ExposureBook::new(config.max_exposure_per_sport, config.max_exposure_per_team),
            config,
        }
    }

    pub fn sizer(&self) -> &BankrollSizer {
        &self.sizer
    }

    pub fn gaming(&self) -> &ResponsibleGaming {
        &self.gaming
    }

    pub fn metrics(&self) -> SessionMetrics {
        tracker::compute_metrics(self.sizer.history(), self.config.initial_bankroll)
    }

    /// Runs the whole slate: arbitrage scan, then value bets, then the
    /// best parlay among the value candidates.
    pub fn run(&mut self, slate: &Slate) -> EngineResult<Vec<SessionAction>> {
        let mut actions = Vec::new();
        let now = Utc::now();

        for market in &slate.markets {
            if let Some(action) = self.scan_market(market, now) {
                actions.push(action);
            }
        }

        let mut value_bets: Vec<CandidateBet> = Vec::new();
        for candidate in &slate.candidates {
            let action = self.evaluate(candidate, now);
            if matches!(action, SessionAction::PlaceBet { .. }) {
                value_bets.push(candidate.bet.clone());
            }
            actions.push(action);
        }

        let k = self.config.parlay_size;
        if k > 0 && value_bets.len() >= k {
            if let Some(best) = portfolio::best_combination(&value_bets, k)? {
                tracing::info!(
                    legs = best.indices.len(),
                    parlay_odds = best.parlay_odds,
                    ev_pct = best.expected_value_percent(),
                    "best parlay"
                );
                actions.push(SessionAction::Parlay(best));
            }
        }

        Ok(actions)
    }

    fn scan_market(&mut self, market: &Market, now: DateTime<Utc>) -> Option<SessionAction> {
        let arb = self.detector.find_market_arbitrage(market)?;
        let budget = self.sizer.balance() * self.config.arbitrage_stake_fraction;
        let plan = allocate_outcomes(budget, &arb.outcomes())?;

        let orders: SmallVec<[SizedOrder; 4]> = plan
            .legs
            .iter()
            .map(|leg| SizedOrder::from_leg(&market.event_id, leg))
            .collect();

        if let Some(bad) = orders.iter().map(|o| o.validate()).find(|c| !c.is_allowed()) {
            tracing::warn!(event = %market.event_id, reason = ?bad.reason(), "arbitrage order rejected");
            return None;
        }

        tracing::info!(
            event = %market.event_id,
            total_stake = plan.total_stake,
            profit = plan.guaranteed_profit,
            margin_pct = plan.margin_percent(),
            "arbitrage plan"
        );

        // Every leg pays the same, so the book settles as a single win.
        self.sizer
            .record_result_at(now, plan.total_stake, BetOutcome::Won, plan.guaranteed_profit);
        self.gaming.check_loss_streak(BetOutcome::Won);

        Some(SessionAction::Arbitrage {
            event_id: market.event_id.clone(),
            plan,
            orders,
        })
    }

    fn evaluate(&mut self, candidate: &SlateBet, now: DateTime<Utc>) -> SessionAction {
        let bet = &candidate.bet;
        let value = ev::compute_value(
            &ValueParams {
                probability: bet.probability,
                odds: bet.odds,
            },
            self.config.min_value_threshold,
        );

        if !value.is_signal {
            return SessionAction::Skip(self.record(bet, value.value, 0.0, Action::Skip, "no value", now));
        }

        let stake = self.sizer.optimal_stake_at(now, bet.probability, bet.odds, true);
        let check = limits::check_bet(
            &self.gaming,
            self.sizer.state(),
            stake,
            bet.odds,
            self.config.min_odds,
            self.config.max_odds,
        );
        if let Some(reason) = check.reason() {
            return SessionAction::Skip(self.record(bet, value.value, stake, Action::Skip, reason, now));
        }

        let sport = candidate.sport.as_deref().unwrap_or("unknown");
        let team = candidate.team.as_deref().unwrap_or(&bet.event_id);
        if let Some(reason) = self.exposure.check(sport, team, stake, self.sizer.balance()).reason() {
            return SessionAction::Skip(self.record(bet, value.value, stake, Action::Skip, reason, now));
        }

        let order = SizedOrder::from_candidate(bet, stake);
        if let Some(reason) = order.validate().reason() {
            return SessionAction::Skip(self.record(bet, value.value, stake, Action::Skip, reason, now));
        }

        let record = self.record(bet, value.value, stake, Action::PlaceBet, "value above threshold", now);
        self.exposure.add(sport, team, stake);

        if let Some(result) = candidate.result {
            let winnings = match result {
                BetOutcome::Won => stake * (bet.odds - 1.0),
                _ => 0.0,
            };
            self.sizer.record_result_at(now, stake, result, winnings);
            self.gaming.check_loss_streak(result);
        }

        SessionAction::PlaceBet { order, record }
    }

    fn record(
        &self,
        bet: &CandidateBet,
        value: f64,
        stake: f64,
        action: Action,
        reason: &str,
        now: DateTime<Utc>,
    ) -> DecisionRecord {
        let state = self.sizer.state();
        let record = DecisionRecord {
            timestamp: now,
            event_id: bet.event_id.clone(),
            selection: bet.selection.clone().unwrap_or_default(),
            prediction: bet.probability,
            odds: bet.odds,
            value,
            stake,
            action,
            reason: reason.to_string(),
            risk_level: self.sizer.health(),
            balance: state.balance,
            period_loss: state.period_loss,
        };

        match record.to_json() {
            Ok(json) => tracing::info!(target: "audit", "{json}"),
            Err(e) => tracing::error!(error = %e, "decision record not serializable"),
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLATE: &str = r#"{
        "markets": [
            {"event_id": "tennis-1", "outcomes": [
                {"name": "Player A", "quotes": [{"source": "betfair", "odds": 1.90}, {"source": "kambi", "odds": 1.95}]},
                {"name": "Player B", "quotes": [{"source": "pinnacle", "odds": 2.20}]}
            ]},
            {"event_id": "football-1", "outcomes": [
                {"name": "home", "quotes": [{"source": "betfair", "odds": 2.50}]},
                {"name": "draw", "quotes": [{"source": "betfair", "odds": 3.40}]},
                {"name": "away", "quotes": [{"source": "betfair", "odds": 2.70}]}
            ]}
        ],
        "candidates": [
            {"event_id": "e1", "selection": "home", "probability": 0.65, "odds": 1.80, "sport": "football", "result": "won"},
            {"event_id": "e2", "selection": "home", "probability": 0.70, "odds": 1.60, "sport": "basketball", "result": "lost"},
            {"event_id": "e3", "selection": "away", "probability": 0.45, "odds": 2.00}
        ]
    }"#;

    #[test]
    fn test_slate_parses() {
        let slate = Slate::from_json(SLATE).unwrap();
        assert_eq!(slate.markets.len(), 2);
        assert_eq!(slate.candidates[1].result, Some(BetOutcome::Lost));
        assert_eq!(slate.candidates[0].bet.selection.as_deref(), Some("home"));
    }

    #[test]
    fn test_session_run() {
        let slate = Slate::from_json(SLATE).unwrap();
        let mut session = PaperSession::new(EngineConfig::default());
        let actions = session.run(&slate).unwrap();

        let arbs = actions
            .iter()
            .filter(|a| matches!(a, SessionAction::Arbitrage { .. }))
            .count();
        assert_eq!(arbs, 1, "only the tennis market is an arbitrage");

        let placed = actions
            .iter()
            .filter(|a| matches!(a, SessionAction::PlaceBet { .. }))
            .count();
        assert_eq!(placed, 2);
        assert!(actions.iter().any(|a| matches!(a, SessionAction::Skip(r) if r.event_id == "e3")));
        assert!(actions.iter().any(|a| matches!(a, SessionAction::Parlay(_))));

        let metrics = session.metrics();
        assert_eq!(metrics.total_bets, 3);
        assert_eq!(metrics.losses, 1);
    }

    #[test]
    fn test_arbitrage_win_resets_loss_streak() {
        let mut session = PaperSession::new(EngineConfig::default());

        let losses = Slate::from_json(
            r#"{"candidates": [
                {"event_id": "e1", "probability": 0.65, "odds": 1.80, "sport": "football", "result": "lost"},
                {"event_id": "e2", "probability": 0.65, "odds": 1.80, "sport": "tennis", "result": "lost"}
            ]}"#,
        )
        .unwrap();
        session.run(&losses).unwrap();
        assert_eq!(session.gaming().consecutive_losses(), 2);

        let arb_then_loss = Slate::from_json(
            r#"{
                "markets": [{"event_id": "tennis-1", "outcomes": [
                    {"name": "A", "quotes": [{"source": "kambi", "odds": 1.95}]},
                    {"name": "B", "quotes": [{"source": "pinnacle", "odds": 2.20}]}
                ]}],
                "candidates": [
                    {"event_id": "e3", "probability": 0.65, "odds": 1.80, "sport": "hockey", "result": "lost"}
                ]
            }"#,
        )
        .unwrap();
        session.run(&arb_then_loss).unwrap();

        let outcomes: Vec<BetOutcome> = session.sizer().history().iter().map(|r| r.outcome).collect();
        assert_eq!(
            outcomes,
            vec![BetOutcome::Lost, BetOutcome::Lost, BetOutcome::Won, BetOutcome::Lost]
        );
        assert!(!session.gaming().is_paused(), "arbitrage win must break the streak");
        assert_eq!(session.gaming().consecutive_losses(), 1);
    }

    #[test]
    fn test_invalid_slate_is_parse_error() {
        assert!(matches!(
            Slate::from_json("{\"markets\": 3}"),
            Err(crate::errors::EngineError::Parse(_))
        ));
    }
}
