use stakewise::config::EngineConfig;
use stakewise::errors::EngineResult;
use stakewise::execution::portfolio;
use stakewise::paper::{PaperSession, SessionAction, Slate};
use stakewise::types::CandidateBet;

const SAMPLE_SLATE: &str = include_str!("../demos/slate.json");

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("stakewise paper session starting");

    let cfg = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let slate = match load_slate(&cfg) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("slate error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        bankroll = cfg.initial_bankroll,
        markets = slate.markets.len(),
        candidates = slate.candidates.len(),
        "slate loaded"
    );

    let mut session = PaperSession::new(cfg.clone());
    let actions = match session.run(&slate) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("session error: {e}");
            std::process::exit(1);
        }
    };

    let mut placed = 0usize;
    let mut skipped = 0usize;
    for action in &actions {
        match action {
            SessionAction::Arbitrage { event_id, orders, .. } => {
                for order in orders {
                    tracing::info!(
                        event = %event_id,
                        id = %order.id,
                        outcome = %order.selection,
                        source = order.source.as_deref().unwrap_or("-"),
                        stake = order.stake,
                        odds = order.odds,
                        "arbitrage order"
                    );
                }
            }
            SessionAction::PlaceBet { order, .. } => {
                placed += 1;
                tracing::info!(id = %order.id, event = %order.event_id, stake = order.stake, "order sized");
            }
            SessionAction::Skip(_) => skipped += 1,
            SessionAction::Parlay(best) => {
                let events: Vec<&str> = best.events.iter().map(|e| e.event_id.as_str()).collect();
                tracing::info!(events = ?events, probability = best.parlay_probability, "parlay pick");
            }
        }
    }

    // What an independent-pool Kelly split of the value candidates would look like
    let candidates: Vec<CandidateBet> = slate.candidates.iter().map(|c| c.bet.clone()).collect();
    let allocation = portfolio::optimize_allocation(&candidates, session.sizer().balance());
    tracing::info!(
        bets = allocation.allocations.len(),
        total = allocation.total_allocated,
        expected_value = allocation.total_expected_value,
        overcommitted = allocation.overcommitted,
        "kelly allocation"
    );

    let metrics = session.metrics();
    tracing::info!(
        placed,
        skipped,
        total_bets = metrics.total_bets,
        win_rate = metrics.win_rate,
        profit = metrics.total_profit,
        roi_pct = metrics.roi_percent,
        balance = metrics.current_bankroll,
        health = ?session.sizer().health(),
        "session complete"
    );
}

fn load_slate(cfg: &EngineConfig) -> EngineResult<Slate> {
    match &cfg.slate_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "reading slate");
            Slate::from_json(&std::fs::read_to_string(path)?)
        }
        None => Slate::from_json(SAMPLE_SLATE),
    }
}
