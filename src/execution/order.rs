use crate::risk::limits::RiskCheck;
use crate::types::{CandidateBet, StakeLeg};
use serde::Serialize;

pub const MIN_ORDER_ODDS: f64 = 1.0;
pub const MAX_ORDER_ODDS: f64 = 1000.0;
pub const MIN_ORDER_STAKE: f64 = 0.01;
pub const MAX_ORDER_STAKE: f64 = 10_000.0;

/// Order handed to the execution collaborator. The engine never places it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizedOrder {
    pub id: String,
    pub event_id: String,
    pub selection: String,
    pub odds: f64,
    pub stake: f64,
    pub source: Option<String>,
}

impl SizedOrder {
    pub fn new(event_id: &str, selection: &str, odds: f64, stake: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            selection: selection.to_string(),
            odds,
            stake,
            source: None,
        }
    }

    pub fn from_candidate(candidate: &CandidateBet, stake: f64) -> Self {
        let selection = candidate.selection.as_deref().unwrap_or(&candidate.event_id);
        Self {
            source: candidate.source.clone(),
            ..Self::new(&candidate.event_id, selection, candidate.odds, stake)
        }
    }

    /// One order per leg of a stake plan.
    pub fn from_leg(event_id: &str, leg: &StakeLeg) -> Self {
        Self {
            source: leg.source.clone(),
            ..Self::new(event_id, &leg.outcome, leg.odds, leg.stake)
        }
    }

    /// Pre-submission sanity checks. Pure function.
    pub fn validate(&self) -> RiskCheck {
        if self.event_id.is_empty() {
            return RiskCheck::Blocked("missing event id");
        }
        if self.selection.is_empty() {
            return RiskCheck::Blocked("missing selection");
        }
        if !(MIN_ORDER_ODDS..=MAX_ORDER_ODDS).contains(&self.odds) {
            return RiskCheck::Blocked("odds out of range");
        }
        if !(MIN_ORDER_STAKE..=MAX_ORDER_STAKE).contains(&self.stake) {
            return RiskCheck::Blocked("stake out of range");
        }
        RiskCheck::Allowed
    }
}
