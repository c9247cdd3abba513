use crate::errors::EngineResult;
use crate::risk::bankroll::RiskLevel;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    PlaceBet,
    Skip,
}

/// Flat record of one betting decision for the audit collaborator.
/// Numbers and short strings only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionRecord {
    pub timestamp: DateTime<Utc>,
    pub event_id: String,
    pub selection: String,
    pub prediction: f64,
    pub odds: f64,
    pub value: f64,
    pub stake: f64,
    pub action: Action,
    pub reason: String,
    pub risk_level: RiskLevel,
    pub balance: f64,
    pub period_loss: f64,
}

impl DecisionRecord {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
