use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ── Market input (from the market-data collaborator) ──

/// One priced result of a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    pub odds: f64,
    #[serde(default)]
    pub source: Option<String>,
}

impl Outcome {
    pub fn new(name: impl Into<String>, odds: f64) -> Self {
        Self {
            name: name.into(),
            odds,
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// A single source's price for an outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub source: String,
    pub odds: f64,
}

/// One result of a market together with every source quoting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOutcome {
    pub name: String,
    pub quotes: Vec<Quote>,
}

impl MarketOutcome {
    /// Highest finite quoted price. Ties keep the first source listed.
    pub fn best_quote(&self) -> Option<&Quote> {
        self.quotes
            .iter()
            .filter(|q| q.odds.is_finite())
            .fold(None, |best: Option<&Quote>, q| match best {
                Some(b) if b.odds >= q.odds => Some(b),
                _ => Some(q),
            })
    }
}

/// Mutually exclusive, collectively exhaustive results of one event,
/// in the order the market-data collaborator listed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub event_id: String,
    #[serde(default)]
    pub sport: Option<String>,
    pub outcomes: Vec<MarketOutcome>,
}

impl Market {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            sport: None,
            outcomes: Vec::new(),
        }
    }

    /// Adds a quote, creating the outcome on first sight.
    pub fn quote(mut self, outcome: &str, source: &str, odds: f64) -> Self {
        let quote = Quote {
            source: source.to_string(),
            odds,
        };
        match self.outcomes.iter_mut().find(|o| o.name == outcome) {
            Some(existing) => existing.quotes.push(quote),
            None => self.outcomes.push(MarketOutcome {
                name: outcome.to_string(),
                quotes: vec![quote],
            }),
        }
        self
    }
}

/// An independent discretionary bet: a model probability against a market price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateBet {
    pub event_id: String,
    #[serde(default)]
    pub selection: Option<String>,
    pub probability: f64,
    pub odds: f64,
    #[serde(default)]
    pub source: Option<String>,
}

impl CandidateBet {
    pub fn new(event_id: impl Into<String>, probability: f64, odds: f64) -> Self {
        Self {
            event_id: event_id.into(),
            selection: None,
            probability,
            odds,
            source: None,
        }
    }
}

// ── Stake plans (produced by the allocator) ──

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakeLeg {
    pub outcome: String,
    pub source: Option<String>,
    pub stake: f64,
    pub odds: f64,
    pub guaranteed_return: f64,
}

/// Stake split across every covered outcome. Each leg's `stake * odds`
/// equals `common_return`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StakePlan {
    pub legs: SmallVec<[StakeLeg; 4]>,
    pub total_stake: f64,
    /// Σ 1/odds over the covered outcomes.
    pub inverse_sum: f64,
    pub common_return: f64,
    /// `common_return - total_stake`; negative for loss-controlled coverage.
    pub guaranteed_profit: f64,
    /// `(1 - S) / S`, the return on the total stake.
    pub margin: f64,
    pub is_arbitrage: bool,
}

impl StakePlan {
    pub fn leg(&self, outcome: &str) -> Option<&StakeLeg> {
        self.legs.iter().find(|l| l.outcome == outcome)
    }

    pub fn margin_percent(&self) -> f64 {
        self.margin * 100.0
    }
}
