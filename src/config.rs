use crate::errors::{EngineError, EngineResult};
use crate::risk::bankroll::SizingLimits;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub initial_bankroll: f64,
    pub max_daily_loss_fraction: f64,
    pub max_single_bet_fraction: f64,
    pub min_stake: f64,
    pub min_arbitrage_margin: f64,
    /// Share of the balance committed to one arbitrage book.
    pub arbitrage_stake_fraction: f64,
    pub min_value_threshold: f64,
    pub min_odds: f64,
    pub max_odds: f64,
    pub pause_after_losses: u32,
    pub max_daily_bets: u32,
    pub max_exposure_per_sport: f64,
    pub max_exposure_per_team: f64,
    pub parlay_size: usize,
    pub slate_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_bankroll: 1000.0,
            max_daily_loss_fraction: 0.05,
            max_single_bet_fraction: 0.02,
            min_stake: 0.01,
            min_arbitrage_margin: 0.01,
            arbitrage_stake_fraction: 0.10,
            min_value_threshold: 0.05,
            min_odds: 1.5,
            max_odds: 10.0,
            pause_after_losses: 3,
            max_daily_bets: 20,
            max_exposure_per_sport: 0.10,
            max_exposure_per_team: 0.05,
            parlay_size: 2,
            slate_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();

        let cfg = Self {
            initial_bankroll: parse_var("BANKROLL_INITIAL", "1000.0")?,
            max_daily_loss_fraction: parse_var("MAX_DAILY_LOSS_FRACTION", "0.05")?,
            max_single_bet_fraction: parse_var("MAX_SINGLE_BET_FRACTION", "0.02")?,
            min_stake: parse_var("MIN_STAKE", "0.01")?,
            min_arbitrage_margin: parse_var("MIN_ARBITRAGE_MARGIN", "0.01")?,
            arbitrage_stake_fraction: parse_var("ARBITRAGE_STAKE_FRACTION", "0.10")?,
            min_value_threshold: parse_var("MIN_VALUE_THRESHOLD", "0.05")?,
            min_odds: parse_var("MIN_ODDS", "1.5")?,
            max_odds: parse_var("MAX_ODDS", "10.0")?,
            pause_after_losses: parse_var("PAUSE_AFTER_LOSS_STREAK", "3")?,
            max_daily_bets: parse_var("MAX_BETS_PER_DAY", "20")?,
            max_exposure_per_sport: parse_var("MAX_EXPOSURE_PER_SPORT", "0.10")?,
            max_exposure_per_team: parse_var("MAX_EXPOSURE_PER_TEAM", "0.05")?,
            parlay_size: parse_var("PARLAY_SIZE", "2")?,
            slate_path: std::env::var("SLATE_PATH").ok().map(PathBuf::from),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> EngineResult<()> {
        if !(self.initial_bankroll > 0.0) {
            return Err(EngineError::Config(format!(
                "BANKROLL_INITIAL must be positive, got {}",
                self.initial_bankroll
            )));
        }

        for (key, value) in [
            ("MAX_DAILY_LOSS_FRACTION", self.max_daily_loss_fraction),
            ("MAX_SINGLE_BET_FRACTION", self.max_single_bet_fraction),
            ("ARBITRAGE_STAKE_FRACTION", self.arbitrage_stake_fraction),
            ("MAX_EXPOSURE_PER_SPORT", self.max_exposure_per_sport),
            ("MAX_EXPOSURE_PER_TEAM", self.max_exposure_per_team),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(EngineError::Config(format!(
                    "{key} must be in (0, 1], got {value}"
                )));
            }
        }

        if self.min_stake < 0.0 {
            return Err(EngineError::Config(format!(
                "MIN_STAKE must be non-negative, got {}",
                self.min_stake
            )));
        }

        if !(self.min_odds < self.max_odds) {
            return Err(EngineError::Config(format!(
                "MIN_ODDS ({}) must be below MAX_ODDS ({})",
                self.min_odds, self.max_odds
            )));
        }

        Ok(())
    }

    pub fn sizing_limits(&self) -> SizingLimits {
        SizingLimits {
            max_daily_loss_fraction: self.max_daily_loss_fraction,
            max_single_bet_fraction: self.max_single_bet_fraction,
            min_stake: self.min_stake,
        }
    }
}

fn parse_var<T>(key: &str, default: &str) -> EngineResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_var_or(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| EngineError::Config(format!("{key}: {e}")))
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        let limits = cfg.sizing_limits();
        assert_eq!(limits.max_daily_loss_fraction, 0.05);
        assert_eq!(limits.max_single_bet_fraction, 0.02);
    }

    #[test]
    fn test_fraction_out_of_range_rejected() {
        let cfg = EngineConfig {
            max_single_bet_fraction: 1.5,
            ..EngineConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("MAX_SINGLE_BET_FRACTION"));
    }

    #[test]
    fn test_inverted_odds_band_rejected() {
        let cfg = EngineConfig {
            min_odds: 5.0,
            max_odds: 2.0,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_nan_odds_band_rejected() {
        for (min_odds, max_odds) in [(f64::NAN, 10.0), (1.5, f64::NAN)] {
            let cfg = EngineConfig {
                min_odds,
                max_odds,
                ..EngineConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(EngineError::Config(_))));
        }
    }

    #[test]
    fn test_zero_bankroll_rejected() {
        let cfg = EngineConfig {
            initial_bankroll: 0.0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
