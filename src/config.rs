//! Configuration loading from TOML (or JSON) with silent fallback to defaults.
//!
//! Recognised keys mirror the session record: `interval`, `autoStart`, `seed`,
//! `autoBet`, `stake`, `bankroll`, `stopLoss`, `takeProfit`,
//! `historyLimit`, plus `exportPath` and a `[dashboard]` table.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Seconds between automatic cycles.
    pub interval: u64,
    /// Start the cycle timer at launch.
    pub auto_start: bool,
    /// Seed text; a bare number (`seed = 42`) is taken as its digits.
    #[serde(deserialize_with = "seed_text_or_number")]
    pub seed: Option<String>,
    pub auto_bet: bool,
    pub stake: Decimal,
    pub bankroll: Decimal,
    /// Consecutive losses that trip the stop-loss.
    pub stop_loss: u32,
    /// Bankroll gain over the activation baseline that trips take-profit.
    pub take_profit: Decimal,
    pub history_limit: usize,
    pub export_path: Option<String>,
    pub dashboard: DashboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval: 6,
            auto_start: true,
            seed: None,
            auto_bet: false,
            stake: dec!(1000),
            bankroll: dec!(10000),
            stop_loss: 3,
            take_profit: dec!(2000),
            history_limit: 500,
            export_path: None,
            dashboard: DashboardConfig::default(),
        }
    }
}

fn seed_text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedValue {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<SeedValue>::deserialize(deserializer)?.map(|value| match value {
        SeedValue::Text(text) => text,
        SeedValue::Int(n) => n.to_string(),
        SeedValue::Float(f) => f.to_string(),
    }))
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML or JSON file (chosen by extension).
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let is_json = Path::new(path)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config: AppConfig = if is_json {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {path}"))?
        } else {
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {path}"))?
        };
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is
    /// missing or unreadable. Never fails.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(cfg) => {
                info!(path, "Configuration loaded");
                cfg
            }
            Err(e) => {
                warn!(path, error = %e, "Config not found or invalid, using defaults");
                Self::default()
            }
        }
    }

    /// Cycle interval, never shorter than one second.
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    /// Seed text with surrounding whitespace removed; blank means none.
    pub fn seed_text(&self) -> Option<&str> {
        self.seed.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// The auto-bet defaults carried by this configuration.
    pub fn bet_defaults(&self) -> BetParams {
        BetParams {
            bankroll: self.bankroll,
            stake: self.stake,
            stop_loss_streak: self.stop_loss,
            take_profit_delta: self.take_profit,
        }
    }
}

// ---------------------------------------------------------------------------
// Layered auto-bet parameters
// ---------------------------------------------------------------------------

/// Fully resolved auto-bet parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetParams {
    pub bankroll: Decimal,
    pub stake: Decimal,
    pub stop_loss_streak: u32,
    pub take_profit_delta: Decimal,
}

/// Partial auto-bet parameters. Used both for per-call arguments and for
/// session-level overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BetOverrides {
    pub bankroll: Option<Decimal>,
    pub stake: Option<Decimal>,
    pub stop_loss: Option<u32>,
    pub take_profit: Option<Decimal>,
}

impl BetOverrides {
    /// Layer `self` over `fallback`: fields set here win.
    pub fn or(self, fallback: BetOverrides) -> BetOverrides {
        BetOverrides {
            bankroll: self.bankroll.or(fallback.bankroll),
            stake: self.stake.or(fallback.stake),
            stop_loss: self.stop_loss.or(fallback.stop_loss),
            take_profit: self.take_profit.or(fallback.take_profit),
        }
    }
}

impl BetParams {
    /// Resolve explicit call argument > session override > static default.
    ///
    /// A stake that is zero or negative is ignored at every layer; if none
    /// is positive the built-in default stake applies.
    pub fn resolve(call: BetOverrides, session: BetOverrides, defaults: BetParams) -> BetParams {
        let layered = call.or(session);
        let stake = positive(call.stake)
            .or(positive(session.stake))
            .or(positive(Some(defaults.stake)))
            .unwrap_or_else(|| {
                warn!(stake = ?layered.stake, "Stake must be positive, using default");
                AppConfig::default().stake
            });
        BetParams {
            bankroll: layered.bankroll.unwrap_or(defaults.bankroll),
            stake,
            stop_loss_streak: layered.stop_loss.unwrap_or(defaults.stop_loss_streak),
            take_profit_delta: layered.take_profit.unwrap_or(defaults.take_profit_delta),
        }
    }
}

fn positive(amount: Option<Decimal>) -> Option<Decimal> {
    amount.filter(|a| *a > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(ext: &str) -> String {
        let mut p = std::env::temp_dir();
        p.push(format!("bacbo_test_config_{}.{ext}", uuid::Uuid::new_v4()));
        p.to_string_lossy().to_string()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.interval, 6);
        assert!(cfg.auto_start);
        assert_eq!(cfg.seed, None);
        assert!(!cfg.auto_bet);
        assert_eq!(cfg.stake, dec!(1000));
        assert_eq!(cfg.bankroll, dec!(10000));
        assert_eq!(cfg.stop_loss, 3);
        assert_eq!(cfg.take_profit, dec!(2000));
        assert_eq!(cfg.history_limit, 500);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg = AppConfig::load_or_default("/tmp/bacbo_missing_config_xyz.toml");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let path = temp_path("toml");
        fs::write(
            &path,
            "interval = 2\nseed = \"abc\"\nautoBet = true\nstake = 250\n\n[dashboard]\nenabled = true\n",
        )
        .unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.interval, 2);
        assert_eq!(cfg.seed.as_deref(), Some("abc"));
        assert!(cfg.auto_bet);
        assert_eq!(cfg.stake, dec!(250));
        assert_eq!(cfg.bankroll, dec!(10000));
        assert!(cfg.dashboard.enabled);
        assert_eq!(cfg.dashboard.port, 8080);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_json_config() {
        let path = temp_path("json");
        fs::write(&path, r#"{"historyLimit": 50, "stopLoss": 5, "takeProfit": 500}"#).unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.history_limit, 50);
        assert_eq!(cfg.stop_loss, 5);
        assert_eq!(cfg.take_profit, dec!(500));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unparsable_file_falls_back() {
        let path = temp_path("toml");
        fs::write(&path, "interval = [[[").unwrap();
        let cfg = AppConfig::load_or_default(&path);
        assert_eq!(cfg, AppConfig::default());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_interval_minimum() {
        let cfg = AppConfig {
            interval: 0,
            ..AppConfig::default()
        };
        assert_eq!(cfg.cycle_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_blank_seed_is_none() {
        let cfg = AppConfig {
            seed: Some("   ".into()),
            ..AppConfig::default()
        };
        assert_eq!(cfg.seed_text(), None);
    }

    #[test]
    fn test_bet_params_layering() {
        let defaults = AppConfig::default().bet_defaults();
        let session = BetOverrides {
            stake: Some(dec!(500)),
            stop_loss: Some(4),
            ..Default::default()
        };
        let call = BetOverrides {
            stake: Some(dec!(100)),
            ..Default::default()
        };

        let p = BetParams::resolve(call, session, defaults);
        assert_eq!(p.stake, dec!(100));
        assert_eq!(p.stop_loss_streak, 4);
        assert_eq!(p.bankroll, dec!(10000));
        assert_eq!(p.take_profit_delta, dec!(2000));
    }

    #[test]
    fn test_numeric_seed_keeps_other_keys() {
        let path = temp_path("json");
        fs::write(&path, r#"{"seed": 42, "stake": 250, "historyLimit": 50}"#).unwrap();

        let cfg = AppConfig::load_or_default(&path);
        assert_eq!(cfg.seed_text(), Some("42"));
        assert_eq!(cfg.stake, dec!(250));
        assert_eq!(cfg.history_limit, 50);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_numeric_seed_in_toml() {
        let cfg: AppConfig = toml::from_str("seed = 7\nstopLoss = 2\n").unwrap();
        assert_eq!(cfg.seed.as_deref(), Some("7"));
        assert_eq!(cfg.stop_loss, 2);

        let cfg: AppConfig = toml::from_str("seed = \"abc\"\n").unwrap();
        assert_eq!(cfg.seed.as_deref(), Some("abc"));
    }

    #[test]
    fn test_non_positive_stake_ignored() {
        let defaults = AppConfig::default().bet_defaults();
        let session = BetOverrides {
            stake: Some(dec!(300)),
            ..Default::default()
        };
        let call = BetOverrides {
            stake: Some(dec!(-50)),
            ..Default::default()
        };
        assert_eq!(BetParams::resolve(call, session, defaults).stake, dec!(300));

        let zero = BetOverrides {
            stake: Some(Decimal::ZERO),
            ..Default::default()
        };
        assert_eq!(
            BetParams::resolve(zero, BetOverrides::default(), defaults).stake,
            dec!(1000)
        );

        let broken_defaults = BetParams {
            stake: dec!(-1),
            ..defaults
        };
        assert_eq!(
            BetParams::resolve(call, BetOverrides::default(), broken_defaults).stake,
            dec!(1000)
        );
    }
}
