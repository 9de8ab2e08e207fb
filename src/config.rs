//! Application configuration loaded from environment variables.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::tips::categorizer::{BucketProfile, BucketTable};
use crate::tips::pipeline::TipSettings;
use crate::tips::selector::SelectionWindow;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Provider Credentials ===
    /// The Odds API key.
    pub odds_api_key: String,

    /// API-Football key (fixtures and standings).
    pub api_football_key: String,

    // === Provider Endpoints ===
    /// The Odds API base URL.
    #[serde(default = "default_odds_api_url")]
    pub odds_api_url: String,

    /// Sport key passed to the odds provider.
    #[serde(default = "default_odds_sport")]
    pub odds_sport: String,

    /// Bookmaker regions passed to the odds provider.
    #[serde(default = "default_odds_regions")]
    pub odds_regions: String,

    /// API-Football base URL.
    #[serde(default = "default_football_api_url")]
    pub football_api_url: String,

    /// Odds request timeout in seconds.
    #[serde(default = "default_odds_timeout")]
    pub odds_timeout_secs: u64,

    /// Fixtures/standings request timeout in seconds.
    #[serde(default = "default_football_timeout")]
    pub football_timeout_secs: u64,

    // === Time Zones ===
    /// Zone used to decide "today" for the fixtures query.
    #[serde(default = "default_fixtures_timezone")]
    pub fixtures_timezone: String,

    /// Zone kickoff times are rendered in.
    #[serde(default = "default_kickoff_timezone")]
    pub kickoff_timezone: String,

    // === Tip Selection ===
    /// Lowest eligible price.
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,

    /// Highest eligible price.
    #[serde(default = "default_max_price")]
    pub max_price: Decimal,

    /// Price the selector steers towards.
    #[serde(default = "default_target_price")]
    pub target_price: Decimal,

    // === Buckets ===
    /// Named bucket layout.
    #[serde(default)]
    pub bucket_profile: BucketProfile,

    /// Risk bucket override, e.g. `safe:1.3-1.8:10,risky:1.9-3.5:10`.
    #[serde(default)]
    pub tip_buckets: Option<String>,

    /// Override of the profile's over/under toggle.
    #[serde(default)]
    pub over_under_enabled: Option<bool>,

    /// Over/under bucket capacity.
    #[serde(default = "default_over_under_capacity")]
    pub over_under_capacity: usize,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_odds_api_url() -> String {
    "https://api.the-odds-api.com/v4".to_string()
}

fn default_odds_sport() -> String {
    "upcoming".to_string()
}

fn default_odds_regions() -> String {
    "eu".to_string()
}

fn default_football_api_url() -> String {
    "https://v3.football.api-sports.io".to_string()
}

fn default_odds_timeout() -> u64 {
    25
}

fn default_football_timeout() -> u64 {
    20
}

fn default_fixtures_timezone() -> String {
    "Europe/Belgrade".to_string()
}

fn default_kickoff_timezone() -> String {
    "UTC".to_string()
}

fn default_min_price() -> Decimal {
    Decimal::new(14, 1) // 1.4
}

fn default_max_price() -> Decimal {
    Decimal::new(40, 1) // 4.0
}

fn default_target_price() -> Decimal {
    Decimal::new(20, 1) // 2.0
}

fn default_over_under_capacity() -> usize {
    10
}

fn default_port() -> u16 {
    5000
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.odds_api_key.trim().is_empty() {
            return Err("ODDS_API_KEY is required".to_string());
        }

        if self.api_football_key.trim().is_empty() {
            return Err("API_FOOTBALL_KEY is required".to_string());
        }

        self.tip_settings().map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Whether over/under tips are produced.
    pub fn over_under_enabled(&self) -> bool {
        self.over_under_enabled
            .unwrap_or_else(|| self.bucket_profile.has_over_under())
    }

    /// Build the explicit pipeline settings from this configuration.
    pub fn tip_settings(&self) -> Result<TipSettings, ConfigError> {
        let window = SelectionWindow::new(self.min_price, self.max_price, self.target_price)?;

        let mut buckets = match &self.tip_buckets {
            Some(raw) if !raw.trim().is_empty() => {
                let risk = BucketTable::parse_risk_buckets(raw)?;
                BucketTable::new(risk, None)
            }
            _ => self.bucket_profile.table(),
        };
        buckets = if self.over_under_enabled() {
            buckets.with_over_under(self.over_under_capacity)
        } else {
            buckets.without_over_under()
        };

        Ok(TipSettings {
            window,
            buckets,
            fixtures_timezone: parse_timezone(&self.fixtures_timezone)?,
            kickoff_timezone: parse_timezone(&self.kickoff_timezone)?,
        })
    }
}

fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| ConfigError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        odds_api_key: "odds-key".to_string(),
        api_football_key: "football-key".to_string(),
        odds_api_url: default_odds_api_url(),
        odds_sport: default_odds_sport(),
        odds_regions: default_odds_regions(),
        football_api_url: default_football_api_url(),
        odds_timeout_secs: default_odds_timeout(),
        football_timeout_secs: default_football_timeout(),
        fixtures_timezone: default_fixtures_timezone(),
        kickoff_timezone: default_kickoff_timezone(),
        min_price: default_min_price(),
        max_price: default_max_price(),
        target_price: default_target_price(),
        bucket_profile: BucketProfile::Classic,
        tip_buckets: None,
        over_under_enabled: None,
        over_under_capacity: default_over_under_capacity(),
        port: default_port(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn default_values_are_sensible() {
        assert_eq!(default_min_price(), dec!(1.4));
        assert_eq!(default_max_price(), dec!(4.0));
        assert_eq!(default_target_price(), dec!(2.0));
        assert_eq!(default_port(), 5000);
        assert_eq!(default_odds_timeout(), 25);
    }

    #[test]
    fn validate_rejects_empty_odds_key() {
        let config = Config {
            odds_api_key: "  ".to_string(),
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_football_key() {
        let config = Config {
            api_football_key: String::new(),
            ..test_config()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_timezone() {
        let config = Config {
            fixtures_timezone: "Mars/Olympus".to_string(),
            ..test_config()
        };

        assert!(config.validate().is_err());
        assert_eq!(
            config.tip_settings().unwrap_err(),
            ConfigError::InvalidTimezone("Mars/Olympus".to_string())
        );
    }

    #[test]
    fn classic_profile_has_over_under_bucket() {
        let settings = test_config().tip_settings().unwrap();

        let names: Vec<_> = settings.buckets.names().collect();
        assert_eq!(names, vec!["safe", "risky", "overunder"]);
        assert!(settings.buckets.over_under().is_some());
    }

    #[test]
    fn tiered_profile_has_no_over_under_bucket() {
        let config = Config {
            bucket_profile: BucketProfile::Tiered,
            ..test_config()
        };
        let settings = config.tip_settings().unwrap();

        let names: Vec<_> = settings.buckets.names().collect();
        assert_eq!(names, vec!["safe", "risky", "bomb"]);
        assert!(!config.over_under_enabled());
    }

    #[test]
    fn over_under_toggle_overrides_profile() {
        let config = Config {
            bucket_profile: BucketProfile::Tiered,
            over_under_enabled: Some(true),
            over_under_capacity: 4,
            ..test_config()
        };
        let settings = config.tip_settings().unwrap();

        assert_eq!(settings.buckets.over_under().map(|b| b.capacity), Some(4));
    }

    #[test]
    fn tip_buckets_override_profile() {
        let config = Config {
            tip_buckets: Some("low:1.1-1.5:3,high:1.6-9:2".to_string()),
            over_under_enabled: Some(false),
            ..test_config()
        };
        let settings = config.tip_settings().unwrap();

        let names: Vec<_> = settings.buckets.names().collect();
        assert_eq!(names, vec!["low", "high"]);
        assert_eq!(settings.buckets.risk()[1].capacity, 2);
    }

    #[test]
    fn inverted_price_window_is_rejected() {
        let config = Config {
            min_price: dec!(3.0),
            max_price: dec!(2.0),
            ..test_config()
        };

        assert!(config.tip_settings().is_err());
    }
}
