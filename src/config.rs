//! Configuration loading and validation.
//!
//! Configuration is read from a TOML file. Every section is optional and
//! falls back to [`Default`].
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [book]
//! capacity = 128
//!
//! [simulation]
//! seed = 7
//! agents = 5
//! events = 3
//! orders_per_agent = 4
//! starting_capital = "100"
//! min_odds = "1.2"
//! max_odds = "5.0"
//! min_stake = "1"
//! max_stake = "20"
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::ConfigError;
use crate::ledger::DEFAULT_BOOK_CAPACITY;

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl LoggingConfig {
    /// Initialize the tracing subscriber with this logging configuration.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

/// Order book sizing.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Slots pre-allocated per event book
    pub capacity: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_BOOK_CAPACITY,
        }
    }
}

/// Seeded simulation parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: u64,
    pub agents: usize,
    pub events: usize,
    pub orders_per_agent: usize,
    pub starting_capital: Decimal,
    pub min_odds: Decimal,
    pub max_odds: Decimal,
    pub min_stake: Decimal,
    pub max_stake: Decimal,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            agents: 10,
            events: 5,
            orders_per_agent: 3,
            starting_capital: Decimal::from(100),
            min_odds: Decimal::new(12, 1),
            max_odds: Decimal::from(5),
            min_stake: Decimal::ONE,
            max_stake: Decimal::from(20),
        }
    }
}

impl SimulationConfig {
    /// Check counts and ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            })
        };

        if self.agents == 0 {
            return invalid("simulation.agents", "must be at least 1");
        }
        if self.events == 0 {
            return invalid("simulation.events", "must be at least 1");
        }
        if self.orders_per_agent == 0 {
            return invalid("simulation.orders_per_agent", "must be at least 1");
        }
        if self.min_odds <= Decimal::ONE {
            return invalid("simulation.min_odds", "must be greater than 1");
        }
        if self.max_odds < self.min_odds {
            return invalid("simulation.max_odds", "must be >= min_odds");
        }
        if self.min_stake <= Decimal::ZERO {
            return invalid("simulation.min_stake", "must be greater than 0");
        }
        if self.max_stake < self.min_stake {
            return invalid("simulation.max_stake", "must be >= min_stake");
        }

        Ok(())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub book: BookConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Config {
    /// Parse and validate configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            })
        };

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return invalid("logging.format", "must be \"pretty\" or \"json\"");
        }

        self.simulation.validate()
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.book.capacity, DEFAULT_BOOK_CAPACITY);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::parse_toml(
            r#"
            [simulation]
            seed = 7
            agents = 2
            min_odds = "1.5"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.simulation.agents, 2);
        assert_eq!(config.simulation.min_odds, Decimal::new(15, 1));
        assert_eq!(config.simulation.events, SimulationConfig::default().events);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_invalid_ranges() {
        let err = Config::parse_toml("[simulation]\nmin_odds = \"1.0\"").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "simulation.min_odds",
                ..
            }
        ));

        let err = Config::parse_toml("[simulation]\nmin_stake = \"5\"\nmax_stake = \"2\"")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "simulation.max_stake",
                ..
            }
        ));

        let err = Config::parse_toml("[simulation]\nagents = 0").unwrap_err();
        assert!(err.to_string().contains("simulation.agents"));

        let err = Config::parse_toml("[logging]\nformat = \"xml\"").unwrap_err();
        assert!(err.to_string().contains("logging.format"));
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse_toml("[book\ncapacity = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[book]\ncapacity = 8\n\n[logging]\nformat = \"json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.book.capacity, 8);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/backlay.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile(_)));
    }
}
