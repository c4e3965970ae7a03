//! Forecast engine configuration (environment-driven).

use std::time::Duration;

use thiserror::Error;

use opsboard_forecast::{DEFAULT_HORIZON_MONTHS, ForecastPolicy};

/// Window within which repeated edits to one field of one part are coalesced.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

pub const ENV_DEBOUNCE_MS: &str = "OPSBOARD_DEBOUNCE_MS";
pub const ENV_HORIZON_MONTHS: &str = "OPSBOARD_HORIZON_MONTHS";
pub const ENV_HEALTHY_MONTHS: &str = "OPSBOARD_HEALTHY_MONTHS";
pub const ENV_REVIEW_MONTHS: &str = "OPSBOARD_REVIEW_MONTHS";
pub const ENV_CAUTION_MULTIPLE: &str = "OPSBOARD_CAUTION_MULTIPLE";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("inconsistent configuration: {0}")]
    Inconsistent(String),
}

/// Runtime settings of the forecast board.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub debounce: Duration,
    pub horizon_months: usize,
    pub policy: ForecastPolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            horizon_months: DEFAULT_HORIZON_MONTHS,
            policy: ForecastPolicy::default(),
        }
    }
}

impl ForecastConfig {
    /// Load from `OPSBOARD_*` environment variables; unset keys keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key → value source (environment, test map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = parse::<u64>(&lookup, ENV_DEBOUNCE_MS)? {
            config.debounce = Duration::from_millis(ms);
        }
        if let Some(months) = parse::<usize>(&lookup, ENV_HORIZON_MONTHS)? {
            config.horizon_months = months;
        }
        if let Some(v) = parse::<f64>(&lookup, ENV_HEALTHY_MONTHS)? {
            config.policy.healthy_months_of_supply = v;
        }
        if let Some(v) = parse::<f64>(&lookup, ENV_REVIEW_MONTHS)? {
            config.policy.review_months_of_supply = v;
        }
        if let Some(v) = parse::<f64>(&lookup, ENV_CAUTION_MULTIPLE)? {
            config.policy.caution_multiple = v;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_horizon_months(mut self, months: usize) -> Self {
        self.horizon_months = months;
        self
    }

    pub fn with_policy(mut self, policy: ForecastPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon_months == 0 {
            return Err(ConfigError::Inconsistent(
                "horizon must cover at least one month".to_string(),
            ));
        }

        let p = &self.policy;
        for (name, v) in [
            ("healthy months of supply", p.healthy_months_of_supply),
            ("review months of supply", p.review_months_of_supply),
            ("caution multiple", p.caution_multiple),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(ConfigError::Inconsistent(format!(
                    "{name} must be a finite positive number"
                )));
            }
        }

        if p.review_months_of_supply >= p.healthy_months_of_supply {
            return Err(ConfigError::Inconsistent(format!(
                "review threshold ({}) must be below healthy threshold ({})",
                p.review_months_of_supply, p.healthy_months_of_supply
            )));
        }

        Ok(())
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_source_yields_defaults() {
        let config = ForecastConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, ForecastConfig::default());
        assert_eq!(config.debounce, Duration::from_millis(500));
        assert_eq!(config.horizon_months, 6);
    }

    #[test]
    fn values_override_defaults() {
        let config = ForecastConfig::from_lookup(lookup(&[
            (ENV_DEBOUNCE_MS, "250"),
            (ENV_HORIZON_MONTHS, " 12 "),
            (ENV_HEALTHY_MONTHS, "4"),
            (ENV_REVIEW_MONTHS, "2"),
            (ENV_CAUTION_MULTIPLE, "2.5"),
        ]))
        .unwrap();

        assert_eq!(config.debounce, Duration::from_millis(250));
        assert_eq!(config.horizon_months, 12);
        assert_eq!(config.policy.healthy_months_of_supply, 4.0);
        assert_eq!(config.policy.review_months_of_supply, 2.0);
        assert_eq!(config.policy.caution_multiple, 2.5);
    }

    #[test]
    fn unparseable_value_names_the_key() {
        let err = ForecastConfig::from_lookup(lookup(&[(ENV_DEBOUNCE_MS, "soon")])).unwrap_err();
        match err {
            ConfigError::Invalid { key, value, .. } => {
                assert_eq!(key, ENV_DEBOUNCE_MS);
                assert_eq!(value, "soon");
            }
            other => panic!("Expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn review_threshold_must_be_below_healthy() {
        let err = ForecastConfig::from_lookup(lookup(&[(ENV_REVIEW_MONTHS, "3")])).unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let err = ForecastConfig::default().with_horizon_months(0).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Inconsistent(_)));
    }
}
