use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LedgerError, Result};
use crate::interest::PenaltyConfig;

/// core configuration shared by every calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    #[serde(default)]
    pub penalty: PenaltyConfig,
    #[serde(default)]
    pub savings: SavingsConfig,
}

/// savings accrual configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsConfig {
    /// days per year for the daily deposit rate
    pub year_basis: u32,
}

impl Default for SavingsConfig {
    fn default() -> Self {
        Self { year_basis: 365 }
    }
}

impl CoreConfig {
    /// parse configuration from json, missing sections fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CoreConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.penalty.penalty_rate.is_negative() {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("penalty rate must not be negative, got {}", self.penalty.penalty_rate),
            });
        }
        if self.penalty.year_basis == 0 || self.savings.year_basis == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "year basis must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// configuration with a different flat penalty rate
    pub fn with_penalty_rate(mut self, rate: Rate) -> Self {
        self.penalty.penalty_rate = rate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = CoreConfig::default();
        assert_eq!(config.penalty.penalty_rate, Rate::from_percentage(5));
        assert_eq!(config.penalty.year_basis, 365);
        assert_eq!(config.savings.year_basis, 365);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_roundtrip_with_partial_input() {
        let config = CoreConfig::from_json(r#"{"savings": {"year_basis": 360}}"#).unwrap();
        assert_eq!(config.savings.year_basis, 360);
        assert_eq!(config.penalty, PenaltyConfig::default());

        let json = config.to_json().unwrap();
        let parsed = CoreConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let config = CoreConfig::default().with_penalty_rate(Rate::from_decimal(dec!(-0.01)));
        assert!(matches!(
            config.validate(),
            Err(LedgerError::InvalidConfiguration { .. })
        ));

        assert!(CoreConfig::from_json(r#"{"savings": {"year_basis": 0}}"#).is_err());
        assert!(CoreConfig::from_json("not json").is_err());
    }
}
