//! Configuration for the Pool Funding subsystem.
//!
//! Loaded once at startup (JSON and/or `QC_FUNDERS_*` environment
//! overrides), validated, then held immutably by the service.

use crate::domain::value_objects::Weight;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_types::{Denom, NATIVE_DENOM};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{info, warn};

/// Hard upper bound on active funders per pool.
pub const MAX_ACTIVE_FUNDERS: usize = 50;

/// Default `min_funding_multiple`: a funding must last at least this many bundles.
pub const DEFAULT_MIN_FUNDING_MULTIPLE: u64 = 20;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "QC_FUNDERS_";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidOverride { key: String, value: String },

    #[error("Duplicate whitelist entry for {0}")]
    DuplicateDenom(Denom),

    #[error("Empty denom in coin whitelist")]
    EmptyDenom,

    #[error("min_funding_multiple must be at least 1")]
    ZeroMultiple,

    #[error("max_active_funders must be between 1 and {max}, got {value}")]
    InvalidCapacity { value: usize, max: usize },
}

/// One fundable currency and its limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub denom: Denom,
    /// Minimum balance a funding must hold in this currency.
    pub min_funding_amount: U256,
    /// Minimum per-bundle rate in this currency.
    pub min_funding_amount_per_bundle: U256,
    /// Weight used when ranking fundings.
    pub coin_weight: Weight,
}

impl WhitelistEntry {
    /// Native currency with no minimums and weight one.
    pub fn native_unbounded(denom: impl Into<Denom>) -> Self {
        Self {
            denom: denom.into(),
            min_funding_amount: U256::zero(),
            min_funding_amount_per_bundle: U256::zero(),
            coin_weight: Weight::one(),
        }
    }
}

/// Funding parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundersParams {
    pub native_denom: Denom,
    /// Fundable currencies. Empty means native only, weight one, no minimums.
    pub coin_whitelist: Vec<WhitelistEntry>,
    /// Balance must cover at least this many bundles at the agreed rate.
    pub min_funding_multiple: u64,
    /// Active funder slots per pool.
    pub max_active_funders: usize,
}

impl Default for FundersParams {
    fn default() -> Self {
        Self {
            native_denom: NATIVE_DENOM.to_string(),
            coin_whitelist: vec![WhitelistEntry {
                denom: NATIVE_DENOM.to_string(),
                min_funding_amount: U256::from(1_000_000_000u64),
                min_funding_amount_per_bundle: U256::from(100_000u64),
                coin_weight: Weight::one(),
            }],
            min_funding_multiple: DEFAULT_MIN_FUNDING_MULTIPLE,
            max_active_funders: MAX_ACTIVE_FUNDERS,
        }
    }
}

impl FundersParams {
    /// Whitelist entry for `denom`, if the currency is fundable.
    pub fn whitelist_entry(&self, denom: &str) -> Option<WhitelistEntry> {
        if self.coin_whitelist.is_empty() {
            return (denom == self.native_denom)
                .then(|| WhitelistEntry::native_unbounded(denom));
        }
        self.coin_whitelist
            .iter()
            .find(|entry| entry.denom == denom)
            .cloned()
    }

    /// Ranking weight of `denom`. Non-whitelisted currencies weigh zero.
    pub fn weight_of(&self, denom: &str) -> Weight {
        self.whitelist_entry(denom)
            .map(|entry| entry.coin_weight)
            .unwrap_or_else(Weight::zero)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_funding_multiple == 0 {
            return Err(ConfigError::ZeroMultiple);
        }
        if self.max_active_funders == 0 || self.max_active_funders > MAX_ACTIVE_FUNDERS {
            return Err(ConfigError::InvalidCapacity {
                value: self.max_active_funders,
                max: MAX_ACTIVE_FUNDERS,
            });
        }
        if self.native_denom.is_empty() {
            return Err(ConfigError::EmptyDenom);
        }

        let mut seen = BTreeSet::new();
        for entry in &self.coin_whitelist {
            if entry.denom.is_empty() {
                return Err(ConfigError::EmptyDenom);
            }
            if !seen.insert(entry.denom.as_str()) {
                return Err(ConfigError::DuplicateDenom(entry.denom.clone()));
            }
        }
        Ok(())
    }
}

/// Top-level subsystem configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingConfig {
    pub params: FundersParams,
}

impl FundingConfig {
    pub fn new(params: FundersParams) -> Self {
        Self { params }
    }

    /// Permissive parameters for tests: no minimums, multiple of one.
    pub fn for_testing() -> Self {
        Self {
            params: FundersParams {
                native_denom: NATIVE_DENOM.to_string(),
                coin_whitelist: vec![WhitelistEntry {
                    denom: NATIVE_DENOM.to_string(),
                    min_funding_amount: U256::one(),
                    min_funding_amount_per_bundle: U256::one(),
                    coin_weight: Weight::one(),
                }],
                min_funding_multiple: 1,
                max_active_funders: MAX_ACTIVE_FUNDERS,
            },
        }
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.params.validate()?;
        Ok(config)
    }

    /// Applies `QC_FUNDERS_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup, then validates.
    ///
    /// Recognized keys: `QC_FUNDERS_NATIVE_DENOM`, `QC_FUNDERS_MIN_FUNDING_MULTIPLE`,
    /// `QC_FUNDERS_MAX_ACTIVE_FUNDERS`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let key = |name: &str| format!("{}{}", ENV_PREFIX, name);

        if let Some(denom) = lookup(&key("NATIVE_DENOM")) {
            info!(denom = %denom, "Overriding native denom from environment");
            self.params.native_denom = denom;
        }
        if let Some(value) = lookup(&key("MIN_FUNDING_MULTIPLE")) {
            self.params.min_funding_multiple =
                value.parse().map_err(|_| ConfigError::InvalidOverride {
                    key: key("MIN_FUNDING_MULTIPLE"),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = lookup(&key("MAX_ACTIVE_FUNDERS")) {
            self.params.max_active_funders =
                value.parse().map_err(|_| ConfigError::InvalidOverride {
                    key: key("MAX_ACTIVE_FUNDERS"),
                    value: value.clone(),
                })?;
        }

        if let Err(e) = self.params.validate() {
            warn!(error = %e, "Rejected funding configuration");
            return Err(e);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_params() {
        let params = FundersParams::default();
        assert_eq!(params.min_funding_multiple, 20);
        assert_eq!(params.max_active_funders, 50);
        let native = params.whitelist_entry(NATIVE_DENOM).unwrap();
        assert_eq!(native.min_funding_amount, U256::from(1_000_000_000u64));
        assert_eq!(native.min_funding_amount_per_bundle, U256::from(100_000u64));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_empty_whitelist_means_native_only() {
        let params = FundersParams {
            coin_whitelist: vec![],
            ..FundersParams::default()
        };
        assert_eq!(params.weight_of(NATIVE_DENOM), Weight::one());
        assert_eq!(params.weight_of("uusdc"), Weight::zero());
        assert!(params.whitelist_entry("uusdc").is_none());
    }

    #[test]
    fn test_from_json_partial_document() {
        let json = r#"{"params":{"min_funding_multiple":1000}}"#;
        let config = FundingConfig::from_json(json).unwrap();
        assert_eq!(config.params.min_funding_multiple, 1000);
        assert_eq!(config.params.max_active_funders, MAX_ACTIVE_FUNDERS);
    }

    #[test]
    fn test_from_json_with_weights() {
        let json = r#"{"params":{"coin_whitelist":[
            {"denom":"uqc","min_funding_amount":"0x1","min_funding_amount_per_bundle":"0x1","coin_weight":"1"},
            {"denom":"uusdc","min_funding_amount":"0x1","min_funding_amount_per_bundle":"0x1","coin_weight":"0.0358"}
        ]}}"#;
        let config = FundingConfig::from_json(json).unwrap();
        assert_eq!(config.params.weight_of("uusdc").to_string(), "0.0358");
    }

    #[test]
    fn test_duplicate_denom_rejected() {
        let mut params = FundersParams::default();
        params.coin_whitelist.push(params.coin_whitelist[0].clone());
        assert_eq!(
            params.validate(),
            Err(ConfigError::DuplicateDenom(NATIVE_DENOM.to_string()))
        );
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("QC_FUNDERS_MIN_FUNDING_MULTIPLE", "5"),
            ("QC_FUNDERS_MAX_ACTIVE_FUNDERS", "10"),
        ]
        .into_iter()
        .collect();
        let config = FundingConfig::default()
            .with_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.params.min_funding_multiple, 5);
        assert_eq!(config.params.max_active_funders, 10);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let result = FundingConfig::default().with_overrides(|k| {
            (k == "QC_FUNDERS_MAX_ACTIVE_FUNDERS").then(|| "51".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidCapacity { value: 51, .. })
        ));

        let result = FundingConfig::default()
            .with_overrides(|k| (k == "QC_FUNDERS_MIN_FUNDING_MULTIPLE").then(|| "x".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidOverride { .. })));
    }
}
