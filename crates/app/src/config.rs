//! Billing configuration.
//!
//! Read from the environment at startup; the user's saved settings in the
//! `settings` store take precedence once present.

use serde::{Deserialize, Serialize};

use forgebill_core::DomainResult;
use forgebill_parties::StateCode;
use forgebill_pricing::{PriceMode, RoundingMode};

pub const ENV_SELLER_STATE: &str = "FORGEBILL_SELLER_STATE";
pub const ENV_BILL_PREFIX: &str = "FORGEBILL_BILL_PREFIX";
pub const ENV_ROUND_OFF: &str = "FORGEBILL_ROUND_OFF";
pub const ENV_PRICE_MODE: &str = "FORGEBILL_PRICE_MODE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingConfig {
    /// GST state code of the seller; decides intrastate vs interstate.
    pub seller_state: String,
    pub bill_prefix: String,
    /// Round-off applied to every bill's grand total; `None` disables it.
    pub round_off: Option<RoundingMode>,
    /// Whether GST bill rates include tax.
    pub price_mode: PriceMode,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            seller_state: "27".to_string(),
            bill_prefix: "INV".to_string(),
            round_off: Some(RoundingMode::Nearest),
            price_mode: PriceMode::Exclusive,
        }
    }
}

impl BillingConfig {
    /// Read the `FORGEBILL_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys keep their default; invalid
    /// values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let mut config = defaults.clone();

        if let Some(raw) = lookup(ENV_SELLER_STATE) {
            match raw.parse::<StateCode>() {
                Ok(code) => config.seller_state = code.to_string(),
                Err(err) => {
                    tracing::warn!(key = ENV_SELLER_STATE, value = %raw, error = %err, "invalid seller state; using default");
                }
            }
        }

        if let Some(raw) = lookup(ENV_BILL_PREFIX) {
            let prefix = raw.trim();
            if prefix.is_empty() || prefix.contains(char::is_whitespace) {
                tracing::warn!(key = ENV_BILL_PREFIX, value = %raw, "invalid bill prefix; using default");
            } else {
                config.bill_prefix = prefix.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_ROUND_OFF) {
            match parse_round_off(&raw) {
                Some(mode) => config.round_off = mode,
                None => {
                    tracing::warn!(key = ENV_ROUND_OFF, value = %raw, "invalid round-off mode; using default");
                }
            }
        }

        if let Some(raw) = lookup(ENV_PRICE_MODE) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "exclusive" => config.price_mode = PriceMode::Exclusive,
                "inclusive" => config.price_mode = PriceMode::Inclusive,
                _ => {
                    tracing::warn!(key = ENV_PRICE_MODE, value = %raw, "invalid price mode; using default");
                }
            }
        }

        if config != defaults {
            tracing::info!(?config, "billing config loaded from environment");
        }
        config
    }

    pub fn seller_state_code(&self) -> DomainResult<StateCode> {
        self.seller_state.parse()
    }
}

/// `Some(None)` is an explicit "none"; `None` is unrecognised.
fn parse_round_off(raw: &str) -> Option<Option<RoundingMode>> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "nearest" => Some(Some(RoundingMode::Nearest)),
        "up" => Some(Some(RoundingMode::Up)),
        "down" => Some(Some(RoundingMode::Down)),
        "none" | "off" => Some(None),
        _ => None,
    }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = BillingConfig::from_lookup(lookup(&[]));
        assert_eq!(config, BillingConfig::default());
        assert_eq!(config.seller_state_code().unwrap().as_str(), "27");
    }

    #[test]
    fn reads_every_key() {
        let config = BillingConfig::from_lookup(lookup(&[
            (ENV_SELLER_STATE, "29"),
            (ENV_BILL_PREFIX, "GST"),
            (ENV_ROUND_OFF, "Down"),
            (ENV_PRICE_MODE, "inclusive"),
        ]));
        assert_eq!(config.seller_state, "29");
        assert_eq!(config.bill_prefix, "GST");
        assert_eq!(config.round_off, Some(RoundingMode::Down));
        assert_eq!(config.price_mode, PriceMode::Inclusive);
    }

    #[test]
    fn round_off_can_be_disabled() {
        let config = BillingConfig::from_lookup(lookup(&[(ENV_ROUND_OFF, "none")]));
        assert_eq!(config.round_off, None);
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = BillingConfig::from_lookup(lookup(&[
            (ENV_SELLER_STATE, "45"),
            (ENV_BILL_PREFIX, "  "),
            (ENV_ROUND_OFF, "sideways"),
            (ENV_PRICE_MODE, "maybe"),
        ]));
        assert_eq!(config, BillingConfig::default());
    }

    #[test]
    fn partial_settings_document_fills_defaults() {
        let config: BillingConfig = serde_json::from_str(r#"{"bill_prefix":"BILL"}"#).unwrap();
        assert_eq!(config.bill_prefix, "BILL");
        assert_eq!(config.seller_state, "27");
        assert_eq!(config.round_off, Some(RoundingMode::Nearest));
    }
}
