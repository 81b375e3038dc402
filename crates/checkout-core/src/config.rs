//! Payment Configuration
//!
//! Immutable merchant and processor settings, parsed once at component
//! initialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::capture::CaptureStrategyKind;
use crate::error::{CheckoutError, Result};

/// Merchant and processor settings for one component instance.
///
/// Construct with [`PaymentConfiguration::new`], deserialize from JSON, or
/// parse a DOM-style attribute map with
/// [`PaymentConfiguration::from_attributes`]. Read-only after
/// initialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentConfiguration {
    /// Publishable key for the external tokenization service
    pub processor_public_key: String,

    /// Charge amount in minor units (e.g. cents)
    #[serde(default)]
    pub amount_minor_units: u64,

    /// ISO currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    /// ISO country code
    #[serde(default = "default_country")]
    pub country: String,

    /// Card networks accepted by the wallet and the payment sheet
    #[serde(default = "default_networks")]
    pub supported_networks: Vec<String>,

    /// Card funding types accepted by the wallet and the payment sheet
    #[serde(default = "default_types")]
    pub supported_types: Vec<String>,

    /// Merchant endpoint that authorizes the charge
    pub authorization_endpoint: String,

    /// Background worker script registered after a successful charge
    pub worker_script_url: String,

    /// Explicit capture override; only the native payment sheet bypasses
    /// capability detection
    #[serde(default)]
    pub capture_mode: Option<CaptureStrategyKind>,
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_country() -> String {
    "US".to_string()
}

fn default_networks() -> Vec<String> {
    vec![
        "visa".to_string(),
        "mastercard".to_string(),
        "amex".to_string(),
        "discover".to_string(),
    ]
}

fn default_types() -> Vec<String> {
    vec!["credit".to_string(), "debit".to_string()]
}

impl PaymentConfiguration {
    /// Create a configuration with the three required options and defaults
    /// for everything else.
    pub fn new(
        processor_public_key: impl Into<String>,
        authorization_endpoint: impl Into<String>,
        worker_script_url: impl Into<String>,
    ) -> Self {
        Self {
            processor_public_key: processor_public_key.into(),
            amount_minor_units: 0,
            currency: default_currency(),
            country: default_country(),
            supported_networks: default_networks(),
            supported_types: default_types(),
            authorization_endpoint: authorization_endpoint.into(),
            worker_script_url: worker_script_url.into(),
            capture_mode: None,
        }
    }

    /// Parse a DOM-style attribute map.
    ///
    /// Attribute names are matched case-insensitively with dashes and
    /// underscores stripped, so both the canonical option names and the
    /// legacy kebab-case attributes (`stripe-public-key`,
    /// `server-endpoint`, `service-worker-url`) resolve. A malformed
    /// amount falls back to 0; missing required options are an error.
    pub fn from_attributes(attrs: &HashMap<String, String>) -> Result<Self> {
        let normalized: HashMap<String, &str> = attrs
            .iter()
            .map(|(key, value)| (normalize_key(key), value.as_str()))
            .collect();

        let get =
            |names: &[&str]| names.iter().find_map(|name| normalized.get(*name).copied());

        let require = |names: &[&str], display: &str| {
            get(names)
                .map(str::to_string)
                .ok_or_else(|| CheckoutError::Config(format!("{display} is required")))
        };

        let processor_public_key =
            require(&["processorpublickey", "stripepublickey"], "processor-public-key")?;
        let authorization_endpoint = require(
            &["authorizationendpoint", "serverendpoint"],
            "authorization-endpoint",
        )?;
        let worker_script_url = require(
            &["workerscripturl", "serviceworkerurl"],
            "worker-script-url",
        )?;

        let amount_minor_units = get(&["amount", "amountminorunits"])
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0);

        let capture_mode = get(&["capturemode"]).and_then(|raw| {
            let parsed = CaptureStrategyKind::from_str(raw);
            if parsed.is_none() {
                tracing::warn!(value = raw, "Unrecognized capture-mode, using detection");
            }
            parsed
        });

        Ok(Self {
            processor_public_key,
            amount_minor_units,
            currency: get(&["currency"]).map_or_else(default_currency, str::to_string),
            country: get(&["country"]).map_or_else(default_country, str::to_string),
            supported_networks: get(&["supportednetworks"])
                .map_or_else(default_networks, parse_list),
            supported_types: get(&["supportedtypes"]).map_or_else(default_types, parse_list),
            authorization_endpoint,
            worker_script_url,
            capture_mode,
        })
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_lowercase()
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_lowercase)
        .collect()
}
