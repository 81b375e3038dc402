//! Payment Capture Strategies
//!
//! One port over the three ways a credential can be captured, selected once
//! at initialization and never re-evaluated for the lifetime of the
//! instance.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::PaymentConfiguration;
use crate::error::Result;

/// Capture strategy variant tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureStrategyKind {
    /// Embedded processor card widget with a local pay control
    #[serde(rename = "card-form")]
    DirectCardForm,

    /// Platform-rendered expedited wallet button
    #[serde(rename = "wallet-button")]
    ExpressWalletButton,

    /// Browser-native payment sheet behind a trigger control
    #[serde(rename = "payment-sheet")]
    NativePaymentSheet,
}

impl CaptureStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureStrategyKind::DirectCardForm => "card-form",
            CaptureStrategyKind::ExpressWalletButton => "wallet-button",
            CaptureStrategyKind::NativePaymentSheet => "payment-sheet",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "card-form" | "direct-card-form" => Some(CaptureStrategyKind::DirectCardForm),
            "wallet-button" | "express-wallet-button" => {
                Some(CaptureStrategyKind::ExpressWalletButton)
            }
            "payment-sheet" | "native-payment-sheet" => {
                Some(CaptureStrategyKind::NativePaymentSheet)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for CaptureStrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Basic card fields surfaced by the native payment sheet.
///
/// Transient; lives only for the submission that produced it.
#[derive(Clone)]
pub struct CardDetails {
    pub cardholder_name: Option<String>,
    pub number: String,
    pub expiry_month: String,
    pub expiry_year: String,
    pub security_code: Option<String>,
}

// The card number must never reach logs; Debug keeps the last four digits
// only.
impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let last4 = self
            .number
            .get(self.number.len().saturating_sub(4)..)
            .unwrap_or("");
        f.debug_struct("CardDetails")
            .field("number", &format!("•••• {last4}"))
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .finish_non_exhaustive()
    }
}

/// Strategy-produced value for one submission. Never persisted.
#[derive(Clone, Debug)]
pub enum PaymentCredential {
    /// Raw fields held inside an embedded processor widget; the tokenizer
    /// resolves the handle back to the field bundle
    MountedWidget { widget_id: String },

    /// Raw fields surfaced by the platform payment sheet, still to be
    /// tokenized
    SheetCard(CardDetails),

    /// Pre-validated wallet output; tokenization is a pass-through
    WalletMethod { payment_method_id: String },
}

/// Port over the three capture flows.
///
/// Callers never special-case the variant once a credential is obtained.
/// The component runs on a single cooperatively-scheduled UI thread, so the
/// port is deliberately not `Send`.
#[async_trait(?Send)]
pub trait CaptureStrategy {
    /// Which variant this is
    fn kind(&self) -> CaptureStrategyKind;

    /// Render the capture UI into the container identified by `selector`
    fn mount(&self, selector: &str) -> Result<()>;

    /// Resolve once the user completes the capture flow
    async fn await_submission(&self) -> Result<PaymentCredential>;

    /// Remove any rendered UI
    fn teardown(&self);
}

/// Port for the one-time platform capability query.
#[async_trait(?Send)]
pub trait CapabilityProbe {
    /// Can an expedited wallet payment be completed here?
    async fn express_wallet_available(&self, config: &PaymentConfiguration) -> Result<bool>;
}

/// Choose the capture strategy for this instance.
///
/// Runs exactly once, before first render. An explicit `payment-sheet`
/// capture mode skips the probe entirely; it is the only override that
/// bypasses detection. Probe failure is not fatal and falls back to the
/// embedded card form.
pub async fn select_strategy(
    config: &PaymentConfiguration,
    probe: &dyn CapabilityProbe,
) -> CaptureStrategyKind {
    if config.capture_mode == Some(CaptureStrategyKind::NativePaymentSheet) {
        return CaptureStrategyKind::NativePaymentSheet;
    }

    match probe.express_wallet_available(config).await {
        Ok(true) => CaptureStrategyKind::ExpressWalletButton,
        Ok(false) => CaptureStrategyKind::DirectCardForm,
        Err(err) => {
            tracing::debug!(error = %err, "Wallet capability probe failed, using card form");
            CaptureStrategyKind::DirectCardForm
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::CheckoutError;

    struct StubProbe {
        result: Result<bool>,
        calls: Cell<usize>,
    }

    impl StubProbe {
        fn available(available: bool) -> Self {
            Self {
                result: Ok(available),
                calls: Cell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err(CheckoutError::Capability("query threw".into())),
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl CapabilityProbe for StubProbe {
        async fn express_wallet_available(
            &self,
            _config: &PaymentConfiguration,
        ) -> Result<bool> {
            self.calls.set(self.calls.get() + 1);
            match &self.result {
                Ok(available) => Ok(*available),
                Err(err) => Err(CheckoutError::Capability(err.to_string())),
            }
        }
    }

    fn config() -> PaymentConfiguration {
        PaymentConfiguration::new("pk_test_key", "/charge", "/sw.js")
    }

    #[tokio::test]
    async fn test_wallet_preferred_when_available() {
        let probe = StubProbe::available(true);
        let kind = select_strategy(&config(), &probe).await;
        assert_eq!(kind, CaptureStrategyKind::ExpressWalletButton);
    }

    #[tokio::test]
    async fn test_card_form_when_wallet_unavailable() {
        let probe = StubProbe::available(false);
        let kind = select_strategy(&config(), &probe).await;
        assert_eq!(kind, CaptureStrategyKind::DirectCardForm);
    }

    #[tokio::test]
    async fn test_probe_failure_falls_back_to_card_form() {
        let probe = StubProbe::failing();
        let kind = select_strategy(&config(), &probe).await;
        assert_eq!(kind, CaptureStrategyKind::DirectCardForm);
    }

    #[tokio::test]
    async fn test_payment_sheet_override_skips_probe() {
        let probe = StubProbe::available(true);
        let mut config = config();
        config.capture_mode = Some(CaptureStrategyKind::NativePaymentSheet);

        let kind = select_strategy(&config, &probe).await;

        assert_eq!(kind, CaptureStrategyKind::NativePaymentSheet);
        assert_eq!(probe.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_other_overrides_do_not_bypass_detection() {
        let probe = StubProbe::available(true);
        let mut config = config();
        config.capture_mode = Some(CaptureStrategyKind::DirectCardForm);

        let kind = select_strategy(&config, &probe).await;

        assert_eq!(kind, CaptureStrategyKind::ExpressWalletButton);
        assert_eq!(probe.calls.get(), 1);
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            CaptureStrategyKind::DirectCardForm,
            CaptureStrategyKind::ExpressWalletButton,
            CaptureStrategyKind::NativePaymentSheet,
        ] {
            assert_eq!(CaptureStrategyKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(CaptureStrategyKind::from_str("unknown"), None);
    }

    #[test]
    fn test_card_details_debug_redacts_number() {
        let details = CardDetails {
            cardholder_name: Some("Ada Lovelace".into()),
            number: "4242424242424242".into(),
            expiry_month: "12".into(),
            expiry_year: "2030".into(),
            security_code: Some("123".into()),
        };

        let rendered = format!("{details:?}");
        assert!(rendered.contains("4242"));
        assert!(!rendered.contains("4242424242424242"));
        assert!(!rendered.contains("123"));
    }
}
