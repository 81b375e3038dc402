//! # checkout-core
//!
//! Strategy selection and payment-to-install orchestration for the
//! paid-pwa component: one payment unlocks offline installability.
//!
//! ## Flow
//!
//! ```text
//! ┌────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐   ┌────────────┐
//! │ config │──▶│ detector │──▶│ strategy │──▶│ tokenizer │──▶│ authorizer │
//! └────────┘   └──────────┘   └──────────┘   └───────────┘   └─────┬──────┘
//!                                                                  │ Authorized
//!                            pwa-installed ◀── activator ◀─────────┘
//! ```
//!
//! Data flows one way per submission cycle. The [`CheckoutController`]
//! mediates every transition and is the only component with mutable
//! per-submission state; collaborators are injected as ports so hosts and
//! tests can substitute them without global state.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_core::{
//!     select_strategy, CheckoutController, HttpAuthorizationClient,
//!     PaymentConfiguration,
//! };
//!
//! let config = PaymentConfiguration::new("pk_live_xxx", "/charge", "/sw.js");
//! let kind = select_strategy(&config, &probe).await;
//!
//! let controller = CheckoutController::new(
//!     config,
//!     strategy,   // capture UI for `kind`
//!     tokenizer,  // external processor
//!     Rc::new(HttpAuthorizationClient::new("/charge")),
//!     activator,  // worker registration
//!     observer,   // UI surfacing
//! );
//!
//! // One cycle per activation of the action control.
//! let outcome = controller.submit().await;
//! ```

mod authorize;
mod capture;
mod config;
mod controller;
mod error;
mod install;
mod tokenize;

pub use authorize::{
    AuthorizationOutcome, Authorizer, ChargeRequest, HttpAuthorizationClient, classify_status,
};
pub use capture::{
    CapabilityProbe, CaptureStrategy, CaptureStrategyKind, CardDetails, PaymentCredential,
    select_strategy,
};
pub use config::PaymentConfiguration;
pub use controller::{CheckoutController, CheckoutObserver, CycleOutcome, NullObserver, UiState};
pub use error::{CheckoutError, GENERIC_PAYMENT_FAILURE, Result};
pub use install::{InstallReport, InstallabilityActivator, PWA_INSTALLED_EVENT};
pub use tokenize::{PaymentToken, TokenExchange, Tokenizer};
