//! Orchestration Controller
//!
//! Drives one submission cycle through capture, tokenization, authorization
//! and activation, owns the single live UI state, and gates admission so a
//! second cycle can never start while one is in flight.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use uuid::Uuid;

use crate::authorize::{AuthorizationOutcome, Authorizer};
use crate::capture::CaptureStrategy;
use crate::config::PaymentConfiguration;
use crate::install::{InstallReport, InstallabilityActivator};
use crate::tokenize::{TokenExchange, Tokenizer};

/// UI state; exactly one live value per instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiState {
    Idle,
    Submitting,
    Authorizing,
    /// Resting failure state: the action control is re-enabled and the
    /// message populates the error region until the next activation.
    Error(String),
    /// Terminal; the instance accepts no further submissions.
    Success,
}

impl UiState {
    /// Whether the action control is enabled in this state.
    pub fn control_enabled(&self) -> bool {
        matches!(self, UiState::Idle | UiState::Error(_))
    }

    /// Text for the error region, if any.
    pub fn error_text(&self) -> Option<&str> {
        match self {
            UiState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// How a call to [`CheckoutController::submit`] ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A cycle was already in flight, or the instance already succeeded;
    /// the activation was a no-op
    NotAccepted,

    /// The cycle failed; the error region holds the user message
    Failed,

    /// Charge authorized; `installed` carries the activation result
    Completed { installed: bool },
}

/// Receives UI-state transitions and the terminal install report.
///
/// Default methods are no-ops so hosts only override what they surface.
pub trait CheckoutObserver {
    fn state_changed(&self, _state: &UiState) {}
    fn installed(&self, _report: &InstallReport) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl CheckoutObserver for NullObserver {}

/// The orchestration state machine.
///
/// Collaborators are injected as ports; the controller holds the only
/// mutable per-submission state. Everything runs on one UI thread, so the
/// controller lives in an `Rc` and keeps state in a `RefCell` that is
/// never borrowed across a suspension point.
pub struct CheckoutController {
    config: PaymentConfiguration,
    strategy: Rc<dyn CaptureStrategy>,
    tokenizer: Rc<dyn Tokenizer>,
    authorizer: Rc<dyn Authorizer>,
    activator: Rc<dyn InstallabilityActivator>,
    observer: Rc<dyn CheckoutObserver>,
    state: RefCell<UiState>,
}

impl CheckoutController {
    pub fn new(
        config: PaymentConfiguration,
        strategy: Rc<dyn CaptureStrategy>,
        tokenizer: Rc<dyn Tokenizer>,
        authorizer: Rc<dyn Authorizer>,
        activator: Rc<dyn InstallabilityActivator>,
        observer: Rc<dyn CheckoutObserver>,
    ) -> Self {
        Self {
            config,
            strategy,
            tokenizer,
            authorizer,
            activator,
            observer,
            state: RefCell::new(UiState::Idle),
        }
    }

    /// Current UI state.
    pub fn state(&self) -> UiState {
        self.state.borrow().clone()
    }

    pub fn config(&self) -> &PaymentConfiguration {
        &self.config
    }

    /// The capture strategy selected for this instance.
    pub fn strategy(&self) -> &Rc<dyn CaptureStrategy> {
        &self.strategy
    }

    /// Remove the capture UI.
    pub fn teardown(&self) {
        self.strategy.teardown();
    }

    /// Run one submission cycle.
    ///
    /// The state gate is the sole admission control: activations while
    /// Submitting or Authorizing, or after Success, are no-ops. Entering
    /// Submitting clears the error region and disables the control until a
    /// terminal state is reached.
    pub async fn submit(&self) -> CycleOutcome {
        {
            let mut state = self.state.borrow_mut();
            if !state.control_enabled() {
                return CycleOutcome::NotAccepted;
            }
            *state = UiState::Submitting;
        }
        self.observer.state_changed(&UiState::Submitting);

        let cycle_id = Uuid::new_v4();
        tracing::debug!(
            %cycle_id,
            started_at = %Utc::now(),
            strategy = %self.strategy.kind(),
            amount_minor_units = self.config.amount_minor_units,
            "Submission cycle started"
        );

        let credential = match self.strategy.await_submission().await {
            Ok(credential) => credential,
            Err(err) => {
                tracing::warn!(%cycle_id, error = %err, "Capture produced no credential");
                return self.fail(err.user_message());
            }
        };

        let token = match self.tokenizer.exchange(&credential).await {
            TokenExchange::Token(token) => token,
            TokenExchange::Error { message } => {
                tracing::warn!(%cycle_id, provider_message = %message, "Tokenization rejected the credential");
                return self.fail(message);
            }
        };

        self.set_state(UiState::Authorizing);

        let outcome = self
            .authorizer
            .authorize(token, self.config.amount_minor_units)
            .await;

        if let Some(user_text) = outcome.user_message() {
            match &outcome {
                AuthorizationOutcome::Declined { detail } => {
                    tracing::warn!(%cycle_id, %detail, "Charge declined");
                }
                AuthorizationOutcome::NetworkError { detail } => {
                    tracing::warn!(%cycle_id, %detail, "Authorization transport failure");
                }
                AuthorizationOutcome::Authorized => {}
            }
            return self.fail(user_text.to_string());
        }

        // Success is visible before activation resolves; an install failure
        // cannot revert an authorized charge.
        self.set_state(UiState::Success);

        let report = self
            .activator
            .activate(&self.config.worker_script_url)
            .await;
        tracing::info!(%cycle_id, success = report.success, "Install activation resolved");
        self.observer.installed(&report);

        CycleOutcome::Completed {
            installed: report.success,
        }
    }

    fn set_state(&self, next: UiState) {
        *self.state.borrow_mut() = next.clone();
        self.observer.state_changed(&next);
    }

    fn fail(&self, message: String) -> CycleOutcome {
        self.set_state(UiState::Error(message));
        CycleOutcome::Failed
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::*;
    use crate::capture::{CaptureStrategyKind, CardDetails, PaymentCredential};
    use crate::error::{CheckoutError, GENERIC_PAYMENT_FAILURE, Result};
    use crate::tokenize::PaymentToken;

    struct StubStrategy {
        kind: CaptureStrategyKind,
        outcome: std::result::Result<PaymentCredential, String>,
        /// Extra scheduler yields before resolving, to hold a cycle open
        delay_polls: usize,
    }

    impl StubStrategy {
        fn resolving(kind: CaptureStrategyKind, credential: PaymentCredential) -> Self {
            Self {
                kind,
                outcome: Ok(credential),
                delay_polls: 0,
            }
        }

        fn card_form() -> Self {
            Self::resolving(
                CaptureStrategyKind::DirectCardForm,
                PaymentCredential::MountedWidget {
                    widget_id: "widget-1".into(),
                },
            )
        }

        fn slow(mut self, polls: usize) -> Self {
            self.delay_polls = polls;
            self
        }
    }

    #[async_trait(?Send)]
    impl CaptureStrategy for StubStrategy {
        fn kind(&self) -> CaptureStrategyKind {
            self.kind
        }

        fn mount(&self, _selector: &str) -> Result<()> {
            Ok(())
        }

        async fn await_submission(&self) -> Result<PaymentCredential> {
            for _ in 0..self.delay_polls {
                tokio::task::yield_now().await;
            }
            match &self.outcome {
                Ok(credential) => Ok(credential.clone()),
                Err(message) => Err(CheckoutError::Capture(message.clone())),
            }
        }

        fn teardown(&self) {}
    }

    struct StubTokenizer {
        /// One scripted outcome per cycle, in order
        script: RefCell<VecDeque<std::result::Result<String, String>>>,
        calls: Cell<usize>,
    }

    impl StubTokenizer {
        fn issuing(token: &str) -> Self {
            Self::scripted(vec![Ok(token.to_string())])
        }

        fn rejecting(message: &str) -> Self {
            Self::scripted(vec![Err(message.to_string())])
        }

        fn scripted(script: Vec<std::result::Result<String, String>>) -> Self {
            Self {
                script: RefCell::new(script.into()),
                calls: Cell::new(0),
            }
        }
    }

    #[async_trait(?Send)]
    impl Tokenizer for StubTokenizer {
        async fn exchange(&self, _credential: &PaymentCredential) -> TokenExchange {
            self.calls.set(self.calls.get() + 1);
            match self.script.borrow_mut().pop_front() {
                Some(Ok(token)) => TokenExchange::Token(PaymentToken::new(token)),
                Some(Err(message)) => TokenExchange::Error { message },
                None => panic!("tokenizer called more often than scripted"),
            }
        }
    }

    struct StubAuthorizer {
        outcome: AuthorizationOutcome,
        calls: Cell<usize>,
        last_request: RefCell<Option<(String, u64)>>,
    }

    impl StubAuthorizer {
        fn with(outcome: AuthorizationOutcome) -> Rc<Self> {
            Rc::new(Self {
                outcome,
                calls: Cell::new(0),
                last_request: RefCell::new(None),
            })
        }

        fn authorized() -> Rc<Self> {
            Self::with(AuthorizationOutcome::Authorized)
        }
    }

    #[async_trait(?Send)]
    impl Authorizer for StubAuthorizer {
        async fn authorize(
            &self,
            token: PaymentToken,
            amount_minor_units: u64,
        ) -> AuthorizationOutcome {
            self.calls.set(self.calls.get() + 1);
            *self.last_request.borrow_mut() =
                Some((token.into_inner(), amount_minor_units));
            self.outcome.clone()
        }
    }

    struct StubActivator {
        success: bool,
        calls: Cell<usize>,
    }

    impl StubActivator {
        fn succeeding() -> Rc<Self> {
            Rc::new(Self {
                success: true,
                calls: Cell::new(0),
            })
        }

        fn failing() -> Rc<Self> {
            Rc::new(Self {
                success: false,
                calls: Cell::new(0),
            })
        }
    }

    #[async_trait(?Send)]
    impl InstallabilityActivator for StubActivator {
        async fn activate(&self, _worker_script_url: &str) -> InstallReport {
            self.calls.set(self.calls.get() + 1);
            InstallReport {
                success: self.success,
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        states: RefCell<Vec<UiState>>,
        installs: RefCell<Vec<InstallReport>>,
    }

    impl CheckoutObserver for Recorder {
        fn state_changed(&self, state: &UiState) {
            self.states.borrow_mut().push(state.clone());
        }

        fn installed(&self, report: &InstallReport) {
            self.installs.borrow_mut().push(*report);
        }
    }

    fn config_with_amount(amount: u64) -> PaymentConfiguration {
        let mut config = PaymentConfiguration::new("pk_test_key", "/charge", "/sw.js");
        config.amount_minor_units = amount;
        config
    }

    fn controller(
        strategy: StubStrategy,
        tokenizer: StubTokenizer,
        authorizer: &Rc<StubAuthorizer>,
        activator: &Rc<StubActivator>,
        observer: &Rc<Recorder>,
    ) -> CheckoutController {
        CheckoutController::new(
            config_with_amount(199),
            Rc::new(strategy),
            Rc::new(tokenizer),
            Rc::clone(authorizer) as Rc<dyn Authorizer>,
            Rc::clone(activator) as Rc<dyn InstallabilityActivator>,
            Rc::clone(observer) as Rc<dyn CheckoutObserver>,
        )
    }

    #[tokio::test]
    async fn test_every_strategy_kind_reaches_success() {
        let credentials = [
            (
                CaptureStrategyKind::DirectCardForm,
                PaymentCredential::MountedWidget {
                    widget_id: "widget-1".into(),
                },
            ),
            (
                CaptureStrategyKind::ExpressWalletButton,
                PaymentCredential::WalletMethod {
                    payment_method_id: "pm_1".into(),
                },
            ),
            (
                CaptureStrategyKind::NativePaymentSheet,
                PaymentCredential::SheetCard(CardDetails {
                    cardholder_name: None,
                    number: "4242424242424242".into(),
                    expiry_month: "12".into(),
                    expiry_year: "2030".into(),
                    security_code: None,
                }),
            ),
        ];

        for (kind, credential) in credentials {
            let authorizer = StubAuthorizer::authorized();
            let activator = StubActivator::succeeding();
            let observer = Rc::new(Recorder::default());
            let controller = controller(
                StubStrategy::resolving(kind, credential),
                StubTokenizer::issuing("tok_1"),
                &authorizer,
                &activator,
                &observer,
            );

            let outcome = controller.submit().await;

            assert_eq!(outcome, CycleOutcome::Completed { installed: true });
            assert_eq!(controller.state(), UiState::Success);
            assert_eq!(
                *observer.states.borrow(),
                vec![UiState::Submitting, UiState::Authorizing, UiState::Success]
            );
            assert_eq!(
                *observer.installs.borrow(),
                vec![InstallReport { success: true }]
            );
            assert_eq!(authorizer.calls.get(), 1);
        }
    }

    #[tokio::test]
    async fn test_charge_request_carries_token_and_amount() {
        let authorizer = StubAuthorizer::authorized();
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form(),
            StubTokenizer::issuing("tok_1"),
            &authorizer,
            &activator,
            &observer,
        );

        controller.submit().await;

        assert_eq!(
            *authorizer.last_request.borrow(),
            Some(("tok_1".to_string(), 199))
        );
    }

    #[tokio::test]
    async fn test_tokenizer_error_short_circuits_authorization() {
        let authorizer = StubAuthorizer::authorized();
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form(),
            StubTokenizer::rejecting("Your card number is incomplete."),
            &authorizer,
            &activator,
            &observer,
        );

        let outcome = controller.submit().await;

        assert_eq!(outcome, CycleOutcome::Failed);
        assert_eq!(authorizer.calls.get(), 0);
        assert_eq!(activator.calls.get(), 0);
        assert!(observer.installs.borrow().is_empty());

        let state = controller.state();
        assert_eq!(state.error_text(), Some("Your card number is incomplete."));
        assert!(state.control_enabled());
    }

    #[tokio::test]
    async fn test_declined_charge_shows_generic_message() {
        let authorizer = StubAuthorizer::with(AuthorizationOutcome::Declined {
            detail: "authorization endpoint returned status 402".into(),
        });
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form(),
            StubTokenizer::issuing("tok_1"),
            &authorizer,
            &activator,
            &observer,
        );

        let outcome = controller.submit().await;

        assert_eq!(outcome, CycleOutcome::Failed);
        assert_eq!(activator.calls.get(), 0);
        assert!(observer.installs.borrow().is_empty());

        let state = controller.state();
        // The server detail never reaches the error region.
        assert_eq!(state.error_text(), Some(GENERIC_PAYMENT_FAILURE));
        assert!(state.control_enabled());
    }

    #[tokio::test]
    async fn test_network_failure_surfaces_the_same_text() {
        let authorizer = StubAuthorizer::with(AuthorizationOutcome::NetworkError {
            detail: "connection refused".into(),
        });
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form(),
            StubTokenizer::issuing("tok_1"),
            &authorizer,
            &activator,
            &observer,
        );

        controller.submit().await;

        assert_eq!(
            controller.state().error_text(),
            Some(GENERIC_PAYMENT_FAILURE)
        );
        assert_eq!(activator.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_capture_failure_returns_to_enabled_control() {
        let authorizer = StubAuthorizer::authorized();
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let strategy = StubStrategy {
            kind: CaptureStrategyKind::ExpressWalletButton,
            outcome: Err("The wallet sheet was dismissed.".into()),
            delay_polls: 0,
        };
        let controller = controller(
            strategy,
            StubTokenizer::scripted(vec![]),
            &authorizer,
            &activator,
            &observer,
        );

        let outcome = controller.submit().await;

        assert_eq!(outcome, CycleOutcome::Failed);
        assert_eq!(
            controller.state().error_text(),
            Some("The wallet sheet was dismissed.")
        );
        assert!(controller.state().control_enabled());
        assert_eq!(authorizer.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_rapid_activation_admits_one_cycle() {
        let authorizer = StubAuthorizer::authorized();
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form().slow(4),
            StubTokenizer::issuing("tok_1"),
            &authorizer,
            &activator,
            &observer,
        );

        let (first, second) = tokio::join!(controller.submit(), controller.submit());

        assert_eq!(first, CycleOutcome::Completed { installed: true });
        assert_eq!(second, CycleOutcome::NotAccepted);
        assert_eq!(authorizer.calls.get(), 1);
        assert_eq!(observer.installs.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_cycles_never_register_worker() {
        let activator = StubActivator::succeeding();

        let declining = StubAuthorizer::with(AuthorizationOutcome::Declined {
            detail: "authorization endpoint returned status 500".into(),
        });
        let observer = Rc::new(Recorder::default());
        let controller = CheckoutController::new(
            config_with_amount(199),
            Rc::new(StubStrategy::card_form()),
            Rc::new(StubTokenizer::scripted(vec![
                Ok("tok_1".to_string()),
                Ok("tok_2".to_string()),
            ])),
            Rc::clone(&declining) as Rc<dyn Authorizer>,
            Rc::clone(&activator) as Rc<dyn InstallabilityActivator>,
            Rc::clone(&observer) as Rc<dyn CheckoutObserver>,
        );

        controller.submit().await;
        controller.submit().await;
        assert_eq!(activator.calls.get(), 0);

        // Only an authorized outcome triggers exactly one registration.
        let authorizer = StubAuthorizer::authorized();
        let observer = Rc::new(Recorder::default());
        let controller = controller_from_parts(&authorizer, &activator, &observer);
        controller.submit().await;
        assert_eq!(activator.calls.get(), 1);
    }

    fn controller_from_parts(
        authorizer: &Rc<StubAuthorizer>,
        activator: &Rc<StubActivator>,
        observer: &Rc<Recorder>,
    ) -> CheckoutController {
        controller(
            StubStrategy::card_form(),
            StubTokenizer::issuing("tok_1"),
            authorizer,
            activator,
            observer,
        )
    }

    #[tokio::test]
    async fn test_success_is_terminal() {
        let authorizer = StubAuthorizer::authorized();
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form(),
            StubTokenizer::issuing("tok_1"),
            &authorizer,
            &activator,
            &observer,
        );

        assert_eq!(
            controller.submit().await,
            CycleOutcome::Completed { installed: true }
        );
        assert_eq!(controller.submit().await, CycleOutcome::NotAccepted);
        assert_eq!(authorizer.calls.get(), 1);
        assert_eq!(observer.installs.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_install_failure_keeps_success_state() {
        let authorizer = StubAuthorizer::authorized();
        let activator = StubActivator::failing();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form(),
            StubTokenizer::issuing("tok_1"),
            &authorizer,
            &activator,
            &observer,
        );

        let outcome = controller.submit().await;

        assert_eq!(outcome, CycleOutcome::Completed { installed: false });
        assert_eq!(controller.state(), UiState::Success);
        assert_eq!(
            *observer.installs.borrow(),
            vec![InstallReport { success: false }]
        );
        // The error region is never reopened for an install failure.
        assert!(
            observer
                .states
                .borrow()
                .iter()
                .all(|state| state.error_text().is_none())
        );
    }

    #[tokio::test]
    async fn test_error_state_permits_retry() {
        let authorizer = StubAuthorizer::authorized();
        let activator = StubActivator::succeeding();
        let observer = Rc::new(Recorder::default());
        let controller = controller(
            StubStrategy::card_form(),
            StubTokenizer::scripted(vec![
                Err("Your card was declined.".to_string()),
                Ok("tok_2".to_string()),
            ]),
            &authorizer,
            &activator,
            &observer,
        );

        assert_eq!(controller.submit().await, CycleOutcome::Failed);
        assert!(controller.state().control_enabled());

        assert_eq!(
            controller.submit().await,
            CycleOutcome::Completed { installed: true }
        );
        assert_eq!(controller.state(), UiState::Success);
        // Entering Submitting again cleared the previous error.
        let states = observer.states.borrow();
        let error_index = states
            .iter()
            .position(|state| state.error_text().is_some())
            .unwrap();
        assert_eq!(states[error_index + 1], UiState::Submitting);
    }
}
