//! The Paid Checkout Component

use std::rc::Rc;

use leptos::prelude::*;
use uuid::Uuid;

use checkout_core::{
    CaptureStrategy, CaptureStrategyKind, CheckoutController, CheckoutObserver,
    HttpAuthorizationClient, InstallReport, PaymentConfiguration, UiState, select_strategy,
};

use crate::events;
use crate::install::ServiceWorkerActivator;
use crate::strategies::{CardFormStrategy, PaymentSheetStrategy, WalletButtonStrategy};
use crate::stripe::{StripeCapabilityProbe, StripeContext, StripeJsTokenizer};

/// Maps controller callbacks onto the component's reactive state and the
/// terminal DOM event.
struct SignalObserver {
    state: RwSignal<UiState>,
    root: NodeRef<leptos::html::Div>,
}

impl CheckoutObserver for SignalObserver {
    fn state_changed(&self, state: &UiState) {
        self.state.set(state.clone());
    }

    fn installed(&self, report: &InstallReport) {
        if let Some(root) = self.root.get_untracked() {
            events::dispatch_pwa_installed(&root, report);
        }
    }
}

/// One-time payment gate for offline installability.
///
/// Capability detection resolves before the capture UI renders, the
/// selected strategy is fixed for the lifetime of the instance, and the
/// action control is the sole admission gate for submission cycles.
#[component]
pub fn PaidCheckout(config: PaymentConfiguration) -> impl IntoView {
    let state = RwSignal::new(UiState::Idle);
    let selected = RwSignal::new(None::<CaptureStrategyKind>);
    let setup_error = RwSignal::new(None::<String>);
    let controller = StoredValue::new_local(None::<Rc<CheckoutController>>);
    let root_ref = NodeRef::<leptos::html::Div>::new();

    let container_id = format!("capture-{}", Uuid::new_v4().simple());
    let selector = format!("#{container_id}");

    let run_submit = move || {
        if let Some(controller) = controller.get_value() {
            leptos::task::spawn_local(async move {
                controller.submit().await;
            });
        }
    };

    // Detection runs exactly once; the capture UI renders only after it
    // resolves, so the wrong widget is never shown and replaced.
    {
        let config = config.clone();
        leptos::task::spawn_local(async move {
            let context = match StripeContext::new(&config.processor_public_key) {
                Ok(context) => Rc::new(context),
                Err(err) => {
                    setup_error.set(Some(err.user_message()));
                    return;
                }
            };

            let probe = StripeCapabilityProbe::new(Rc::clone(&context));
            let kind = select_strategy(&config, &probe).await;
            selected.set(Some(kind));

            let strategy: Rc<dyn CaptureStrategy> = match kind {
                CaptureStrategyKind::DirectCardForm => {
                    Rc::new(CardFormStrategy::new(Rc::clone(&context)))
                }
                CaptureStrategyKind::ExpressWalletButton => {
                    let strategy = WalletButtonStrategy::new(Rc::clone(&context), config.clone());
                    strategy.set_activation_hook(Box::new(run_submit));
                    Rc::new(strategy)
                }
                CaptureStrategyKind::NativePaymentSheet => {
                    Rc::new(PaymentSheetStrategy::new(config.clone()))
                }
            };

            if let Err(err) = strategy.mount(&selector) {
                setup_error.set(Some(err.user_message()));
                return;
            }

            let instance = Rc::new(CheckoutController::new(
                config.clone(),
                strategy,
                Rc::new(StripeJsTokenizer::new(Rc::clone(&context))),
                Rc::new(HttpAuthorizationClient::new(
                    config.authorization_endpoint.clone(),
                )),
                Rc::new(ServiceWorkerActivator),
                Rc::new(SignalObserver {
                    state,
                    root: root_ref,
                }),
            ));
            controller.set_value(Some(instance));
        });
    }

    on_cleanup(move || {
        if let Some(controller) = controller.get_value() {
            controller.teardown();
        }
    });

    let busy = move || matches!(state.get(), UiState::Submitting | UiState::Authorizing);
    let show_pay_button = move || {
        selected
            .get()
            .is_some_and(|kind| kind != CaptureStrategyKind::ExpressWalletButton)
    };
    let error_text = move || {
        setup_error
            .get()
            .or_else(|| state.get().error_text().map(str::to_string))
    };

    view! {
        <div class="paid-pwa" node_ref=root_ref>
            {move || {
                selected
                    .get()
                    .is_none()
                    .then(|| view! { <p class="detecting">"Preparing payment options..."</p> })
            }}
            <div class="capture-slot" id=container_id.clone()></div>
            <button
                id="pay-button"
                style:display=move || if show_pay_button() { "inline-block" } else { "none" }
                disabled=move || selected.get().is_none() || !state.get().control_enabled()
                on:click=move |_| run_submit()
            >
                {move || if busy() { "Processing..." } else { "Purchase and Install PWA" }}
            </button>
            <div id="error-message" class="error-message" aria-live="polite">
                {error_text}
            </div>
            {move || {
                (state.get() == UiState::Success)
                    .then(|| view! { <p class="success-message">"Payment successful!"</p> })
            }}
        </div>
    }
}
