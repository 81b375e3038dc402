//! Express Wallet Button Strategy

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::channel::oneshot;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys;

use checkout_core::{
    CaptureStrategy, CaptureStrategyKind, CheckoutError, PaymentConfiguration, PaymentCredential,
    Result,
};

use crate::bindings::JsWidget;
use crate::stripe::{StripeContext, get, get_string, js_message, js_object, wallet_request_options};

type PendingSubmission = Rc<RefCell<Option<oneshot::Sender<Result<PaymentCredential>>>>>;

/// Platform-rendered wallet button.
///
/// The processor reports wallet completion through callback events; they
/// are bridged onto a oneshot channel so `await_submission` is a plain
/// awaitable. The button itself is the action control: its tap runs the
/// activation hook installed by the component.
pub struct WalletButtonStrategy {
    context: Rc<StripeContext>,
    config: PaymentConfiguration,
    pending: PendingSubmission,
    on_activate: Rc<RefCell<Option<Box<dyn Fn()>>>>,
    button: RefCell<Option<JsWidget>>,
    // Subscriptions must outlive the JS callbacks they back.
    handlers: RefCell<Vec<Closure<dyn FnMut(JsValue)>>>,
}

impl WalletButtonStrategy {
    pub fn new(context: Rc<StripeContext>, config: PaymentConfiguration) -> Self {
        Self {
            context,
            config,
            pending: Rc::new(RefCell::new(None)),
            on_activate: Rc::new(RefCell::new(None)),
            button: RefCell::new(None),
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Install the hook run when the platform button is tapped.
    pub fn set_activation_hook(&self, hook: Box<dyn Fn()>) {
        *self.on_activate.borrow_mut() = Some(hook);
    }
}

#[async_trait(?Send)]
impl CaptureStrategy for WalletButtonStrategy {
    fn kind(&self) -> CaptureStrategyKind {
        CaptureStrategyKind::ExpressWalletButton
    }

    fn mount(&self, selector: &str) -> Result<()> {
        let wallet = self
            .context
            .processor()
            .payment_request(&wallet_request_options(&self.config))
            .map_err(|err| {
                CheckoutError::Config(js_message(&err, "The wallet session could not be created."))
            })?;

        let pending = Rc::clone(&self.pending);
        let completed = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            // Close the sheet before handing the credential on.
            complete_wallet_event(&event);
            if let Some(sender) = pending.borrow_mut().take() {
                let result = get(&event, "paymentMethod")
                    .and_then(|method| get_string(&method, "id"))
                    .map(|payment_method_id| PaymentCredential::WalletMethod { payment_method_id })
                    .ok_or_else(|| {
                        CheckoutError::Capture("The wallet returned no payment method.".into())
                    });
                let _ = sender.send(result);
            }
        });
        wallet.on("paymentmethod", completed.as_ref().unchecked_ref());

        let pending = Rc::clone(&self.pending);
        let cancelled = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            if let Some(sender) = pending.borrow_mut().take() {
                let _ = sender.send(Err(CheckoutError::Capture(
                    "The wallet sheet was dismissed.".into(),
                )));
            }
        });
        wallet.on("cancel", cancelled.as_ref().unchecked_ref());

        let on_activate = Rc::clone(&self.on_activate);
        let tapped = Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| {
            if let Some(hook) = on_activate.borrow().as_ref() {
                hook();
            }
        });
        wallet.on("click", tapped.as_ref().unchecked_ref());

        let button = self
            .context
            .elements()
            .create_widget(
                "paymentRequestButton",
                &js_object(&[("paymentRequest", JsValue::from(wallet))]),
            )
            .map_err(|err| {
                CheckoutError::Config(js_message(&err, "The wallet button could not be created."))
            })?;
        button.mount(selector).map_err(|err| {
            CheckoutError::Config(js_message(&err, "The wallet button could not be mounted."))
        })?;

        self.handlers
            .borrow_mut()
            .extend([completed, cancelled, tapped]);
        *self.button.borrow_mut() = Some(button);
        Ok(())
    }

    async fn await_submission(&self) -> Result<PaymentCredential> {
        let (sender, receiver) = oneshot::channel();
        *self.pending.borrow_mut() = Some(sender);

        match receiver.await {
            Ok(result) => result,
            Err(_) => Err(CheckoutError::Capture(
                "The wallet session ended unexpectedly.".into(),
            )),
        }
    }

    fn teardown(&self) {
        if let Some(button) = self.button.borrow_mut().take() {
            let _ = button.unmount();
        }
        self.handlers.borrow_mut().clear();
        self.pending.borrow_mut().take();
    }
}

/// Acknowledge a wallet completion event so the platform sheet closes.
fn complete_wallet_event(event: &JsValue) {
    if let Some(complete) = get(event, "complete") {
        if let Ok(function) = complete.dyn_into::<js_sys::Function>() {
            let _ = function.call1(event, &JsValue::from_str("success"));
        }
    }
}
