//! Embedded Card Widget Strategy

use std::rc::Rc;

use async_trait::async_trait;
use uuid::Uuid;
use wasm_bindgen::JsValue;

use checkout_core::{
    CaptureStrategy, CaptureStrategyKind, CheckoutError, PaymentCredential, Result,
};

use crate::stripe::{StripeContext, js_message};

/// Embedded processor card widget.
///
/// The component's shared action control doubles as the local pay control,
/// so activation resolves immediately with the widget handle; the raw
/// fields stay inside the processor's sandbox until tokenization.
pub struct CardFormStrategy {
    context: Rc<StripeContext>,
    widget_id: String,
}

impl CardFormStrategy {
    pub fn new(context: Rc<StripeContext>) -> Self {
        Self {
            context,
            widget_id: format!("card-{}", Uuid::new_v4().simple()),
        }
    }
}

#[async_trait(?Send)]
impl CaptureStrategy for CardFormStrategy {
    fn kind(&self) -> CaptureStrategyKind {
        CaptureStrategyKind::DirectCardForm
    }

    fn mount(&self, selector: &str) -> Result<()> {
        let widget = self
            .context
            .elements()
            .create_widget("card", &JsValue::UNDEFINED)
            .map_err(|err| {
                CheckoutError::Config(js_message(&err, "The card widget could not be created."))
            })?;
        widget.mount(selector).map_err(|err| {
            CheckoutError::Config(js_message(&err, "The card widget could not be mounted."))
        })?;

        self.context.register_widget(self.widget_id.clone(), widget);
        Ok(())
    }

    async fn await_submission(&self) -> Result<PaymentCredential> {
        if self.context.widget(&self.widget_id).is_none() {
            return Err(CheckoutError::Capture(
                "The card form is not mounted.".into(),
            ));
        }

        Ok(PaymentCredential::MountedWidget {
            widget_id: self.widget_id.clone(),
        })
    }

    fn teardown(&self) {
        if let Some(widget) = self.context.remove_widget(&self.widget_id) {
            let _ = widget.unmount();
        }
    }
}
