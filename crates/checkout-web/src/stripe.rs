//! Processor SDK Wrappers
//!
//! Wraps the raw bindings into the core's collaborator ports: the shared
//! SDK context, the capability probe, and the tokenizer.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys;

use checkout_core::{
    CapabilityProbe, CheckoutError, PaymentConfiguration, PaymentCredential, PaymentToken, Result,
    TokenExchange, Tokenizer,
};

use crate::bindings::{self, JsElements, JsProcessor, JsWidget};

/// Shared handles to the loaded processor SDK for one component instance.
///
/// Mounted widgets are registered here by id, so a credential can carry an
/// opaque handle instead of the widget itself.
pub struct StripeContext {
    processor: JsProcessor,
    elements: JsElements,
    widgets: RefCell<HashMap<String, JsWidget>>,
}

impl StripeContext {
    /// Instantiate the SDK; fails when its script tag is missing.
    pub fn new(publishable_key: &str) -> Result<Self> {
        let processor = bindings::new_processor(publishable_key).map_err(|err| {
            CheckoutError::Config(js_message(&err, "The payment SDK is not loaded."))
        })?;
        let elements = processor.elements().map_err(|err| {
            CheckoutError::Config(js_message(&err, "The payment SDK is not loaded."))
        })?;

        Ok(Self {
            processor,
            elements,
            widgets: RefCell::new(HashMap::new()),
        })
    }

    pub fn processor(&self) -> &JsProcessor {
        &self.processor
    }

    pub fn elements(&self) -> &JsElements {
        &self.elements
    }

    pub fn register_widget(&self, id: impl Into<String>, widget: JsWidget) {
        self.widgets.borrow_mut().insert(id.into(), widget);
    }

    pub fn widget(&self, id: &str) -> Option<JsWidget> {
        self.widgets.borrow().get(id).cloned()
    }

    pub fn remove_widget(&self, id: &str) -> Option<JsWidget> {
        self.widgets.borrow_mut().remove(id)
    }
}

/// Wallet availability query through the processor SDK.
pub struct StripeCapabilityProbe {
    context: Rc<StripeContext>,
}

impl StripeCapabilityProbe {
    pub fn new(context: Rc<StripeContext>) -> Self {
        Self { context }
    }
}

#[async_trait(?Send)]
impl CapabilityProbe for StripeCapabilityProbe {
    async fn express_wallet_available(&self, config: &PaymentConfiguration) -> Result<bool> {
        let wallet = self
            .context
            .processor()
            .payment_request(&wallet_request_options(config))
            .map_err(|err| {
                CheckoutError::Capability(js_message(&err, "paymentRequest is unavailable"))
            })?;

        let result = JsFuture::from(wallet.can_make_payment())
            .await
            .map_err(|err| {
                CheckoutError::Capability(js_message(&err, "canMakePayment rejected"))
            })?;

        // A null result means no wallet can complete the payment here.
        Ok(!result.is_null() && !result.is_undefined())
    }
}

/// Tokenizer backed by the processor's browser SDK.
pub struct StripeJsTokenizer {
    context: Rc<StripeContext>,
}

impl StripeJsTokenizer {
    pub fn new(context: Rc<StripeContext>) -> Self {
        Self { context }
    }

    fn parse_token_result(result: &JsValue) -> TokenExchange {
        if let Some(error) = get(result, "error") {
            return TokenExchange::Error {
                message: js_message(&error, "The payment could not be processed."),
            };
        }

        match get(result, "token").and_then(|token| get_string(&token, "id")) {
            Some(id) => TokenExchange::Token(PaymentToken::new(id)),
            None => TokenExchange::Error {
                message: "The payment service returned no token.".to_string(),
            },
        }
    }
}

#[async_trait(?Send)]
impl Tokenizer for StripeJsTokenizer {
    async fn exchange(&self, credential: &PaymentCredential) -> TokenExchange {
        let promise = match credential {
            PaymentCredential::MountedWidget { widget_id } => {
                let Some(widget) = self.context.widget(widget_id) else {
                    return TokenExchange::Error {
                        message: "The payment form is not ready.".to_string(),
                    };
                };
                self.context.processor().create_token(&widget)
            }
            PaymentCredential::SheetCard(details) => {
                let mut entries = vec![
                    ("number", JsValue::from_str(&details.number)),
                    ("exp_month", JsValue::from_str(&details.expiry_month)),
                    ("exp_year", JsValue::from_str(&details.expiry_year)),
                ];
                if let Some(name) = &details.cardholder_name {
                    entries.push(("name", JsValue::from_str(name)));
                }
                if let Some(code) = &details.security_code {
                    entries.push(("cvc", JsValue::from_str(code)));
                }
                self.context
                    .processor()
                    .create_token_from_data("card", &js_object(&entries))
            }
            // Wallet output is already validated; the identifier passes
            // through unchanged.
            PaymentCredential::WalletMethod { payment_method_id } => {
                return TokenExchange::Token(PaymentToken::new(payment_method_id.clone()));
            }
        };

        match JsFuture::from(promise).await {
            Ok(result) => Self::parse_token_result(&result),
            Err(err) => TokenExchange::Error {
                message: js_message(&err, "The payment could not be processed."),
            },
        }
    }
}

/// Options object for `stripe.paymentRequest(...)`, shared by the
/// capability probe and the wallet button.
pub(crate) fn wallet_request_options(config: &PaymentConfiguration) -> JsValue {
    js_object(&[
        ("country", JsValue::from_str(&config.country)),
        ("currency", JsValue::from_str(&config.currency)),
        (
            "total",
            js_object(&[
                ("label", JsValue::from_str("Purchase and Install PWA")),
                (
                    "amount",
                    JsValue::from_f64(config.amount_minor_units as f64),
                ),
            ]),
        ),
    ])
}

/// Read `obj.key`, treating null and undefined as absent.
pub(crate) fn get(obj: &JsValue, key: &str) -> Option<JsValue> {
    js_sys::Reflect::get(obj, &JsValue::from_str(key))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())
}

pub(crate) fn get_string(obj: &JsValue, key: &str) -> Option<String> {
    get(obj, key).and_then(|value| value.as_string())
}

/// Build a plain JS object from key/value pairs.
pub(crate) fn js_object(entries: &[(&str, JsValue)]) -> JsValue {
    let object = js_sys::Object::new();
    for (key, value) in entries {
        // Reflect::set only fails on frozen objects, which these never are.
        let _ = js_sys::Reflect::set(&object, &JsValue::from_str(key), value);
    }
    object.into()
}

pub(crate) fn js_string_array(items: &[String]) -> JsValue {
    let array = js_sys::Array::new();
    for item in items {
        array.push(&JsValue::from_str(item));
    }
    array.into()
}

/// Best-effort human-readable message from a JS error value.
pub(crate) fn js_message(value: &JsValue, fallback: &str) -> String {
    get_string(value, "message")
        .or_else(|| value.as_string())
        .unwrap_or_else(|| fallback.to_string())
}
