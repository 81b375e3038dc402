//! Browser-Native Payment Sheet Strategy

use async_trait::async_trait;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys;

use checkout_core::{
    CaptureStrategy, CaptureStrategyKind, CardDetails, CheckoutError, PaymentConfiguration,
    PaymentCredential, Result,
};

use crate::bindings::{JsPaymentSheet, JsSheetResponse};
use crate::stripe::{get_string, js_object, js_string_array};

/// Browser-native payment sheet.
///
/// Mounted state is only the shared trigger control; each activation shows
/// the sheet and yields basic card fields that still go through the
/// tokenizer.
pub struct PaymentSheetStrategy {
    config: PaymentConfiguration,
}

impl PaymentSheetStrategy {
    pub fn new(config: PaymentConfiguration) -> Self {
        Self { config }
    }

    fn method_data(&self) -> JsValue {
        let method = js_object(&[
            ("supportedMethods", JsValue::from_str("basic-card")),
            (
                "data",
                js_object(&[
                    (
                        "supportedNetworks",
                        js_string_array(&self.config.supported_networks),
                    ),
                    (
                        "supportedTypes",
                        js_string_array(&self.config.supported_types),
                    ),
                ]),
            ),
        ]);
        js_sys::Array::of1(&method).into()
    }

    fn details(&self) -> JsValue {
        js_object(&[(
            "total",
            js_object(&[
                ("label", JsValue::from_str("Purchase and Install PWA")),
                (
                    "amount",
                    js_object(&[
                        ("currency", JsValue::from_str(&self.config.currency)),
                        (
                            "value",
                            JsValue::from_str(&format_major_units(
                                self.config.amount_minor_units,
                            )),
                        ),
                    ]),
                ),
            ]),
        )])
    }
}

#[async_trait(?Send)]
impl CaptureStrategy for PaymentSheetStrategy {
    fn kind(&self) -> CaptureStrategyKind {
        CaptureStrategyKind::NativePaymentSheet
    }

    fn mount(&self, _selector: &str) -> Result<()> {
        // Nothing to render; the shared action control is the trigger.
        Ok(())
    }

    async fn await_submission(&self) -> Result<PaymentCredential> {
        let sheet = JsPaymentSheet::new(&self.method_data(), &self.details()).map_err(|_| {
            CheckoutError::Capture("The payment sheet is not available in this browser.".into())
        })?;

        let response = JsFuture::from(sheet.show())
            .await
            .map_err(|_| CheckoutError::Capture("The payment sheet was dismissed.".into()))?;
        let response: JsSheetResponse = response.unchecked_into();

        let details = response.details();
        let Some(number) = get_string(&details, "cardNumber") else {
            let _ = JsFuture::from(response.complete("fail")).await;
            return Err(CheckoutError::Capture(
                "The payment sheet returned no card data.".into(),
            ));
        };

        let credential = CardDetails {
            cardholder_name: get_string(&details, "cardholderName"),
            number,
            expiry_month: get_string(&details, "expiryMonth").unwrap_or_default(),
            expiry_year: get_string(&details, "expiryYear").unwrap_or_default(),
            security_code: get_string(&details, "cardSecurityCode"),
        };

        let _ = JsFuture::from(response.complete("success")).await;
        Ok(PaymentCredential::SheetCard(credential))
    }

    fn teardown(&self) {}
}

/// Render minor units as a decimal major-unit string for the sheet total.
fn format_major_units(minor: u64) -> String {
    format!("{}.{:02}", minor / 100, minor % 100)
}
