//! Low-level wasm-bindgen bindings to the processor's browser SDK and the
//! browser payment-sheet API.
//!
//! Raw handles only; higher-level wrappers live in the strategy and
//! tokenizer modules.

use wasm_bindgen::prelude::*;
use web_sys::js_sys::Promise;

#[wasm_bindgen]
unsafe extern "C" {
    /// Processor client handle (`Stripe(pk)`).
    #[wasm_bindgen(js_name = Stripe, js_namespace = window)]
    #[derive(Debug, Clone)]
    pub type JsProcessor;

    /// Widget factory handle (`stripe.elements()`).
    #[derive(Debug, Clone)]
    pub type JsElements;

    /// Mounted widget handle (card field or wallet button).
    #[derive(Debug, Clone)]
    pub type JsWidget;

    /// Wallet payment-request handle (`stripe.paymentRequest(...)`).
    #[derive(Debug, Clone)]
    pub type JsWalletRequest;

    /// `Stripe(publishableKey)` -> processor handle
    #[wasm_bindgen(js_name = Stripe, js_namespace = window, catch)]
    pub fn new_processor(publishable_key: &str) -> Result<JsProcessor, JsValue>;

    /// `stripe.elements()`
    #[wasm_bindgen(method, catch)]
    pub fn elements(this: &JsProcessor) -> Result<JsElements, JsValue>;

    /// `elements.create(type, options)`
    #[wasm_bindgen(method, catch, js_name = create)]
    pub fn create_widget(
        this: &JsElements,
        widget_type: &str,
        options: &JsValue,
    ) -> Result<JsWidget, JsValue>;

    /// `widget.mount(selector)`
    #[wasm_bindgen(method, catch)]
    pub fn mount(this: &JsWidget, selector: &str) -> Result<(), JsValue>;

    /// `widget.unmount()`
    #[wasm_bindgen(method, catch)]
    pub fn unmount(this: &JsWidget) -> Result<(), JsValue>;

    /// `stripe.createToken(widget)` for embedded card fields
    #[wasm_bindgen(method, js_name = createToken)]
    pub fn create_token(this: &JsProcessor, widget: &JsWidget) -> Promise;

    /// `stripe.createToken('card', data)` for sheet-captured fields
    #[wasm_bindgen(method, js_name = createToken)]
    pub fn create_token_from_data(this: &JsProcessor, token_type: &str, data: &JsValue)
        -> Promise;

    /// `stripe.paymentRequest(options)` wallet query/session
    #[wasm_bindgen(method, catch, js_name = paymentRequest)]
    pub fn payment_request(
        this: &JsProcessor,
        options: &JsValue,
    ) -> Result<JsWalletRequest, JsValue>;

    /// `walletRequest.canMakePayment()`
    #[wasm_bindgen(method, js_name = canMakePayment)]
    pub fn can_make_payment(this: &JsWalletRequest) -> Promise;

    /// `walletRequest.on(event, handler)` completion subscription
    #[wasm_bindgen(method)]
    pub fn on(this: &JsWalletRequest, event: &str, handler: &web_sys::js_sys::Function);

    /// Browser-native payment sheet (`new PaymentRequest(methods, details)`).
    #[wasm_bindgen(js_name = PaymentRequest)]
    #[derive(Debug, Clone)]
    pub type JsPaymentSheet;

    #[wasm_bindgen(constructor, js_class = "PaymentRequest", catch)]
    pub fn new(method_data: &JsValue, details: &JsValue) -> Result<JsPaymentSheet, JsValue>;

    /// `sheet.show()`
    #[wasm_bindgen(method)]
    pub fn show(this: &JsPaymentSheet) -> Promise;

    /// Sheet response handle carrying the basic card bundle.
    #[wasm_bindgen(js_name = PaymentResponse)]
    #[derive(Debug, Clone)]
    pub type JsSheetResponse;

    /// `response.details`
    #[wasm_bindgen(method, getter)]
    pub fn details(this: &JsSheetResponse) -> JsValue;

    /// `response.complete(result)`
    #[wasm_bindgen(method)]
    pub fn complete(this: &JsSheetResponse, result: &str) -> Promise;
}
