//! Root Component
//!
//! Wires the checkout into a host page. Configuration comes from the host
//! in either of two forms: attributes on a `#paid-pwa` element (the
//! drop-in path) or a `PAID_PWA_CONFIG` JSON global.

use std::collections::HashMap;

use leptos::either::Either;
use leptos::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::js_sys;

use checkout_core::PaymentConfiguration;

use crate::checkout::PaidCheckout;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    match host_configuration() {
        Ok(config) => Either::Left(view! {
            <main class="app">
                <PaidCheckout config=config />
            </main>
        }),
        Err(message) => Either::Right(view! {
            <main class="app">
                <p class="config-error">{message}</p>
            </main>
        }),
    }
}

/// Read the component configuration from the host page.
fn host_configuration() -> Result<PaymentConfiguration, String> {
    let window = web_sys::window().ok_or_else(|| "No browser window is available.".to_string())?;

    if let Some(element) = window
        .document()
        .and_then(|document| document.get_element_by_id("paid-pwa"))
    {
        let mut attrs = HashMap::new();
        for name in element.get_attribute_names().iter() {
            if let Some(name) = name.as_string() {
                if let Some(value) = element.get_attribute(&name) {
                    attrs.insert(name, value);
                }
            }
        }
        return PaymentConfiguration::from_attributes(&attrs).map_err(|err| err.to_string());
    }

    let window_js = JsValue::from(window);
    let raw = js_sys::Reflect::get(&window_js, &JsValue::from_str("PAID_PWA_CONFIG"))
        .map_err(|_| "PAID_PWA_CONFIG is not readable.".to_string())?;
    if raw.is_undefined() || raw.is_null() {
        return Err("No payment configuration was provided by the page.".to_string());
    }

    let json = js_sys::JSON::stringify(&raw)
        .map_err(|_| "PAID_PWA_CONFIG is not valid JSON.".to_string())?;
    serde_json::from_str(&String::from(json))
        .map_err(|err| format!("Invalid payment configuration: {err}"))
}
