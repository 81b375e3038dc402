//! # checkout-web
//!
//! Leptos-based WASM front end for the paid-pwa component: payment capture
//! widgets, the browser-SDK tokenizer, service-worker activation, and the
//! `pwa-installed` terminal event.

mod app;
mod bindings;
mod checkout;
mod events;
mod install;
mod strategies;
mod stripe;

pub use app::App;
pub use checkout::PaidCheckout;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
