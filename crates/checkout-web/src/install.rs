//! Service-Worker Installability Activation

use async_trait::async_trait;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::js_sys;

use checkout_core::{InstallReport, InstallabilityActivator};

/// Registers the worker script through `navigator.serviceWorker`.
///
/// Never fails toward the caller: every outcome is a report, and the
/// detail lands on the console. Environments without service-worker
/// support report `success: false` instead of staying silent.
pub struct ServiceWorkerActivator;

#[async_trait(?Send)]
impl InstallabilityActivator for ServiceWorkerActivator {
    async fn activate(&self, worker_script_url: &str) -> InstallReport {
        let Some(window) = web_sys::window() else {
            return InstallReport { success: false };
        };

        let navigator = window.navigator();
        let navigator_js = JsValue::from(navigator.clone());
        let supported =
            js_sys::Reflect::has(&navigator_js, &JsValue::from_str("serviceWorker"))
                .unwrap_or(false);
        if !supported {
            web_sys::console::warn_1(&JsValue::from_str(
                "Service workers are not supported in this browser.",
            ));
            return InstallReport { success: false };
        }

        match JsFuture::from(navigator.service_worker().register(worker_script_url)).await {
            Ok(registration) => {
                web_sys::console::log_2(
                    &JsValue::from_str("Service worker registered successfully:"),
                    &registration,
                );
                InstallReport { success: true }
            }
            Err(err) => {
                web_sys::console::error_2(
                    &JsValue::from_str("Service worker registration failed:"),
                    &err,
                );
                InstallReport { success: false }
            }
        }
    }
}
