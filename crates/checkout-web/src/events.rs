//! Terminal Event Dispatch

use wasm_bindgen::JsValue;
use web_sys::js_sys;

use checkout_core::{InstallReport, PWA_INSTALLED_EVENT};

/// Dispatch `pwa-installed` from the component root.
///
/// The event bubbles and crosses shadow boundaries so host pages can
/// listen anywhere above the component; it fires exactly once per
/// successful-authorization cycle.
pub fn dispatch_pwa_installed(target: &web_sys::EventTarget, report: &InstallReport) {
    let detail = js_sys::Object::new();
    let _ = js_sys::Reflect::set(
        &detail,
        &JsValue::from_str("success"),
        &JsValue::from_bool(report.success),
    );
    let detail: JsValue = detail.into();

    let init = web_sys::CustomEventInit::new();
    init.set_bubbles(true);
    init.set_composed(true);
    init.set_detail(&detail);

    if let Ok(event) = web_sys::CustomEvent::new_with_event_init_dict(PWA_INSTALLED_EVENT, &init) {
        let _ = target.dispatch_event(&event);
    }
}
