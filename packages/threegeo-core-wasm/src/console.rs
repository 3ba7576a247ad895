// Logging bridge. In the browser messages go to the JS console; on native
// targets (tests, tooling) they go through the `log` facade instead, since the
// JS bindings are unavailable there.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    // Use `js_namespace` to bind `console.log(..)` instead of just `log(..)`
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    fn console_log_js(s: &str);
}

#[cfg(target_arch = "wasm32")]
pub fn log(s: &str) {
    console_log_js(s);
}

#[cfg(target_arch = "wasm32")]
pub fn warn(s: &str) {
    web_sys::console::warn_1(&JsValue::from_str(s));
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log(s: &str) {
    ::log::debug!("{}", s);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(s: &str) {
    ::log::warn!("{}", s);
}

// Note: the console_log / console_warn macros are defined in lib.rs
