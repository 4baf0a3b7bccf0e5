//! Browser-side controller for the task dashboard.
//!
//! The page is server-rendered and fragments of it are replaced by the
//! server after each mutation. This crate attaches the interactive layer:
//! delegated action dispatch, drag-and-drop reordering, and the rebind pass
//! that keeps replaced markup behaving like the markup it replaced.

pub mod api;
pub mod dashboard;
pub mod dom;
pub mod error;
pub mod rebind;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let document = dom::document().map_err(|err| JsValue::from_str(&err.to_string()))?;
    // The document's listeners keep the controller alive for the page
    // lifetime; nothing hangs off the window object.
    let _controller = dashboard::Dashboard::attach(&document)?;
    Ok(())
}
